//! # caltable
//!
//! Read-only decoder for packed culture data tables holding calendar
//! metadata: day and month names, era ranges, date patterns.
//!
//! A table is loaded once from an embedded resource or a (memory-mapped)
//! file, validated, and then queried through typed accessors that resolve
//! record fields through the shared data pool. Nothing is copied at load
//! time and nothing changes afterwards, so tables can be shared freely
//! between threads.
//!
//! ## Modules
//!
//! - [`util`] - Error handling
//! - [`table`] - Binary layout, byte sources, [`TableReader`], [`CalendarTable`]
//!
//! ## Example
//!
//! ```ignore
//! use caltable::{CalendarTable, TableSource};
//!
//! let table = CalendarTable::open(TableSource::file("custom.nlp"))?;
//! if table.is_valid() {
//!     for id in table.calendar_ids() {
//!         println!("{}: {:?}", table.name(id)?, table.day_names(id)?);
//!     }
//! }
//! ```

pub mod util;
pub mod table;

// Re-export commonly used types
pub use util::{Error, Result};
pub use table::{
    CalendarField, CalendarRecord, CalendarTable, LoadOptions, TableKind, TableLayout,
    TableReader, TableSource, DEFAULT_TABLE_NAME,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::table::{
        register_resource, CalendarRecord, CalendarTable, LoadOptions, TableReader, TableSource,
    };
}
