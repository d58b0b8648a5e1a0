//! Culture data table format.
//!
//! A culture data file packs fixed-stride records and a shared pool of
//! variable-length values into one buffer.
//!
//! ## File Structure
//!
//! ```text
//! +---------------------------+
//! | beOffset: u32             |  endian header; exactly one offset is
//! | leOffset: u32             |  non-zero and it must match the platform
//! +---------------------------+
//! | ...                       |
//! +---------------------------+  <- selected offset
//! | sizeCalendarItem: u32     |
//! | numCalendarItems: u32     |  culture table header
//! | offsetToDataPool: u32     |
//! | offsetToCalendarItemData  |
//! | ... other descriptors ... |
//! +---------------------------+  <- offsetToCalendarItemData
//! | CalendarRecord[1]         |
//! | ...                       |  numCalendarItems x sizeCalendarItem
//! | CalendarRecord[n]         |
//! +---------------------------+  <- offsetToDataPool
//! | pool: strings, string     |  addressed in 16-bit units
//! | arrays, int array arrays  |
//! +---------------------------+
//! ```
//!
//! Pool encodings:
//!
//! - string: `u16 len`, `len` UTF-16 units (empty = len 1, one zero unit)
//! - string array: `u16 count`, `count` x `u32` string offsets
//! - int array array: `i16 count`, `count` x `u32` offsets to
//!   `i16 len` + `len` x `i16`
//!
//! Array offset 0 always means "empty".

mod format;
mod source;
mod reader;
mod calendar;

pub use format::*;
pub use source::*;
pub use reader::*;
pub use calendar::*;
