//! Error types for the calendar table reader.

use std::sync::Arc;
use thiserror::Error;

/// Main error type for table loading and field resolution.
#[derive(Error, Debug)]
pub enum Error {
    /// Source resolved to zero bytes (resource not registered, file absent or empty)
    #[error("Table source is empty or missing: {0}")]
    EmptyOrMissing(String),

    /// Endian header has no table for the running platform
    #[error("Table has no {expected}-endian data (corrupt or foreign-platform file)")]
    WrongEndianness { expected: &'static str },

    /// A read would run past the end of the buffer
    #[error("Unexpected end of table: {len} byte(s) at position {pos}")]
    UnexpectedEof { pos: u64, len: usize },

    /// Invalid data structure in the table
    #[error("Invalid table structure: {0}")]
    InvalidStructure(String),

    /// Calendar id outside `1..=count`
    #[error("Calendar id {id} out of range (count: {count})")]
    IndexOutOfRange { id: u32, count: u32 },

    /// Caller broke an API precondition
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Accessor used on a table whose source was empty
    #[error("Table is not valid (source was empty or missing)")]
    InvalidTable,

    /// The process-wide default table failed to load
    #[error("Default calendar table unavailable: {0}")]
    DefaultTable(Arc<Error>),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pooled string is not valid UTF-16
    #[error("Invalid UTF-16: {0}")]
    Utf16(#[from] std::string::FromUtf16Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an end-of-buffer error for a read of `len` bytes at `pos`.
    pub fn eof(pos: usize, len: usize) -> Self {
        Self::UnexpectedEof { pos: pos as u64, len }
    }

    /// True for the recoverable "nothing to load" condition.
    #[inline]
    pub fn is_empty_or_missing(&self) -> bool {
        matches!(self, Self::EmptyOrMissing(_))
    }
}

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, Error>;
