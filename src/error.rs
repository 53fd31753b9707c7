//! Error types for table writing.
//!
//! Writer operations return [`TableResult`]. Sink failures are carried as
//! [`TableError::Io`]; everything else is caller misuse of the writer and is
//! reported before anything reaches the sink.

use std::{fmt, io};

/// Result type for table writer operations.
pub type TableResult<T> = Result<T, TableError>;

/// Everything that can go wrong while writing a table.
#[derive(Debug)]
pub enum TableError {
    /// The sink failed to accept a write or flush.
    Io(io::Error),
    /// A positional row had more values than the schema has columns.
    RowTooLong {
        /// Number of values supplied
        len: usize,
        /// Number of columns in the schema
        columns: usize,
    },
    /// A column index outside `[0, columns)`.
    ColumnOutOfRange {
        /// The offending index
        index: usize,
        /// Number of columns in the schema
        columns: usize,
    },
    /// The writer has already been finished.
    Closed,
    /// A writer was constructed with no columns.
    EmptySchema,
    /// A serialized record was not a struct or map.
    NotARecord,
    /// A record failed to serialize.
    Serialize(serde_json::Error),
}

impl TableError {
    /// Whether this error came from the sink rather than from misuse.
    pub fn is_io(&self) -> bool {
        matches!(self, TableError::Io(_))
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(e) => write!(f, "table sink error: {}", e),
            TableError::RowTooLong { len, columns } => {
                write!(f, "row too long: {} values for {} columns", len, columns)
            }
            TableError::ColumnOutOfRange { index, columns } => {
                write!(f, "column {} out of range for {} columns", index, columns)
            }
            TableError::Closed => write!(f, "table writer is closed"),
            TableError::EmptySchema => write!(f, "table schema has no columns"),
            TableError::NotARecord => write!(f, "record did not serialize to a map"),
            TableError::Serialize(e) => write!(f, "record serialization failed: {}", e),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Io(e) => Some(e),
            TableError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        TableError::Io(e)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        TableError::Serialize(e)
    }
}
