//! Error types for Strata.

use thiserror::Error;

/// Result type alias using StrataError.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Errors that can occur in Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Contract violations
    #[error("Index out of range: {index} (table holds {size} records)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Truncated record at offset {offset}: {remainder} stray bytes for record size {record_size}")]
    TruncatedRecord {
        offset: u64,
        remainder: usize,
        record_size: usize,
    },

    #[error("Operation requires a persistent table")]
    NotPersistent,
}
