//! Error types for accumerge
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AccumergeError
pub type Result<T> = std::result::Result<T, AccumergeError>;

/// Unified error type for accumerge operations
#[derive(Debug, Error)]
pub enum AccumergeError {
    // -------------------------------------------------------------------------
    // Merge Validation Errors
    // -------------------------------------------------------------------------
    /// A registered source yielded a key that was not strictly greater than
    /// the previous key it yielded.
    #[error("Source #{age} is not sorted: entry {position} does not follow its predecessor")]
    UnsortedSource { age: usize, position: usize },

    /// A registered source yielded a different number of entries than the
    /// size hint it was registered with.
    #[error("Source #{age} size hint mismatch: hinted {hint}, yielded {actual}")]
    SizeHintMismatch {
        age: usize,
        hint: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
