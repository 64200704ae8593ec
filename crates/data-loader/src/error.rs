//! Error types for the data-loader crate.
//!
//! Every failure the Rating Store can report lives in one enum so callers
//! can match on the kind (missing movie, bad rating value, unreadable file)
//! instead of parsing messages.

use thiserror::Error;

/// Errors that can occur while loading, validating or writing store data
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or appending a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The movie catalog JSON was malformed
    #[error("Invalid catalog JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Line in the ratings log couldn't be parsed
    ///
    /// Carries the file and line so a corrupt log can be fixed by hand
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., rating for non-existent movie)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// A writer panicked while holding the store lock
    #[error("Rating store lock poisoned")]
    LockPoisoned,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
