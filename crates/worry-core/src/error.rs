//! Error types for worry-core
//!
//! None of these escape the record store or the router: they are caught at
//! the component boundary and turned into degraded results, notices, or log
//! lines.

use thiserror::Error;

/// Failure reported by a key-value persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Storage is disabled or cannot be reached at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a write because it is full
    #[error("Storage quota exceeded for key {0}")]
    QuotaExceeded(String),

    /// The stored value exists but is not valid UTF-8 text
    #[error("Stored value for key {0} is not valid UTF-8")]
    InvalidData(String),

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// A lock guarding backend state was poisoned
    #[error("Backend lock poisoned")]
    Poisoned,
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

/// Why a stored document could not be turned into records.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The backend failed to read
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The stored bytes are not text
    #[error("Stored document is not valid UTF-8")]
    Encoding,

    /// The stored bytes are not valid JSON
    #[error("Stored document is not valid JSON: {0}")]
    Malformed(serde_json::Error),

    /// The JSON does not have the expected document shape
    #[error("Stored document has an unexpected shape: {0}")]
    Shape(serde_json::Error),
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value is outside its valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// A required value is missing or blank
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// The configuration file is not valid TOML
    #[error("TOML parse error: {0}")]
    Parse(String),
}
