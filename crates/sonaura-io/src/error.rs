//! Error types for configuration file I/O.

use sonaura_core::CoreError;

/// Result type alias for configuration I/O.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for reading and writing configuration files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON encoding failed
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),

    /// RON decoding failed
    #[error("RON parse error: {0}")]
    RonDe(#[from] ron::error::SpannedError),

    /// File extension not recognized
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// File exceeds the load limit
    #[error("Config file too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Size on disk
        size: u64,
        /// Maximum accepted
        limit: u64,
    },

    /// Written by an incompatible version
    #[error("Config version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: String,
        /// Version in the file
        found: String,
    },

    /// Decoded but rejected by validation
    #[error("Invalid config: {0}")]
    Validation(#[from] CoreError),
}
