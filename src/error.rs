//! Error types for settings and high-score persistence
//!
//! The simulation itself is infallible; only the I/O-facing collaborators fail.

/// Error type for Star Raid I/O operations
#[derive(thiserror::Error, Debug)]
pub enum StarRaidError {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings or high-score JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings value out of range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for Star Raid I/O operations
pub type Result<T> = std::result::Result<T, StarRaidError>;
