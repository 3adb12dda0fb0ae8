//! Error types for recency

use std::fmt;

/// Result type alias for recency operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction and configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Capacity, shard count or another construction argument is out of range
    InvalidArgument(String),

    /// Configuration document could not be parsed
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
