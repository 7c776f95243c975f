//! Error types for sarathi-link

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// sarathi-link error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hostname could not be resolved
    #[error("Cannot resolve '{host}': {message}")]
    Resolve {
        /// Hostname that failed to resolve
        host: String,
        /// Underlying resolver message
        message: String,
    },

    /// Control channel is not connected
    #[error("Not connected")]
    NotConnected,

    /// Intent refused in the current connection state or mode
    #[error("Intent not legal now: {0}")]
    IllegalIntent(&'static str),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
