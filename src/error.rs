//! Error types for Samatal

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Samatal error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Listener was not registered with the named sensor
    #[error("Listener not registered with {0}")]
    ListenerNotRegistered(&'static str),

    /// No samples available yet (filter window is empty)
    #[error("No data: {0}")]
    NoData(&'static str),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
