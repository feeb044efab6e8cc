use thiserror::Error;

/// Top-level error type for Cafe Hunter.
///
/// Subsystem crates define their own error types for the failures they
/// distinguish and fall back to this one for configuration, storage and
/// serialization problems, so `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CafeHunterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CafeHunterError {
    fn from(err: toml::de::Error) -> Self {
        CafeHunterError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CafeHunterError {
    fn from(err: toml::ser::Error) -> Self {
        CafeHunterError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CafeHunterError {
    fn from(err: serde_json::Error) -> Self {
        CafeHunterError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Cafe Hunter operations.
pub type Result<T> = std::result::Result<T, CafeHunterError>;
