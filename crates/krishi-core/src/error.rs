use thiserror::Error;

/// Top-level error type for the Krishi assistant.
///
/// Subsystem crates define their own error types and implement
/// `From<KrishiError>` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KrishiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for KrishiError {
    fn from(err: toml::de::Error) -> Self {
        KrishiError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KrishiError {
    fn from(err: toml::ser::Error) -> Self {
        KrishiError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for KrishiError {
    fn from(err: serde_json::Error) -> Self {
        KrishiError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Krishi operations.
pub type Result<T> = std::result::Result<T, KrishiError>;
