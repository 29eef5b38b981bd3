use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Fatal: the store could not be reached at startup.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A store record was empty where a document was expected.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store record was present but malformed for the target variant.
    #[error("Schema error: {0}")]
    Schema(String),

    /// An insert was rejected by the store.
    #[error("Write error: {0}")]
    Write(String),

    /// A read operation failed at the store.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Content acquisition or normalization failed.
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// No crawler is registered for the URL's domain.
    #[error("No crawler registered for domain: {0}")]
    UnregisteredDomain(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
