//! Error types for the harness
//!
//! Only setup-class and transaction-class failures are represented here.
//! Network failures during probing and flow steps are turned into data
//! where they happen and never surface as a [`HarnessError`].

use thiserror::Error;

/// Errors that can abort a harness command
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be assembled from files and environment
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// A configured service address is not a valid base URL
    #[error("invalid address for service '{service}': {source}")]
    InvalidAddress {
        service: String,
        #[source]
        source: url::ParseError,
    },

    /// Two registry entries share a name
    #[error("service '{0}' is registered more than once")]
    DuplicateService(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The relational store rejected an operation
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The columnar dataset could not be decoded
    #[error("dataset error: {0}")]
    Dataset(#[from] parquet::errors::ParquetError),

    /// A dataset column is present but holds an unusable value
    #[error("dataset schema mismatch: {0}")]
    Schema(String),

    /// The dataset path does not resolve to a file
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A dependency required before the command can proceed is missing
    #[error("setup failed: {0}")]
    FatalSetup(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HarnessError>;
