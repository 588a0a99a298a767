use thiserror::Error;

/// Errors from repository operations (used by trait definitions in dollsay-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors that end a chat turn before a reply is produced.
///
/// Provider failures are absent on purpose: the reply client absorbs them
/// into the fallback text, so they never reach this type.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("guest message limit of {limit} reached")]
    QuotaExceeded { limit: u32 },

    #[error("session storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),
}

/// Errors raised while validating loaded configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
