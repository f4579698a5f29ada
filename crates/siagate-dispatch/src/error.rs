use thiserror::Error;

/// Dispatch-boundary error types.
///
/// These never cross back into the protocol path; the dispatcher captures
/// them per sink and logs them.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Code table file could not be read or parsed
    #[error("Code table error: {0}")]
    CodeTable(String),

    /// Sink configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
