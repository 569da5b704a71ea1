/// Unified error type for connection management and unit-of-work sessions.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// PostgreSQL-specific errors (SeaORM)
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// Connection could not be established, even after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    /// The store refused a staged change set; nothing from it was applied
    #[error("Change set rejected: {0}")]
    Rejected(String),

    /// The owning unit of work was disposed
    #[error("Session has already been released")]
    SessionReleased,
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
