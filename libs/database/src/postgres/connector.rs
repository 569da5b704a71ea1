use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryPolicy, retry_with_backoff};

/// Open a connection pool from `config`.
pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Successfully connected to PostgreSQL database");
    Ok(db)
}

/// Open a connection pool, retrying with backoff while the server comes up.
///
/// ```ignore
/// use database::common::RetryPolicy;
/// use database::postgres::{PostgresConfig, connect_with_retry};
///
/// let config = PostgresConfig::from_env()?;
/// let db = connect_with_retry(config, &RetryPolicy::new().with_max_retries(5)).await?;
/// ```
pub async fn connect_with_retry(
    config: PostgresConfig,
    policy: &RetryPolicy,
) -> DatabaseResult<DatabaseConnection> {
    retry_with_backoff(policy, || connect_from_config(config.clone()))
        .await
        .map_err(|e| {
            DatabaseError::ConnectionFailed(format!(
                "gave up after {} attempts: {}",
                policy.max_retries + 1,
                e
            ))
        })
}

/// Apply all pending migrations of `M`.
///
/// ```ignore
/// run_migrations::<migration::Migrator>(&db, "inventory-api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(app = app_name, "Migrations completed successfully");
    Ok(())
}
