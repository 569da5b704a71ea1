//! PostgreSQL connection management and the transaction-backed session

mod config;
mod connector;
mod health;
mod session;

pub use config::PostgresConfig;
pub use connector::{connect_from_config, connect_with_retry, run_migrations};
pub use health::check_health;
pub use session::PgSession;

// Re-export SeaORM types for convenience
pub use sea_orm::{DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
