//! Application state management

use database::postgres::DatabaseConnection;
use domain_products::InMemoryProductStore;
use tracing::{error, info};

use crate::config::Config;

/// Storage the product routes run against
#[derive(Clone)]
pub enum Backend {
    Postgres(DatabaseConnection),
    Memory(InMemoryProductStore),
}

impl Backend {
    /// Close the connection pool, if any.
    pub async fn close(self) {
        match self {
            Backend::Postgres(db) => match db.close().await {
                Ok(()) => info!("PostgreSQL connection pool closed"),
                Err(e) => error!("Failed to close PostgreSQL connection pool: {}", e),
            },
            Backend::Memory(store) => {
                let products = store.len().await;
                info!(products, "Discarding in-memory products");
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Backend,
}
