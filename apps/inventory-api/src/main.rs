//! Inventory API - REST server for the product catalogue

use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryPolicy;
use database::postgres::{connect_with_retry, run_migrations};
use domain_products::InMemoryProductStore;
use migration::Migrator;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::{AppState, Backend};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let backend = match &config.postgres {
        Some(postgres) => {
            info!(storage = %config.storage, "Connecting to PostgreSQL");
            let db = connect_with_retry(postgres.clone(), &RetryPolicy::default()).await?;

            if config.run_migrations {
                run_migrations::<Migrator>(&db, config.app.name).await?;
            } else {
                info!("RUN_MIGRATIONS=false, skipping migrations");
            }

            Backend::Postgres(db)
        }
        None => {
            warn!(storage = %config.storage, "Products are kept in memory and lost on restart");
            Backend::Memory(InMemoryProductStore::new())
        }
    };

    let state = AppState { config, backend };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &state.config.environment)?;
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    info!(
        "Starting {} v{} on port {}",
        state.config.app.name, state.config.app.version, state.config.server.port
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, async move {
        info!("Shutting down: closing storage backend");
        state.backend.close().await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
