//! Products API routes

use axum::Router;
use domain_products::{handlers, memory_provider, postgres_provider};

use crate::state::{AppState, Backend};

/// Create products router for the configured backend
pub fn router(state: &AppState) -> Router {
    match &state.backend {
        Backend::Postgres(db) => handlers::router(postgres_provider(db.clone())),
        Backend::Memory(store) => handlers::router(memory_provider(store.clone())),
    }
}
