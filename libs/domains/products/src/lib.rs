//! Products Domain
//!
//! Inventory product CRUD on top of the unit of work from `database::uow`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, validation at the boundary
//! └──────┬──────┘
//!        │ provider.begin()
//! ┌──────▼──────┐
//! │   Service   │  ← NotFound guards, commit after staging
//! └──────┬──────┘
//!        │ uow.repository::<dyn ProductRepository>()
//! ┌──────▼──────┐
//! │ Repository  │  ← PostgreSQL or in-memory, staged in the session
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product and its DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_products::{handlers, memory_provider, InMemoryProductStore};
//!
//! let provider = memory_provider(InMemoryProductStore::new());
//! let router = axum::Router::new().nest("/products", handlers::router(provider));
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

use database::RepositoryRegistry;
use database::UnitOfWorkProvider;
use database::postgres::{DatabaseConnection, PgSession};

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::{ApiDoc, router};
pub use memory::{InMemoryProductRepository, InMemoryProductStore, InMemorySession};
pub use models::{CreateProduct, Product, UpdateProduct};
pub use postgres::PgProductRepository;
pub use repository::ProductRepository;
pub use service::ProductService;

/// Unit of work provider backed by PostgreSQL transactions.
pub fn postgres_provider(db: DatabaseConnection) -> UnitOfWorkProvider<PgSession> {
    let mut registry = RepositoryRegistry::new();
    registry.register::<dyn ProductRepository, _>(|session| Box::new(PgProductRepository::new(session)));

    UnitOfWorkProvider::new(registry, move || PgSession::new(db.clone()))
}

/// Unit of work provider backed by a shared in-memory store.
pub fn memory_provider(store: InMemoryProductStore) -> UnitOfWorkProvider<InMemorySession> {
    let mut registry = RepositoryRegistry::new();
    registry.register::<dyn ProductRepository, _>(|session| {
        Box::new(InMemoryProductRepository::new(session))
    });

    UnitOfWorkProvider::new(registry, move || InMemorySession::new(store.clone()))
}
