//! Persistence plumbing shared by the domain crates.
//!
//! - [`uow`]: the Unit of Work, its repository registry and the `Session`
//!   abstraction that repositories stage changes into.
//! - [`postgres`] (feature `postgres`, default): pool configuration,
//!   connection with retry, migrations, health probe and [`postgres::PgSession`].
//! - [`common`]: the shared error type and connection retry policy.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PgSession, PostgresConfig};
//! use database::uow::{RepositoryRegistry, UnitOfWorkProvider};
//!
//! let db = postgres::connect_from_config(PostgresConfig::from_env()?).await?;
//! let mut registry = RepositoryRegistry::new();
//! registry.register::<dyn ProductRepository, _>(|session| Box::new(PgProductRepository::new(session)));
//!
//! let provider = UnitOfWorkProvider::new(registry, move || PgSession::new(db.clone()));
//! let mut uow = provider.begin();
//! let products = uow.repository::<dyn ProductRepository>()?.get_all().await?;
//! ```

pub mod common;
pub mod uow;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
pub use uow::{RepositoryRegistry, Session, UnitOfWork, UnitOfWorkError, UnitOfWorkProvider};
