//! Unit of Work with a per-scope repository cache.
//!
//! ```text
//!   UnitOfWorkProvider ──begin()──▶ UnitOfWork<S> ──owns──▶ Session (S)
//!          │                          │
//!          │ Arc                      │ repository::<dyn Capability>()
//!          ▼                          ▼
//!   RepositoryRegistry<S>  ──build──▶ cache: TypeId ─▶ Box<dyn Capability>
//! ```
//!
//! The registry is shared by every unit of work handed out by a provider;
//! sessions and cached repositories never are.

mod error;
mod registry;
mod session;
mod unit_of_work;

pub use error::{UnitOfWorkError, UnitOfWorkResult};
pub use registry::RepositoryRegistry;
pub use session::Session;
pub use unit_of_work::{UnitOfWork, UnitOfWorkProvider};
