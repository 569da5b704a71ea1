//! Building blocks shared by every storage backend

pub mod error;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use retry::{RetryPolicy, retry_with_backoff};
