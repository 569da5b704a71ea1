use crate::common::DatabaseError;

/// Failures raised by a [`UnitOfWork`](super::UnitOfWork).
#[derive(Debug, thiserror::Error)]
pub enum UnitOfWorkError {
    /// Nothing is registered for the requested capability. This is a wiring
    /// defect in the host, not a runtime condition.
    #[error("No repository registered for `{interface}`")]
    Resolution { interface: &'static str },

    /// The store rejected the change set or could not be reached
    #[error("Failed to persist changes: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Unit of work has already been disposed")]
    Disposed,
}

pub type UnitOfWorkResult<T> = Result<T, UnitOfWorkError>;
