use async_trait::async_trait;

use crate::common::DatabaseResult;

/// A storage session: the pending change set of exactly one unit of work.
///
/// Repositories stage reads and writes against the session they were built
/// with; nothing becomes visible to other sessions until [`Session::commit`].
#[async_trait]
pub trait Session: Send + Sync + 'static {
    /// Durably apply everything staged so far, all or nothing.
    async fn commit(&self) -> DatabaseResult<()>;

    /// Discard uncommitted work and hand back the underlying connection.
    ///
    /// Must be idempotent and must not block: it runs from `Drop`.
    fn release(&self);

    fn is_released(&self) -> bool;
}
