use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::common::{DatabaseError, DatabaseResult};
use crate::uow::Session;

/// Session backed by a single PostgreSQL transaction.
///
/// The transaction is opened on first use and committed by [`Session::commit`].
/// A later statement opens a new one. Releasing drops any open transaction,
/// which SeaORM rolls back.
pub struct PgSession {
    db: DatabaseConnection,
    transaction: Mutex<Option<DatabaseTransaction>>,
    released: AtomicBool,
}

impl PgSession {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            transaction: Mutex::new(None),
            released: AtomicBool::new(false),
        }
    }

    /// Borrow the session's transaction, beginning it if none is open.
    ///
    /// Repositories run every statement through this guard so their writes
    /// stay invisible to other sessions until commit.
    pub async fn transaction(&self) -> DatabaseResult<MappedMutexGuard<'_, DatabaseTransaction>> {
        if self.is_released() {
            return Err(DatabaseError::SessionReleased);
        }

        let mut slot = self.transaction.lock().await;
        if slot.is_none() {
            *slot = Some(self.db.begin().await?);
            debug!("Opened PostgreSQL transaction");
        }

        MutexGuard::try_map(slot, |txn| txn.as_mut()).map_err(|_| DatabaseError::SessionReleased)
    }
}

#[async_trait]
impl Session for PgSession {
    async fn commit(&self) -> DatabaseResult<()> {
        if self.is_released() {
            return Err(DatabaseError::SessionReleased);
        }

        let open = self.transaction.lock().await.take();
        match open {
            Some(txn) => {
                txn.commit().await?;
                debug!("Committed PostgreSQL transaction");
            }
            None => debug!("Nothing staged, commit is a no-op"),
        }
        Ok(())
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.transaction.try_lock() {
            Ok(mut slot) => {
                if slot.take().is_some() {
                    debug!("Rolled back uncommitted PostgreSQL transaction");
                }
            }
            // Rolled back once the last Arc to the session is dropped.
            Err(_) => warn!("Session released while a statement was in flight"),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}
