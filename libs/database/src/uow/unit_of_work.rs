use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{RepositoryRegistry, Session, UnitOfWorkError, UnitOfWorkResult};

/// Transactional scope over one [`Session`].
///
/// Repositories are resolved lazily through the registry and cached per
/// capability, so every call to [`repository`](Self::repository) for the same
/// interface within this scope yields the same instance. Repositories are
/// lent out as `&R`, which keeps them from outliving the unit of work.
///
/// The session is released by [`dispose`](Self::dispose) or, at the latest,
/// when the unit of work is dropped. Anything not committed by then is
/// discarded.
pub struct UnitOfWork<S: Session> {
    // Dropped before the session so no repository holds it past release.
    repositories: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    session: Arc<S>,
    registry: Arc<RepositoryRegistry<S>>,
    disposed: bool,
}

impl<S: Session> UnitOfWork<S> {
    pub fn new(session: S, registry: Arc<RepositoryRegistry<S>>) -> Self {
        Self {
            repositories: HashMap::new(),
            session: Arc::new(session),
            registry,
            disposed: false,
        }
    }

    /// Resolve the repository implementing capability `R`.
    ///
    /// The first call builds it from the registry and caches it; later calls
    /// return the cached instance. An unregistered `R` fails with
    /// [`UnitOfWorkError::Resolution`] and leaves the cache as it was.
    pub fn repository<R>(&mut self) -> UnitOfWorkResult<&R>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        self.ensure_active()?;

        let resolution_error = || UnitOfWorkError::Resolution {
            interface: type_name::<R>(),
        };

        let slot = match self.repositories.entry(TypeId::of::<R>()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let built = self
                    .registry
                    .build::<R>(&self.session)
                    .ok_or_else(resolution_error)?;
                debug!(interface = type_name::<R>(), "Resolved repository");
                entry.insert(built)
            }
        };

        (**slot)
            .downcast_ref::<Box<R>>()
            .map(|repository| &**repository)
            .ok_or_else(resolution_error)
    }

    /// Flush every change staged through this unit of work atomically.
    ///
    /// A rejected change set surfaces as [`UnitOfWorkError::Persistence`] and
    /// is not retried.
    pub async fn commit(&mut self) -> UnitOfWorkResult<()> {
        self.ensure_active()?;
        self.session.commit().await?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Release the session and drop the cached repositories. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.repositories.clear();
        self.session.release();
        debug!("Unit of work disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of repositories resolved so far in this scope.
    pub fn resolved_count(&self) -> usize {
        self.repositories.len()
    }

    fn ensure_active(&self) -> UnitOfWorkResult<()> {
        if self.disposed {
            Err(UnitOfWorkError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl<S: Session> Drop for UnitOfWork<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: Session> fmt::Debug for UnitOfWork<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("resolved", &self.repositories.len())
            .field("registry", &self.registry)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Hands out a fresh [`UnitOfWork`] per logical operation.
///
/// Cheap to clone; intended to live in router state. Each `begin()` opens a
/// new session, so no two units of work share a session or a cache.
pub struct UnitOfWorkProvider<S: Session> {
    registry: Arc<RepositoryRegistry<S>>,
    open_session: Arc<dyn Fn() -> S + Send + Sync>,
}

impl<S: Session> UnitOfWorkProvider<S> {
    pub fn new<F>(registry: RepositoryRegistry<S>, open_session: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            registry: Arc::new(registry),
            open_session: Arc::new(open_session),
        }
    }

    pub fn begin(&self) -> UnitOfWork<S> {
        UnitOfWork::new((self.open_session)(), Arc::clone(&self.registry))
    }

    pub fn registry(&self) -> &RepositoryRegistry<S> {
        &self.registry
    }
}

impl<S: Session> Clone for UnitOfWorkProvider<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            open_session: Arc::clone(&self.open_session),
        }
    }
}
