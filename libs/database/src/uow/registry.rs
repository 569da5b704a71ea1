use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Session;

type BoxedRepository = Box<dyn Any + Send + Sync>;
type Factory<S> = Box<dyn Fn(Arc<S>) -> BoxedRepository + Send + Sync>;

struct Registration<S> {
    interface: &'static str,
    build: Factory<S>,
}

/// Maps capability interfaces to the factories that construct them.
///
/// The key is the `TypeId` of the interface type itself, typically a trait
/// object such as `dyn ProductRepository`, so consumers ask for the
/// capability and never name the concrete storage type.
///
/// ```ignore
/// let mut registry = RepositoryRegistry::<PgSession>::new();
/// registry.register::<dyn ProductRepository, _>(|session| {
///     Box::new(PgProductRepository::new(session))
/// });
/// ```
pub struct RepositoryRegistry<S> {
    factories: HashMap<TypeId, Registration<S>>,
}

impl<S: Session> RepositoryRegistry<S> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register the factory for capability `R`, replacing any previous one.
    pub fn register<R, F>(&mut self, factory: F) -> &mut Self
    where
        R: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>) -> Box<R> + Send + Sync + 'static,
    {
        let build: Factory<S> = Box::new(move |session| Box::new(factory(session)) as BoxedRepository);
        self.factories.insert(
            TypeId::of::<R>(),
            Registration {
                interface: type_name::<R>(),
                build,
            },
        );
        self
    }

    pub fn contains<R: ?Sized + 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a fresh `Box<R>` (type-erased) bound to `session`.
    pub(crate) fn build<R: ?Sized + 'static>(&self, session: &Arc<S>) -> Option<BoxedRepository> {
        self.factories
            .get(&TypeId::of::<R>())
            .map(|registration| (registration.build)(Arc::clone(session)))
    }
}

impl<S: Session> Default for RepositoryRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for RepositoryRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.values().map(|r| r.interface))
            .finish()
    }
}
