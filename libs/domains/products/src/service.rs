use database::{Session, UnitOfWork};
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Product use cases over one unit of work.
///
/// A service is built per logical operation and owns its unit of work, so
/// dropping the service releases the session. Every mutation checks that the
/// product exists before staging anything and commits right after staging.
pub struct ProductService<S: Session> {
    uow: UnitOfWork<S>,
}

impl<S: Session> ProductService<S> {
    pub fn new(uow: UnitOfWork<S>) -> Self {
        Self { uow }
    }

    fn repository(&mut self) -> ProductResult<&dyn ProductRepository> {
        Ok(self.uow.repository::<dyn ProductRepository>()?)
    }

    pub async fn get_all(&mut self) -> ProductResult<Vec<Product>> {
        Ok(self.repository()?.get_all().await?)
    }

    pub async fn get_by_id(&mut self, id: i32) -> ProductResult<Product> {
        self.repository()?
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add(&mut self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let product = self.repository()?.add(input).await?;
        self.uow.commit().await?;

        info!(product_id = product.id, "Created product");
        Ok(product)
    }

    /// Replace the stored product with `product` in full.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn update(&mut self, product: Product) -> ProductResult<Product> {
        product
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let repository = self.repository()?;
        repository
            .get_by_id(product.id)
            .await?
            .ok_or(ProductError::NotFound(product.id))?;
        let updated = repository.update(product).await?;
        self.uow.commit().await?;

        info!(product_id = updated.id, "Updated product");
        Ok(updated)
    }

    /// Merge the present fields of `input` into the stored product.
    #[instrument(skip(self, input))]
    pub async fn patch(&mut self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let repository = self.repository()?;
        let mut product = repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);
        let updated = repository.update(product).await?;
        self.uow.commit().await?;

        info!(product_id = id, "Patched product");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: i32) -> ProductResult<()> {
        let repository = self.repository()?;
        let product = repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        repository.delete(product).await?;
        self.uow.commit().await?;

        info!(product_id = id, "Deleted product");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryProductStore, InMemorySession};
    use crate::repository::MockProductRepository;
    use database::{DatabaseError, RepositoryRegistry, UnitOfWorkError, UnitOfWorkProvider};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn widget(id: i32) -> Product {
        Product {
            id,
            name: "Widget".to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            quantity: 5,
        }
    }

    /// A service whose repository is a fresh mock configured by `expect`.
    fn service_with<F>(store: &InMemoryProductStore, expect: F) -> ProductService<InMemorySession>
    where
        F: Fn(&mut MockProductRepository) + Send + Sync + 'static,
    {
        let mut registry = RepositoryRegistry::new();
        registry.register::<dyn ProductRepository, _>(move |_session| {
            let mut mock = MockProductRepository::new();
            expect(&mut mock);
            Box::new(mock)
        });

        let store = store.clone();
        let provider = UnitOfWorkProvider::new(registry, move || InMemorySession::new(store.clone()));
        ProductService::new(provider.begin())
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_by_id().with(eq(3)).times(1).returning(|_| Ok(None));
        });

        let err = service.get_by_id(3).await.unwrap_err();

        assert!(matches!(err, ProductError::NotFound(3)));
    }

    #[tokio::test]
    async fn test_update_missing_never_stages_update() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_by_id().with(eq(9)).times(1).returning(|_| Ok(None));
            mock.expect_update().never();
        });

        let err = service.update(widget(9)).await.unwrap_err();

        assert!(matches!(err, ProductError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_delete_missing_never_stages_delete() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_by_id().with(eq(2)).times(1).returning(|_| Ok(None));
            mock.expect_delete().never();
        });

        let err = service.delete(2).await.unwrap_err();

        assert!(matches!(err, ProductError::NotFound(2)));
    }

    #[tokio::test]
    async fn test_delete_passes_fetched_entity() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_by_id()
                .with(eq(4))
                .times(1)
                .returning(|id| Ok(Some(widget(id))));
            mock.expect_delete()
                .with(eq(widget(4)))
                .times(1)
                .returning(|_| Ok(()));
        });

        service.delete(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_patch_merges_into_fetched_entity() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_by_id().returning(|id| Ok(Some(widget(id))));
            mock.expect_update().times(1).returning(Ok);
        });

        let patched = service
            .patch(
                1,
                UpdateProduct {
                    quantity: Some(12),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.quantity, 12);
        assert_eq!(patched.name, "Widget");
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_input_before_repository() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_add().never();
        });

        let err = service
            .add(CreateProduct {
                name: String::new(),
                description: None,
                price: Decimal::ONE,
                quantity: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_is_persistence_error() {
        let store = InMemoryProductStore::new();
        let mut service = service_with(&store, |mock| {
            mock.expect_get_all()
                .returning(|| Err(DatabaseError::ConnectionFailed("down".into())));
        });

        let err = service.get_all().await.unwrap_err();

        assert!(matches!(
            err,
            ProductError::UnitOfWork(UnitOfWorkError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_repository_is_resolution_error() {
        let provider = UnitOfWorkProvider::new(RepositoryRegistry::new(), || {
            InMemorySession::new(InMemoryProductStore::new())
        });
        let mut service = ProductService::new(provider.begin());

        let err = service.get_all().await.unwrap_err();

        assert!(matches!(
            err,
            ProductError::UnitOfWork(UnitOfWorkError::Resolution { .. })
        ));
    }

    fn create(name: &str, price: Decimal, quantity: i32) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: Some("Seeded".to_string()),
            price,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_add_then_get_by_id_returns_equal_product() {
        let provider = crate::memory_provider(InMemoryProductStore::new());

        let added = ProductService::new(provider.begin())
            .add(create("Widget", Decimal::new(1999, 2), 5))
            .await
            .unwrap();
        let fetched = ProductService::new(provider.begin())
            .get_by_id(added.id)
            .await
            .unwrap();

        assert_eq!(fetched, added);
        assert_eq!(fetched.price.to_string(), "19.99");
        assert_eq!(fetched.quantity, 5);
    }

    #[tokio::test]
    async fn test_delete_second_of_two_leaves_one() {
        let provider = crate::memory_provider(InMemoryProductStore::new());
        let mut seed = ProductService::new(provider.begin());
        seed.add(create("First", Decimal::ONE, 1)).await.unwrap();
        seed.add(create("Second", Decimal::TWO, 2)).await.unwrap();
        drop(seed);

        let mut service = ProductService::new(provider.begin());
        assert_eq!(service.get_all().await.unwrap().len(), 2);
        service.delete(2).await.unwrap();

        let mut service = ProductService::new(provider.begin());
        assert_eq!(service.get_all().await.unwrap().len(), 1);
        assert!(matches!(service.get_by_id(2).await, Err(ProductError::NotFound(2))));
    }

    #[tokio::test]
    async fn test_update_is_visible_to_later_units_of_work() {
        let provider = crate::memory_provider(InMemoryProductStore::new());
        let added = ProductService::new(provider.begin())
            .add(create("Original", Decimal::TEN, 3))
            .await
            .unwrap();

        ProductService::new(provider.begin())
            .update(Product {
                name: "Updated".to_string(),
                price: Decimal::from(15),
                ..added
            })
            .await
            .unwrap();

        let fetched = ProductService::new(provider.begin()).get_by_id(1).await.unwrap();
        assert_eq!(fetched.name, "Updated");
        assert_eq!(fetched.price, Decimal::from(15));
        assert_eq!(fetched.description.as_deref(), Some("Seeded"));
    }
}
