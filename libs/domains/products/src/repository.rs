use async_trait::async_trait;
use database::DatabaseResult;

use crate::models::{CreateProduct, Product};

/// Persistence capability for products.
///
/// Implementations stage their writes in the session of the unit of work
/// that built them; nothing is durable until that unit of work commits.
/// Only storage failures are reported here. Absence is `None`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product visible to the session
    async fn get_all(&self) -> DatabaseResult<Vec<Product>>;

    async fn get_by_id(&self, id: i32) -> DatabaseResult<Option<Product>>;

    /// Stage an insert; the returned product carries its storage-assigned id
    async fn add(&self, input: CreateProduct) -> DatabaseResult<Product>;

    /// Stage a full replacement of the row with `product.id`
    async fn update(&self, product: Product) -> DatabaseResult<Product>;

    /// Stage removal of `product` by identity
    async fn delete(&self, product: Product) -> DatabaseResult<()>;
}
