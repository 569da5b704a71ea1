use async_trait::async_trait;
use database::DatabaseResult;
use database::postgres::PgSession;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::debug;

use crate::entity;
use crate::models::{CreateProduct, Product};
use crate::repository::ProductRepository;

/// PostgreSQL product repository.
///
/// Every statement runs inside the session's transaction, so writes stay
/// private to the owning unit of work until it commits.
pub struct PgProductRepository {
    session: Arc<PgSession>,
}

impl PgProductRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_all(&self) -> DatabaseResult<Vec<Product>> {
        let txn = self.session.transaction().await?;
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&*txn)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> DatabaseResult<Option<Product>> {
        let txn = self.session.transaction().await?;
        let model = entity::Entity::find_by_id(id).one(&*txn).await?;

        Ok(model.map(Product::from))
    }

    async fn add(&self, input: CreateProduct) -> DatabaseResult<Product> {
        let txn = self.session.transaction().await?;
        let model = entity::ActiveModel::from(input).insert(&*txn).await?;

        debug!(product_id = model.id, "Staged product insert");
        Ok(model.into())
    }

    async fn update(&self, product: Product) -> DatabaseResult<Product> {
        let txn = self.session.transaction().await?;
        let model = entity::ActiveModel::from(product).update(&*txn).await?;

        debug!(product_id = model.id, "Staged product update");
        Ok(model.into())
    }

    async fn delete(&self, product: Product) -> DatabaseResult<()> {
        let txn = self.session.transaction().await?;
        entity::Entity::delete_by_id(product.id).exec(&*txn).await?;

        debug!(product_id = product.id, "Staged product delete");
        Ok(())
    }
}
