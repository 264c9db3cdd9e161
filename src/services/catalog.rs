use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::category::{self, Entity as CategoryEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::errors::ServiceError;

/// Read-only access to the menu: categories and their products.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let rows = CategoryEntity::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let rows = ProductEntity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::ItemName)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let rows = ProductEntity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::ItemName)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }
}
