use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_sale_table::Sale;
use crate::m20240301_000002_create_sale_item_table::SaleItem;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Open sales per area is the hot path for the table grid
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_area_closed")
                    .table(Sale::Table)
                    .col(Sale::AreaId)
                    .col(Sale::Closed)
                    .to_owned(),
            )
            .await?;

        // Sales listing filters on status, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_closed_id")
                    .table(Sale::Table)
                    .col(Sale::Closed)
                    .col((Sale::Id, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sale_item_sale_id")
                    .table(SaleItem::Table)
                    .col(SaleItem::SaleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sale_area_closed")
                    .table(Sale::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sale_closed_id")
                    .table(Sale::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sale_item_sale_id")
                    .table(SaleItem::Table)
                    .to_owned(),
            )
            .await
    }
}
