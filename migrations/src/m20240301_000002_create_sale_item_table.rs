use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_sale_table::Sale;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SaleItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SaleItem::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SaleItem::SaleId).big_integer().not_null())
                    .col(
                        ColumnDef::new(SaleItem::ItemCode)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SaleItem::Qty).integer().not_null())
                    .col(
                        ColumnDef::new(SaleItem::SalePrice)
                            .decimal_len(18, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item_sale")
                            .from(SaleItem::Table, SaleItem::SaleId)
                            .to(Sale::Table, Sale::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SaleItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SaleItem {
    Table,
    Id,
    SaleId,
    ItemCode,
    Qty,
    SalePrice,
}
