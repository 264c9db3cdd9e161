use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sale::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Sale::ClientName)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Sale::SaleDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sale::TotalAmount)
                            .decimal_len(18, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Sale::AreaId).big_integer().null())
                    .col(
                        ColumnDef::new(Sale::OrderType)
                            .string_len(50)
                            .not_null()
                            .default("Dine In"),
                    )
                    .col(ColumnDef::new(Sale::PhoneNo).string_len(50).null())
                    .col(ColumnDef::new(Sale::DeliveryAddress).string_len(500).null())
                    .col(ColumnDef::new(Sale::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(Sale::DispatchAmount)
                            .decimal_len(18, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Sale::DeliveryCharges)
                            .decimal_len(18, 2)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Sale::Closed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sale::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Sale {
    Table,
    Id,
    ClientName,
    SaleDate,
    TotalAmount,
    AreaId,
    OrderType,
    PhoneNo,
    DeliveryAddress,
    UserId,
    DispatchAmount,
    DeliveryCharges,
    Closed,
}
