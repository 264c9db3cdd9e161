pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_sale_table;
mod m20240301_000002_create_sale_item_table;
mod m20240301_000003_create_area_table;
mod m20240301_000004_create_catalog_tables;
mod m20240301_000005_create_setting_table;
mod m20240301_000006_create_user_login_table;
mod m20240422_000007_add_sale_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_sale_table::Migration),
            Box::new(m20240301_000002_create_sale_item_table::Migration),
            Box::new(m20240301_000003_create_area_table::Migration),
            Box::new(m20240301_000004_create_catalog_tables::Migration),
            Box::new(m20240301_000005_create_setting_table::Migration),
            Box::new(m20240301_000006_create_user_login_table::Migration),
            Box::new(m20240422_000007_add_sale_indexes::Migration),
        ]
    }
}
