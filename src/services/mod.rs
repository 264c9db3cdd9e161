pub mod catalog;
pub mod orders;
pub mod settings;
pub mod tables;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventBus;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<orders::OrderService>,
    pub tables: Arc<tables::TableViewService>,
    pub catalog: Arc<catalog::CatalogService>,
    pub settings: Arc<settings::SettingsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_bus: EventBus) -> Self {
        Self {
            orders: Arc::new(orders::OrderService::new(db_pool.clone(), event_bus)),
            tables: Arc::new(tables::TableViewService::new(db_pool.clone())),
            catalog: Arc::new(catalog::CatalogService::new(db_pool.clone())),
            settings: Arc::new(settings::SettingsService::new(db_pool)),
        }
    }
}
