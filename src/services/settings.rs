use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::setting::{self, Entity as SettingEntity};
use crate::errors::ServiceError;

/// Charge configuration snapshotted into every sale at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChargeSettings {
    /// Percentage surcharge applied to Dine In orders.
    pub percentage_service_charges: Decimal,
    /// Fixed surcharge applied to Home Delivery orders.
    pub fix_delivery_charges: Decimal,
}

impl Default for ChargeSettings {
    fn default() -> Self {
        Self {
            percentage_service_charges: Decimal::ZERO,
            fix_delivery_charges: Decimal::ZERO,
        }
    }
}

impl From<setting::Model> for ChargeSettings {
    fn from(model: setting::Model) -> Self {
        Self {
            percentage_service_charges: model.percentage_service_charges,
            fix_delivery_charges: model.fix_delivery_charges,
        }
    }
}

/// Read the singleton charge row over any connection, including an open
/// transaction. Missing row falls back to zero charges.
pub(crate) async fn load_charges<C: ConnectionTrait>(
    conn: &C,
) -> Result<ChargeSettings, ServiceError> {
    let row = SettingEntity::find().one(conn).await?;
    match row {
        Some(model) => Ok(model.into()),
        None => {
            warn!("no settings row found, defaulting to zero charges");
            Ok(ChargeSettings::default())
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    db_pool: Arc<DbPool>,
}

impl SettingsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn charges(&self) -> Result<ChargeSettings, ServiceError> {
        load_charges(&*self.db_pool).await
    }
}
