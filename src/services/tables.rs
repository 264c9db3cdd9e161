use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::area::{self, Entity as AreaEntity};
use crate::entities::sale::{self, Entity as SaleEntity};
use crate::entities::user_login::{self, Entity as UserLoginEntity};
use crate::errors::ServiceError;
use crate::services::orders::{displayed_total, OrderType};

/// One row of the table grid: the area plus its running order, if any.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableStatus {
    pub id: i64,
    pub name: String,
    pub remarks: Option<String>,
    pub is_active: bool,
    pub sale_id: Option<i64>,
    /// Item total straight from the sale header.
    pub raw_total_amount: Option<Decimal>,
    /// Item total plus service or delivery charge.
    pub sale_total: Option<Decimal>,
    /// Display name of whoever opened the order.
    pub created_by: Option<String>,
    pub user_id: Option<i64>,
}

/// Stateless read model over Area + Sale; recomputed per request.
#[derive(Clone)]
pub struct TableViewService {
    db_pool: Arc<DbPool>,
}

impl TableViewService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Snapshot of every area with its most recent open sale attached.
    /// Free tables sort before occupied ones, each group by id.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<Vec<TableStatus>, ServiceError> {
        let db = &*self.db_pool;

        let areas = AreaEntity::find()
            .order_by_asc(area::Column::IsActive)
            .order_by_asc(area::Column::Id)
            .all(db)
            .await?;

        // Newest open sale per area: rows arrive id-descending, first wins.
        let open_sales = SaleEntity::find()
            .filter(sale::Column::Closed.eq(false))
            .filter(sale::Column::AreaId.is_not_null())
            .order_by_desc(sale::Column::Id)
            .all(db)
            .await?;

        let mut latest_by_area: HashMap<i64, &sale::Model> = HashMap::new();
        for sale in &open_sales {
            if let Some(area_id) = sale.area_id {
                latest_by_area.entry(area_id).or_insert(sale);
            }
        }

        let user_ids: Vec<i64> = latest_by_area
            .values()
            .filter_map(|s| s.user_id)
            .collect();
        let user_names: HashMap<i64, String> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            UserLoginEntity::find()
                .filter(user_login::Column::Id.is_in(user_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        };

        let rows = areas
            .into_iter()
            .map(|area| {
                let running = if area.is_active {
                    latest_by_area.get(&area.id).copied()
                } else {
                    None
                };

                match running {
                    Some(sale) => {
                        let order_type = OrderType::from_str(&sale.order_type).ok();
                        TableStatus {
                            id: area.id,
                            name: area.name,
                            remarks: area.remarks,
                            is_active: area.is_active,
                            sale_id: Some(sale.id),
                            raw_total_amount: Some(sale.total_amount),
                            sale_total: Some(displayed_total(
                                sale.total_amount,
                                order_type,
                                sale.dispatch_amount,
                                sale.delivery_charges,
                            )),
                            created_by: sale.user_id.and_then(|id| user_names.get(&id).cloned()),
                            user_id: sale.user_id,
                        }
                    }
                    None => TableStatus {
                        id: area.id,
                        name: area.name,
                        remarks: area.remarks,
                        is_active: area.is_active,
                        sale_id: None,
                        raw_total_amount: None,
                        sale_total: None,
                        created_by: None,
                        user_id: None,
                    },
                }
            })
            .collect();

        Ok(rows)
    }
}
