use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::SessionUser;
use crate::db::DbPool;
use crate::entities::area::{self, Entity as AreaEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::sale::{self, Entity as SaleEntity};
use crate::entities::sale_item::{self, Entity as SaleItemEntity};
use crate::errors::ServiceError;
use crate::events::{EventBus, OrderEventKind, OrderEventPayload, BULK_EVENT_CAP};
use crate::services::settings::{load_charges, ChargeSettings};

/// How a sale is fulfilled. The display strings are also the stored and
/// wire representation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    utoipa::ToSchema,
)]
pub enum OrderType {
    #[serde(rename = "Dine In")]
    #[strum(serialize = "Dine In")]
    DineIn,
    #[serde(rename = "Take Away")]
    #[strum(serialize = "Take Away")]
    TakeAway,
    #[serde(rename = "Home Delivery")]
    #[strum(serialize = "Home Delivery")]
    HomeDelivery,
}

/// Open/closed listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString)]
pub enum SaleStatus {
    Open,
    Closed,
}

/// One cart line as submitted by a terminal.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    #[validate(length(min = 1, message = "Item code is required"))]
    pub item_code: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub qty: i32,
    pub price: Decimal,
}

/// Full order content for create and update. Updates replace the stored
/// line set wholesale; there is no diffing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderInput {
    #[validate(length(min = 1, message = "Table name is required"))]
    pub table_name: String,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineInput>,
    /// Pre-charge item total as shown on the terminal.
    pub net_total: Decimal,
    pub area_id: Option<i64>,
    pub order_type: OrderType,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl OrderInput {
    /// Field validation plus the cross-field rules validator can't express.
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        for line in &self.items {
            line.validate()?;
        }

        if self.order_type == OrderType::HomeDelivery {
            let phone_missing = self.phone.as_deref().map_or(true, |p| p.trim().is_empty());
            let address_missing = self
                .address
                .as_deref()
                .map_or(true, |a| a.trim().is_empty());
            if phone_missing || address_missing {
                return Err(ServiceError::ValidationError(
                    "Home Delivery orders require a phone number and delivery address".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Listing filters for the sales history screen.
#[derive(Debug, Clone, Default)]
pub struct SalesQuery {
    pub page: u64,
    pub limit: u64,
    /// Exact order id match.
    pub search: Option<i64>,
    pub order_type: Option<OrderType>,
    pub status: Option<SaleStatus>,
}

#[derive(Debug, Serialize)]
pub struct SalesPage {
    pub rows: Vec<sale::Model>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

/// A stored order line joined with its catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Product id when the catalog still knows the code, else the line id.
    pub id: i64,
    pub item_code: String,
    pub item_name: String,
    pub price: Decimal,
    pub qty: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    pub sale: sale::Model,
    pub items: Vec<OrderLine>,
}

/// Charge snapshot derived from the current settings row: Dine In takes the
/// service-charge percentage, Home Delivery the fixed fee, Take Away neither.
pub fn charge_snapshot(order_type: OrderType, settings: &ChargeSettings) -> (Decimal, Decimal) {
    match order_type {
        OrderType::DineIn => (settings.percentage_service_charges, Decimal::ZERO),
        OrderType::HomeDelivery => (Decimal::ZERO, settings.fix_delivery_charges),
        OrderType::TakeAway => (Decimal::ZERO, Decimal::ZERO),
    }
}

/// Customer-facing total: item total plus the snapshotted percentage
/// (Dine In) or fixed delivery fee (Home Delivery).
pub fn displayed_total(
    total_amount: Decimal,
    order_type: Option<OrderType>,
    dispatch_amount: Decimal,
    delivery_charges: Decimal,
) -> Decimal {
    match order_type {
        Some(OrderType::DineIn) if dispatch_amount > Decimal::ZERO => {
            total_amount + total_amount * dispatch_amount / Decimal::ONE_HUNDRED
        }
        Some(OrderType::HomeDelivery) => total_amount + delivery_charges,
        _ => total_amount,
    }
}

/// Transactional store for the order lifecycle: Open on create, any number
/// of whole-content updates, Closed as the terminal state.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_bus: EventBus,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_bus: EventBus) -> Self {
        Self { db_pool, event_bus }
    }

    /// Creates a new open order with its line items in one transaction.
    #[instrument(skip(self, input), fields(table = %input.table_name, order_type = %input.order_type))]
    pub async fn create_order(
        &self,
        input: OrderInput,
        acting_user: &SessionUser,
    ) -> Result<i64, ServiceError> {
        input.check()?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let settings = load_charges(&txn).await?;
        let (dispatch_amount, delivery_charges) = charge_snapshot(input.order_type, &settings);

        let area = match input.area_id {
            Some(area_id) => Some(self.claimable_area(&txn, area_id, None).await?),
            None => None,
        };

        let sale_model = sale::ActiveModel {
            client_name: Set(input.table_name.clone()),
            sale_date: Set(chrono::Utc::now()),
            total_amount: Set(input.net_total),
            area_id: Set(input.area_id),
            order_type: Set(input.order_type.to_string()),
            phone_no: Set(input.phone.clone()),
            delivery_address: Set(input.address.clone()),
            user_id: Set(Some(acting_user.id)),
            dispatch_amount: Set(dispatch_amount),
            delivery_charges: Set(delivery_charges),
            closed: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(area) = area {
            let mut occupied = area.into_active_model();
            occupied.is_active = Set(true);
            occupied.update(&txn).await?;
        }

        let lines: Vec<sale_item::ActiveModel> = input
            .items
            .iter()
            .map(|line| sale_item::ActiveModel {
                sale_id: Set(sale_model.id),
                item_code: Set(line.item_code.clone()),
                qty: Set(line.qty),
                sale_price: Set(line.price),
                ..Default::default()
            })
            .collect();
        SaleItemEntity::insert_many(lines).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id = sale_model.id, "order created");

        self.event_bus.publish(
            OrderEventKind::OrderCreated,
            OrderEventPayload {
                order_id: sale_model.id,
                table_name: Some(input.table_name),
                user: Some(acting_user.name.clone()),
                user_id: Some(acting_user.id),
                amount: Some(input.net_total),
                order_type: Some(input.order_type.to_string()),
            },
        );

        Ok(sale_model.id)
    }

    /// Replaces an open order's header and entire line set.
    ///
    /// Authorization runs before any write: only the creator or an admin
    /// may touch the order. Closed orders reject the update outright.
    #[instrument(skip(self, input), fields(order_id = order_id))]
    pub async fn update_order(
        &self,
        order_id: i64,
        input: OrderInput,
        acting_user: &SessionUser,
    ) -> Result<(), ServiceError> {
        input.check()?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = SaleEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !acting_user.owns_or_admin(existing.user_id) {
            warn!(order_id, user_id = acting_user.id, "update denied");
            return Err(ServiceError::Forbidden(
                "You can only update your own orders".to_string(),
            ));
        }

        if existing.closed {
            return Err(ServiceError::Conflict(format!(
                "Order {} is closed and can no longer be modified",
                order_id
            )));
        }

        let settings = load_charges(&txn).await?;
        let (dispatch_amount, delivery_charges) = charge_snapshot(input.order_type, &settings);

        let area = match input.area_id {
            Some(area_id) => Some(self.claimable_area(&txn, area_id, Some(order_id)).await?),
            None => None,
        };

        let mut header = existing.into_active_model();
        header.client_name = Set(input.table_name.clone());
        header.sale_date = Set(chrono::Utc::now());
        header.total_amount = Set(input.net_total);
        header.area_id = Set(input.area_id);
        header.order_type = Set(input.order_type.to_string());
        header.phone_no = Set(input.phone.clone());
        header.delivery_address = Set(input.address.clone());
        header.dispatch_amount = Set(dispatch_amount);
        header.delivery_charges = Set(delivery_charges);
        header.update(&txn).await?;

        // Replace semantics: drop every stored line, re-insert the payload.
        SaleItemEntity::delete_many()
            .filter(sale_item::Column::SaleId.eq(order_id))
            .exec(&txn)
            .await?;

        let lines: Vec<sale_item::ActiveModel> = input
            .items
            .iter()
            .map(|line| sale_item::ActiveModel {
                sale_id: Set(order_id),
                item_code: Set(line.item_code.clone()),
                qty: Set(line.qty),
                sale_price: Set(line.price),
                ..Default::default()
            })
            .collect();
        SaleItemEntity::insert_many(lines).exec(&txn).await?;

        if let Some(area) = area {
            let mut occupied = area.into_active_model();
            occupied.is_active = Set(true);
            occupied.update(&txn).await?;
        }

        txn.commit().await?;

        info!(order_id, "order updated");

        self.event_bus.publish(
            OrderEventKind::OrderUpdated,
            OrderEventPayload {
                order_id,
                table_name: Some(input.table_name),
                user: Some(acting_user.name.clone()),
                user_id: Some(acting_user.id),
                amount: Some(input.net_total),
                order_type: Some(input.order_type.to_string()),
            },
        );

        Ok(())
    }

    /// Moves an order to its terminal state and frees its table.
    #[instrument(skip(self), fields(order_id = order_id))]
    pub async fn close_order(
        &self,
        order_id: i64,
        acting_user: &SessionUser,
    ) -> Result<(), ServiceError> {
        if !acting_user.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only administrators can close orders".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = SaleEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if existing.closed {
            return Err(ServiceError::Conflict(format!(
                "Order {} is already closed",
                order_id
            )));
        }

        let area_id = existing.area_id;
        let mut closing = existing.into_active_model();
        closing.closed = Set(true);
        closing.update(&txn).await?;

        if let Some(area_id) = area_id {
            if let Some(area) = AreaEntity::find_by_id(area_id).one(&txn).await? {
                let mut freed = area.into_active_model();
                freed.is_active = Set(false);
                freed.update(&txn).await?;
            }
        }

        txn.commit().await?;

        info!(order_id, "order closed");

        self.event_bus.publish(
            OrderEventKind::OrderClosed,
            OrderEventPayload {
                order_id,
                table_name: None,
                user: Some(acting_user.name.clone()),
                user_id: Some(acting_user.id),
                amount: None,
                order_type: None,
            },
        );

        Ok(())
    }

    /// Closes the given orders in one transaction, freeing every table they
    /// occupy. Already-closed ids are skipped; the returned count is the
    /// number of orders actually transitioned.
    #[instrument(skip(self, order_ids), fields(requested = order_ids.len()))]
    pub async fn close_many_orders(
        &self,
        order_ids: &[i64],
        acting_user: &SessionUser,
    ) -> Result<u64, ServiceError> {
        if !acting_user.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only administrators can close orders".to_string(),
            ));
        }
        if order_ids.is_empty() {
            return Ok(0);
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let targets = SaleEntity::find()
            .filter(sale::Column::Id.is_in(order_ids.to_vec()))
            .filter(sale::Column::Closed.eq(false))
            .all(&txn)
            .await?;

        if targets.is_empty() {
            txn.commit().await?;
            return Ok(0);
        }

        let closed_ids: Vec<i64> = targets.iter().map(|s| s.id).collect();
        let area_ids: Vec<i64> = targets.iter().filter_map(|s| s.area_id).collect();

        if !area_ids.is_empty() {
            AreaEntity::update_many()
                .col_expr(area::Column::IsActive, Expr::value(false))
                .filter(area::Column::Id.is_in(area_ids))
                .exec(&txn)
                .await?;
        }

        let closed = SaleEntity::update_many()
            .col_expr(sale::Column::Closed, Expr::value(true))
            .filter(sale::Column::Id.is_in(closed_ids.clone()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(count = closed.rows_affected, "orders bulk-closed");

        if closed_ids.len() <= BULK_EVENT_CAP {
            for id in &closed_ids {
                self.event_bus.publish(
                    OrderEventKind::OrderClosed,
                    OrderEventPayload {
                        order_id: *id,
                        table_name: None,
                        user: Some(acting_user.name.clone()),
                        user_id: Some(acting_user.id),
                        amount: None,
                        order_type: None,
                    },
                );
            }
        } else {
            self.event_bus.publish(
                OrderEventKind::OrderClosed,
                OrderEventPayload::refresh_all(
                    Some(acting_user.name.clone()),
                    Some(acting_user.id),
                ),
            );
        }

        Ok(closed.rows_affected)
    }

    /// Closes every currently open order and frees every occupied table.
    #[instrument(skip(self))]
    pub async fn close_all_running_orders(
        &self,
        acting_user: &SessionUser,
    ) -> Result<u64, ServiceError> {
        if !acting_user.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only administrators can close orders".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let running = SaleEntity::find()
            .filter(sale::Column::Closed.eq(false))
            .all(&txn)
            .await?;

        let area_ids: Vec<i64> = running.iter().filter_map(|s| s.area_id).collect();
        if !area_ids.is_empty() {
            AreaEntity::update_many()
                .col_expr(area::Column::IsActive, Expr::value(false))
                .filter(area::Column::Id.is_in(area_ids))
                .exec(&txn)
                .await?;
        }

        let closed = SaleEntity::update_many()
            .col_expr(sale::Column::Closed, Expr::value(true))
            .filter(sale::Column::Closed.eq(false))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(count = closed.rows_affected, "all running orders closed");

        self.event_bus.publish(
            OrderEventKind::OrderClosed,
            OrderEventPayload::refresh_all(Some(acting_user.name.clone()), Some(acting_user.id)),
        );

        Ok(closed.rows_affected)
    }

    /// Paginated sales history, newest first.
    #[instrument(skip(self))]
    pub async fn get_sales(&self, query: SalesQuery) -> Result<SalesPage, ServiceError> {
        let db = &*self.db_pool;

        let page = query.page.max(1);
        let limit = query.limit.max(1);

        let mut finder = SaleEntity::find();
        if let Some(id) = query.search {
            finder = finder.filter(sale::Column::Id.eq(id));
        }
        if let Some(order_type) = query.order_type {
            finder = finder.filter(sale::Column::OrderType.eq(order_type.to_string()));
        }
        if let Some(status) = query.status {
            finder = finder.filter(sale::Column::Closed.eq(status == SaleStatus::Closed));
        }

        let paginator = finder
            .order_by_desc(sale::Column::Id)
            .paginate(db, limit);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;
        let total_pages = total.div_ceil(limit);

        Ok(SalesPage {
            rows,
            total,
            page,
            total_pages,
        })
    }

    /// Order header plus line items joined with catalog names. Lines whose
    /// code has left the catalog fall back to the code itself.
    #[instrument(skip(self), fields(order_id = order_id))]
    pub async fn get_order(&self, order_id: i64) -> Result<OrderDetails, ServiceError> {
        let db = &*self.db_pool;

        let sale = SaleEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = SaleItemEntity::find()
            .filter(sale_item::Column::SaleId.eq(order_id))
            .all(db)
            .await?;

        let codes: Vec<String> = items.iter().map(|i| i.item_code.clone()).collect();
        let products: std::collections::HashMap<String, product::Model> = ProductEntity::find()
            .filter(product::Column::ItemCode.is_in(codes))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.item_code.clone(), p))
            .collect();

        let lines = items
            .into_iter()
            .map(|item| {
                let catalog = products.get(&item.item_code);
                OrderLine {
                    id: catalog.map(|p| p.id).unwrap_or(item.id),
                    item_name: catalog
                        .map(|p| p.item_name.clone())
                        .unwrap_or_else(|| item.item_code.clone()),
                    item_code: item.item_code,
                    price: item.sale_price,
                    qty: item.qty,
                }
            })
            .collect();

        Ok(OrderDetails { sale, items: lines })
    }

    /// Loads an area and verifies no *other* open sale holds it.
    /// `current_order` exempts the order being updated so it can keep its
    /// own table.
    async fn claimable_area<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        area_id: i64,
        current_order: Option<i64>,
    ) -> Result<area::Model, ServiceError> {
        let area = AreaEntity::find_by_id(area_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown area {}", area_id))
            })?;

        let mut open_sales = SaleEntity::find()
            .filter(sale::Column::AreaId.eq(area_id))
            .filter(sale::Column::Closed.eq(false));
        if let Some(order_id) = current_order {
            open_sales = open_sales.filter(sale::Column::Id.ne(order_id));
        }

        if let Some(existing) = open_sales.one(conn).await? {
            return Err(ServiceError::Conflict(format!(
                "Area {} already has open order {}",
                area.name, existing.id
            )));
        }

        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings(percentage: Decimal, fixed: Decimal) -> ChargeSettings {
        ChargeSettings {
            percentage_service_charges: percentage,
            fix_delivery_charges: fixed,
        }
    }

    #[test]
    fn charge_snapshot_by_order_type() {
        let s = settings(dec!(10), dec!(150));

        assert_eq!(
            charge_snapshot(OrderType::DineIn, &s),
            (dec!(10), Decimal::ZERO)
        );
        assert_eq!(
            charge_snapshot(OrderType::HomeDelivery, &s),
            (Decimal::ZERO, dec!(150))
        );
        assert_eq!(
            charge_snapshot(OrderType::TakeAway, &s),
            (Decimal::ZERO, Decimal::ZERO)
        );
    }

    #[test]
    fn displayed_total_adds_percentage_for_dine_in() {
        let total = displayed_total(dec!(1000), Some(OrderType::DineIn), dec!(10), Decimal::ZERO);
        assert_eq!(total, dec!(1100));
    }

    #[test]
    fn displayed_total_ignores_zero_percentage() {
        let total = displayed_total(
            dec!(1000),
            Some(OrderType::DineIn),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert_eq!(total, dec!(1000));
    }

    #[test]
    fn displayed_total_adds_fixed_fee_for_delivery() {
        let total = displayed_total(
            dec!(500),
            Some(OrderType::HomeDelivery),
            Decimal::ZERO,
            dec!(150),
        );
        assert_eq!(total, dec!(650));
    }

    #[test]
    fn displayed_total_take_away_is_raw() {
        let total = displayed_total(dec!(750), Some(OrderType::TakeAway), dec!(10), dec!(150));
        assert_eq!(total, dec!(750));
    }

    #[test]
    fn order_type_string_round_trip() {
        for (variant, label) in [
            (OrderType::DineIn, "Dine In"),
            (OrderType::TakeAway, "Take Away"),
            (OrderType::HomeDelivery, "Home Delivery"),
        ] {
            assert_eq!(variant.to_string(), label);
            assert_eq!(label.parse::<OrderType>().unwrap(), variant);
        }
    }

    #[test]
    fn home_delivery_requires_contact_fields() {
        let mut input = OrderInput {
            table_name: "Walk-in".into(),
            items: vec![OrderLineInput {
                item_code: "BRG-01".into(),
                qty: 1,
                price: dec!(450),
            }],
            net_total: dec!(450),
            area_id: None,
            order_type: OrderType::HomeDelivery,
            phone: None,
            address: None,
        };
        assert!(input.check().is_err());

        input.phone = Some("0300-1234567".into());
        input.address = Some("12 Canal Road".into());
        assert!(input.check().is_ok());
    }

    #[test]
    fn empty_cart_is_rejected() {
        let input = OrderInput {
            table_name: "Table 1".into(),
            items: vec![],
            net_total: Decimal::ZERO,
            area_id: None,
            order_type: OrderType::DineIn,
            phone: None,
            address: None,
        };
        assert!(input.check().is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let input = OrderInput {
            table_name: "Table 1".into(),
            items: vec![OrderLineInput {
                item_code: "BRG-01".into(),
                qty: 0,
                price: dec!(450),
            }],
            net_total: dec!(450),
            area_id: None,
            order_type: OrderType::DineIn,
            phone: None,
            address: None,
        };
        assert!(input.check().is_err());
    }
}
