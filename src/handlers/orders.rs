use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SessionUser;
use crate::entities::sale;
use crate::errors::ServiceError;
use crate::services::orders::{self as svc_orders, OrderInput, OrderType};
use crate::{ApiResponse, AppState};

/// Order submission: creates a new order, or replaces an existing one when
/// `orderId` is present. The item list always replaces the stored lines.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitOrderRequest {
    /// Present for updates, absent for new orders.
    pub order_id: Option<i64>,
    pub table_name: String,
    pub items: Vec<SubmitOrderItem>,
    pub net_total: Decimal,
    pub area_id: Option<i64>,
    pub order_type: OrderType,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitOrderItem {
    pub item_code: String,
    pub qty: i32,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub order_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i64,
    pub client_name: String,
    pub sale_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub area_id: Option<i64>,
    pub order_type: String,
    pub phone_no: Option<String>,
    pub delivery_address: Option<String>,
    pub user_id: Option<i64>,
    pub dispatch_amount: Decimal,
    pub delivery_charges: Decimal,
    pub closed: bool,
}

impl From<sale::Model> for SaleResponse {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            client_name: model.client_name,
            sale_date: model.sale_date,
            total_amount: model.total_amount,
            area_id: model.area_id,
            order_type: model.order_type,
            phone_no: model.phone_no,
            delivery_address: model.delivery_address,
            user_id: model.user_id,
            dispatch_amount: model.dispatch_amount,
            delivery_charges: model.delivery_charges,
            closed: model.closed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub item_code: String,
    pub item_name: String,
    pub price: Decimal,
    pub qty: i32,
}

impl From<svc_orders::OrderLine> for OrderItemResponse {
    fn from(line: svc_orders::OrderLine) -> Self {
        Self {
            id: line.id,
            item_code: line.item_code,
            item_name: line.item_name,
            price: line.price,
            qty: line.qty,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsResponse {
    pub sale: SaleResponse,
    pub items: Vec<OrderItemResponse>,
}

impl SubmitOrderRequest {
    fn into_parts(self) -> (Option<i64>, OrderInput) {
        let input = OrderInput {
            table_name: self.table_name,
            items: self
                .items
                .into_iter()
                .map(|item| svc_orders::OrderLineInput {
                    item_code: item.item_code,
                    qty: item.qty,
                    price: item.price,
                })
                .collect(),
            net_total: self.net_total,
            area_id: self.area_id,
            order_type: self.order_type,
            phone: self.phone,
            address: self.address,
        };
        (self.order_id, input)
    }
}

/// Create or update an order
#[utoipa::path(
    post,
    path = "/api/orders",
    summary = "Submit an order",
    description = "Creates a new order, or fully replaces an existing one when orderId is present",
    request_body = SubmitOrderRequest,
    responses(
        (status = 200, description = "Order stored", body = ApiResponse<SubmitOrderResponse>),
        (status = 400, description = "Invalid order payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the order's owner", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order closed or table occupied", body = crate::errors::ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn submit_order(
    State(state): State<AppState>,
    user: SessionUser,
    Json(request): Json<SubmitOrderRequest>,
) -> Result<Json<ApiResponse<SubmitOrderResponse>>, ServiceError> {
    let svc = state.services.orders.clone();
    let (order_id, input) = request.into_parts();

    let order_id = match order_id {
        Some(id) => {
            svc.update_order(id, input, &user).await?;
            id
        }
        None => svc.create_order(input, &user).await?,
    };

    Ok(Json(ApiResponse::success(SubmitOrderResponse { order_id })))
}

/// Fetch one order with its line items
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    summary = "Get order details",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderDetailsResponse>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order id", body = crate::errors::ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _user: SessionUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetailsResponse>>, ServiceError> {
    let details = state.services.orders.get_order(id).await?;

    Ok(Json(ApiResponse::success(OrderDetailsResponse {
        sale: details.sale.into(),
        items: details.items.into_iter().map(Into::into).collect(),
    })))
}

/// Close an order (admin only)
#[utoipa::path(
    post,
    path = "/api/orders/{id}/close",
    summary = "Close an order",
    description = "Marks the order closed and frees its table. Closed orders are immutable.",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order closed", body = ApiResponse<SubmitOrderResponse>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order id", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already closed", body = crate::errors::ErrorResponse),
    ),
    tag = "Orders"
)]
pub async fn close_order(
    State(state): State<AppState>,
    user: SessionUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SubmitOrderResponse>>, ServiceError> {
    state.services.orders.close_order(id, &user).await?;
    Ok(Json(ApiResponse::success(SubmitOrderResponse {
        order_id: id,
    })))
}
