use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::auth::SessionUser;
use crate::errors::ServiceError;
use crate::handlers::orders::SaleResponse;
use crate::services::orders::{OrderType, SaleStatus, SalesQuery};
use crate::{ApiResponse, AppState, PaginatedResponse};

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    10
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Exact order id.
    pub search: Option<String>,
    /// Order type name, or "All".
    pub order_type: Option<String>,
    /// "Open", "Closed", or "All".
    pub status: Option<String>,
}

impl SalesListQuery {
    /// Normalize the loosely-typed query string into the store's filter
    /// set, rejecting malformed values instead of guessing.
    fn into_filters(self) -> Result<SalesQuery, ServiceError> {
        let search = match self.search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ServiceError::ValidationError(format!("search must be an order id, got '{raw}'"))
            })?),
        };

        let order_type = match self.order_type.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(raw) => Some(OrderType::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown order type: {raw}"))
            })?),
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(raw) => Some(SaleStatus::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown status: {raw}"))
            })?),
        };

        Ok(SalesQuery {
            page: self.page,
            limit: self.limit,
            search,
            order_type,
            status,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkCloseRequest {
    #[serde(default)]
    pub order_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub close_all_running: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCloseResponse {
    /// Number of orders actually transitioned to closed.
    pub count: u64,
}

/// List sales with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/sales",
    summary = "List sales",
    description = "Paginated sales history, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("search" = Option<String>, Query, description = "Exact order id"),
        ("orderType" = Option<String>, Query, description = "Order type name, or All"),
        ("status" = Option<String>, Query, description = "Open, Closed, or All"),
    ),
    responses(
        (status = 200, description = "Sales retrieved", body = ApiResponse<PaginatedResponse<SaleResponse>>),
        (status = 400, description = "Malformed filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    _user: SessionUser,
    Query(query): Query<SalesListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<SaleResponse>>>, ServiceError> {
    let filters = query.into_filters()?;
    let limit = filters.limit.max(1);

    let page = state.services.orders.get_sales(filters).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: page.rows.into_iter().map(SaleResponse::from).collect(),
        total: page.total,
        page: page.page,
        limit,
        total_pages: page.total_pages,
    })))
}

/// Close many orders, or every running order, in one transaction
#[utoipa::path(
    post,
    path = "/api/sales/bulk",
    summary = "Bulk close orders",
    request_body = BulkCloseRequest,
    responses(
        (status = 200, description = "Orders closed", body = ApiResponse<BulkCloseResponse>),
        (status = 400, description = "Neither orderIds nor closeAllRunning given", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin required", body = crate::errors::ErrorResponse),
    ),
    tag = "Sales"
)]
pub async fn bulk_close(
    State(state): State<AppState>,
    user: SessionUser,
    Json(request): Json<BulkCloseRequest>,
) -> Result<Json<ApiResponse<BulkCloseResponse>>, ServiceError> {
    let svc = state.services.orders.clone();

    let count = if request.close_all_running.unwrap_or(false) {
        svc.close_all_running_orders(&user).await?
    } else {
        match request.order_ids {
            Some(ids) if !ids.is_empty() => svc.close_many_orders(&ids, &user).await?,
            _ => {
                return Err(ServiceError::ValidationError(
                    "Provide orderIds or set closeAllRunning".to_string(),
                ))
            }
        }
    };

    Ok(Json(ApiResponse::success(BulkCloseResponse { count })))
}
