use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SessionUser;
use crate::entities::{category, product};
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image: model.image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub item_code: String,
    pub item_name: String,
    pub price: Decimal,
    /// Stock on hand.
    pub qty: Decimal,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            item_code: model.item_code,
            item_name: model.item_name,
            price: model.sale_price,
            qty: model.qty_balance,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductsByCategoryQuery {
    /// Category id to filter by.
    pub category: i64,
}

/// List active categories
#[utoipa::path(
    get,
    path = "/api/categories",
    summary = "List categories",
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: SessionUser,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ServiceError> {
    let rows = state.services.catalog.categories().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// List active products
#[utoipa::path(
    get,
    path = "/api/products",
    summary = "List products",
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<Vec<ProductResponse>>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: SessionUser,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ServiceError> {
    let rows = state.services.catalog.products().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// List active products in one category
#[utoipa::path(
    get,
    path = "/api/products-by-category",
    summary = "List products by category",
    params(("category" = i64, Query, description = "Category id")),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<Vec<ProductResponse>>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Catalog"
)]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    _user: SessionUser,
    Query(query): Query<ProductsByCategoryQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ServiceError> {
    let rows = state
        .services
        .catalog
        .products_by_category(query.category)
        .await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}
