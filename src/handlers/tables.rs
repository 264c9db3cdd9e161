use axum::{extract::State, Json};

use crate::auth::SessionUser;
use crate::errors::ServiceError;
use crate::services::tables::TableStatus;
use crate::{ApiResponse, AppState};

/// Snapshot of every table with its running order
#[utoipa::path(
    get,
    path = "/api/tables",
    summary = "Table grid snapshot",
    description = "Every area with its most recent open sale, free tables first",
    responses(
        (status = 200, description = "Snapshot computed", body = ApiResponse<Vec<TableStatus>>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    _user: SessionUser,
) -> Result<Json<ApiResponse<Vec<TableStatus>>>, ServiceError> {
    let rows = state.services.tables.snapshot().await?;
    Ok(Json(ApiResponse::success(rows)))
}
