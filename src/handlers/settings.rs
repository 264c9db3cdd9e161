use axum::{extract::State, Json};

use crate::auth::SessionUser;
use crate::errors::ServiceError;
use crate::services::settings::ChargeSettings;
use crate::{ApiResponse, AppState};

/// Current charge configuration
#[utoipa::path(
    get,
    path = "/api/settings",
    summary = "Charge configuration",
    description = "Service-charge percentage and fixed delivery fee applied to new orders",
    responses(
        (status = 200, description = "Settings retrieved", body = ApiResponse<ChargeSettings>),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    _user: SessionUser,
) -> Result<Json<ApiResponse<ChargeSettings>>, ServiceError> {
    let charges = state.services.settings.charges().await?;
    Ok(Json(ApiResponse::success(charges)))
}
