use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{clear_session_cookie, session_cookie, SessionUser};
use crate::entities::user_login::{self, Entity as UserLoginEntity};
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
}

impl From<SessionUser> for UserResponse {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}

/// Exchange credentials for a session cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    summary = "Log in",
    description = "Verifies credentials and sets the http-only session cookie",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing credentials", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid name or password", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if request.name.trim().is_empty() || request.password.is_empty() {
        return Err(ServiceError::ValidationError(
            "Missing credentials".to_string(),
        ));
    }

    let user = UserLoginEntity::find()
        .filter(user_login::Column::Name.eq(request.name.trim()))
        .one(&*state.db)
        .await?;

    // Run both branches through the same rejection so a response can't
    // reveal whether the account exists.
    let rejected = || ServiceError::AuthError("Invalid name or password".to_string());
    let user = user.ok_or_else(rejected)?;
    if !state
        .auth
        .verify_password(&request.password, &user.password_hash)
    {
        return Err(rejected());
    }

    let token = state.auth.issue_session(&user)?;
    let cookie = session_cookie(&token, state.auth.session_ttl());

    info!(user_id = user.id, "user logged in");

    let body = ApiResponse::success(UserResponse::from(SessionUser::from(&user)));
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(body)))
}

/// Current session identity
#[utoipa::path(
    post,
    path = "/api/auth/me",
    summary = "Who am I",
    responses(
        (status = 200, description = "Valid session", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid session", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn me(user: SessionUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::success(user.into()))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    summary = "Log out",
    responses(
        (status = 200, description = "Session cleared", body = ApiResponse<serde_json::Value>),
    ),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    let body = ApiResponse::success(serde_json::json!({ "loggedOut": true }));
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Json(body),
    )
}
