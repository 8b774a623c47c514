use auth::{
    CurrentUser, TokenPair,
    models::{LoginCredentials, NewUser},
};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use common::{AppError, AppResult};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = NewUser,
    responses(
        (status = 200, description = "Account created, first token pair issued", body = TokenPair),
        (status = 400, description = "Malformed profile"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, AppError>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(state.auth.register(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenPair),
        (status = 400, description = "Malformed credentials"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginCredentials>, AppError>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(state.auth.login(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token, refresh token echoed back", body = TokenPair),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RefreshRequest>, AppError>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(state.auth.refresh(payload.refresh_token).await?))
}

/// Tokens are stateless, so there is nothing to revoke
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(CurrentUser(user): CurrentUser) -> StatusCode {
    info!("User {} logged out", user.id);
    StatusCode::OK
}
