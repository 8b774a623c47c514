use auth::{
    CurrentUser,
    models::{NewUser, UpdateUser, User},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Email of the user to look up
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUser {
    pub id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(EmailQuery),
    responses(
        (status = 200, description = "User with this email", body = User),
        (status = 400, description = "Email parameter missing"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn find_by_email(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<EmailQuery>, AppError>,
) -> AppResult<Json<User>> {
    let email = query
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("email query parameter is required"))?;

    Ok(Json(state.users.get_by_email(&email).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User created", body = CreatedUser),
        (status = 400, description = "Malformed profile"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, AppError>,
) -> AppResult<Json<CreatedUser>> {
    let id = state.users.create(payload).await?;
    Ok(Json(CreatedUser { id }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Malformed profile"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUser>, AppError>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::OK)
}
