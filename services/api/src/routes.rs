//! API routes

use auth::require_bearer;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    AppState,
    handlers::{albums, apod, auth as auth_handlers, users},
    openapi::{ApiDoc, OPENAPI_JSON_PATH, SWAGGER_PATH},
};

/// Largest accepted album upload
pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/refresh", post(auth_handlers::refresh));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/users", get(users::find_by_email).post(users::create))
        .route("/users/current", get(users::current))
        .route("/users/current/albums", get(albums::list))
        .route("/users/current/albums/download", get(albums::download))
        .route(
            "/users/current/albums/upload",
            post(albums::upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/apod", get(apod::picture))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
