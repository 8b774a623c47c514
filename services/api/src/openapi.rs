//! OpenAPI document for the HTTP surface, served next to a Swagger UI

use auth::{
    TokenPair,
    models::{LoginCredentials, NewUser, UpdateUser, User},
};
use media::Media;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{albums, apod, auth as auth_handlers, users},
    routes,
};

/// Swagger UI mount point
pub const SWAGGER_PATH: &str = "/swagger";
/// Raw OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::refresh,
        auth_handlers::logout,
        users::current,
        users::find_by_email,
        users::create,
        users::get,
        users::update,
        users::delete,
        albums::list,
        albums::download,
        albums::upload,
        apod::picture,
    ),
    components(
        schemas(
            User, NewUser, UpdateUser, LoginCredentials, TokenPair,
            auth_handlers::RefreshRequest,
            users::CreatedUser,
            Media,
            albums::UploadForm,
        )
    ),
    tags(
        (name = "health", description = "Service health check"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "users", description = "User profiles"),
        (name = "albums", description = "The current user's picture album"),
        (name = "apod", description = "NASA Astronomy Picture of the Day")
    ),
    info(
        title = "Astro Album API",
        version = "0.1.0",
        description = "User accounts, picture albums and the NASA picture of the day",
        license(name = "MIT")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
