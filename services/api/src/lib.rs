//! HTTP surface of the album backend

pub mod config;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
