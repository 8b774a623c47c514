//! Error types shared by every service
//!
//! `AppError` is the single envelope every handler error is converted into.
//! Its `IntoResponse` implementation is the only place that turns a failure
//! into an HTTP status and a JSON body, and the only place that logs it.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error;
use tracing::{error, warn};

/// Error raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("{0} environment variable not set")]
    Missing(String),

    /// A variable is set but its value is unusable
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Uniform error envelope returned by every handler
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// The requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state
    #[error("{0}")]
    Conflict(String),

    /// A downstream dependency failed
    #[error("{0}")]
    System(#[source] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn system(cause: impl Into<anyhow::Error>) -> Self {
        AppError::System(cause.into())
    }

    /// HTTP status the error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::System(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::System(cause) => {
                error!("Request failed: {:#}", cause);
                "Internal server error".to_string()
            }
            other => {
                warn!("Request rejected with {}: {}", status, other);
                other.to_string()
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;
