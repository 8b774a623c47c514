//! Bearer token authentication for protected routes

use std::{sync::Arc, time::Duration};

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use common::{AppError, deadline::within};
use tracing::{debug, error};

use crate::{jwt::JwtService, models::User, repositories::UserRepository};

/// The authenticated user, placed in request extensions by [`require_bearer`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))
    }
}

/// State for [`require_bearer`]
#[derive(Clone)]
pub struct Authenticator {
    jwt: JwtService,
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl Authenticator {
    pub fn new(jwt: JwtService, users: Arc<dyn UserRepository>, timeout: Duration) -> Self {
        Self {
            jwt,
            users,
            timeout,
        }
    }

    /// Resolve an access token to a live user
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.jwt.validate_access_token(token).map_err(|e| {
            debug!("Rejected access token: {}", e);
            AppError::unauthorized("Invalid token")
        })?;

        within(self.timeout, self.users.find_by_id(user_id))
            .await
            .map_err(AppError::system)?
            .map_err(|e| {
                error!("Failed to load user {}: {}", user_id, e);
                AppError::system(e)
            })?
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }
}

/// Extract the token from an `Authorization` value.
///
/// The value must be exactly `Bearer <token>`: two parts separated by a single
/// space, a case-sensitive scheme and a non-empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Reject the request unless it carries a valid access token for an existing
/// user, then expose that user as [`CurrentUser`]
pub async fn require_bearer(
    State(auth): State<Authenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

    let token = bearer_token(header)
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization header"))?;

    let user = auth.authenticate(token).await?;
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
