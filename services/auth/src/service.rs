//! Login, registration and token refresh

use std::{sync::Arc, time::Duration};

use common::{
    AppError,
    deadline::{DeadlineExceeded, within},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    jwt::{JwtService, TokenError, TokenPair},
    models::{LoginCredentials, NewUser},
    password::{PasswordError, verify_password_blocking},
    repositories::{RepositoryError, UserRepository},
    users::new_record,
    validation,
};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),

    #[error("no user registered with email {0}")]
    UserNotFound(String),

    #[error("password mismatch")]
    InvalidCredentials,

    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error("refresh token rejected: {0}")]
    InvalidRefreshToken(#[source] TokenError),

    #[error("token issuance failed: {0}")]
    TokenIssuance(#[source] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("credential store: {0}")]
    Timeout(#[from] DeadlineExceeded),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(message) => AppError::BadRequest(message),
            // Unknown email and wrong password look the same to the caller.
            AuthError::UserNotFound(_) | AuthError::InvalidCredentials => {
                AppError::unauthorized("Invalid email or password")
            }
            AuthError::InvalidRefreshToken(_) => AppError::unauthorized("Invalid refresh token"),
            AuthError::TokenIssuance(_) => AppError::unauthorized("Failed to issue token"),
            AuthError::EmailTaken(_)
            | AuthError::Repository(RepositoryError::DuplicateEmail(_)) => {
                AppError::Conflict(err.to_string())
            }
            other => AppError::system(other),
        }
    }
}

/// Orchestrates credential checks and token issuance. Holds no state of its
/// own between calls.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    timeout: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtService, timeout: Duration) -> Self {
        Self {
            users,
            jwt,
            timeout,
        }
    }

    fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        self.jwt.generate_pair(user_id).map_err(|e| {
            error!("Failed to issue tokens for {}: {}", user_id, e);
            AuthError::TokenIssuance(e)
        })
    }

    /// Verify email and password and issue a fresh token pair
    pub async fn login(&self, credentials: LoginCredentials) -> Result<TokenPair, AuthError> {
        validation::validate_credentials(&credentials).map_err(AuthError::Invalid)?;
        info!("Login attempt for user: {}", credentials.email);

        let user = within(self.timeout, self.users.find_by_email(&credentials.email))
            .await??
            .ok_or_else(|| AuthError::UserNotFound(credentials.email.clone()))?;

        if !verify_password_blocking(credentials.password, user.password_hash).await? {
            warn!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_pair(user.id)
    }

    /// Create an account and issue its first token pair
    pub async fn register(&self, new_user: NewUser) -> Result<TokenPair, AuthError> {
        validation::validate_new_user(&new_user).map_err(AuthError::Invalid)?;

        if within(self.timeout, self.users.find_by_email(&new_user.email))
            .await??
            .is_some()
        {
            return Err(AuthError::EmailTaken(new_user.email));
        }

        let user = new_record(new_user).await?;
        within(self.timeout, self.users.upsert(&user)).await??;
        info!("Registered user {}", user.id);

        self.issue_pair(user.id)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is returned unchanged; it is not rotated.
    pub async fn refresh(&self, refresh_token: String) -> Result<TokenPair, AuthError> {
        let user_id = self
            .jwt
            .validate_refresh_token(&refresh_token)
            .map_err(AuthError::InvalidRefreshToken)?;

        let access_token = self.jwt.generate_access_token(user_id).map_err(|e| {
            error!("Failed to issue access token for {}: {}", user_id, e);
            AuthError::TokenIssuance(e)
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
