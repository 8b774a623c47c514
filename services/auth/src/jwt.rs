//! JWT service for token generation and validation
//!
//! Tokens are stateless: validity is decided purely by the HMAC signature and
//! the `exp` claim. Access and refresh tokens are signed with two independent
//! secrets so that leaking one key cannot be used to forge the other kind.

use chrono::{DateTime, Duration, Utc};
use common::{env, error::ConfigError};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Longest accepted token lifetime in seconds (one year)
pub const MAX_TOKEN_LIFETIME: u64 = 365 * 24 * 60 * 60;

fn lifetime_from_env(name: &str, default: u64) -> Result<u64, ConfigError> {
    let seconds: u64 = env::parse_or(name, default)?;
    if !(1..=MAX_TOKEN_LIFETIME).contains(&seconds) {
        return Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("must be between 1 and {} seconds", MAX_TOKEN_LIFETIME),
        });
    }
    Ok(seconds)
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,
    /// Secret used to sign refresh tokens
    pub refresh_secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 24 hours)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET_KEY`: HMAC secret for access tokens
    /// - `TOKEN_SECRET_KEY`: HMAC secret for refresh tokens, must differ from
    ///   the access secret
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 86400)
    ///
    /// Both expiries must lie in `1..=MAX_TOKEN_LIFETIME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_secret = env::required("JWT_SECRET_KEY")?;
        let refresh_secret = env::required("TOKEN_SECRET_KEY")?;

        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid {
                name: "TOKEN_SECRET_KEY".to_string(),
                reason: "must differ from JWT_SECRET_KEY".to_string(),
            });
        }

        Ok(JwtConfig {
            access_secret,
            refresh_secret,
            access_token_expiry: lifetime_from_env("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
            refresh_token_expiry: lifetime_from_env("JWT_REFRESH_TOKEN_EXPIRY", 86_400)?,
        })
    }
}

/// Token type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token authorizing API calls
    Access,
    /// Long-lived token exchangeable for a new access token
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Set on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
}

/// Reasons a token is refused
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0} seconds is out of range")]
    Lifetime(u64),
}

fn ttl_seconds(seconds: u64) -> Result<Duration, TokenError> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or(TokenError::Lifetime(seconds))
}

/// Sign a token for `subject` that expires `ttl` after now
pub fn issue(
    subject: Uuid,
    kind: TokenKind,
    secret: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    issue_at(subject, kind, secret, ttl, Utc::now())
}

/// Same as [`issue`] with an explicit issue instant
pub fn issue_at(
    subject: Uuid,
    kind: TokenKind,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let expires = now
        .checked_add_signed(ttl)
        .ok_or(TokenError::Lifetime(ttl.num_seconds().unsigned_abs()))?;

    let claims = Claims {
        sub: subject,
        iat: now.timestamp(),
        exp: expires.timestamp(),
        auth: (kind == TokenKind::Access).then_some(true),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// Check signature and expiry, returning the subject
pub fn validate(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    validate_at(token, secret, Utc::now())
}

/// Same as [`validate`] against an explicit clock reading
pub fn validate_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
    // Expiry is checked below against `now`, without the library's leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    })?;

    if now.timestamp() > data.claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(data.claims.sub)
}

/// Issued token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT service bound to the configured secrets and lifetimes
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        issue(
            user_id,
            TokenKind::Access,
            &self.config.access_secret,
            ttl_seconds(self.config.access_token_expiry)?,
        )
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        issue(
            user_id,
            TokenKind::Refresh,
            &self.config.refresh_secret,
            ttl_seconds(self.config.refresh_token_expiry)?,
        )
    }

    /// Generate a fresh access and refresh token pair
    pub fn generate_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id)?,
            refresh_token: self.generate_refresh_token(user_id)?,
        })
    }

    /// Validate an access token and return its subject
    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, TokenError> {
        validate(token, &self.config.access_secret)
    }

    /// Validate a refresh token and return its subject
    pub fn validate_refresh_token(&self, token: &str) -> Result<Uuid, TokenError> {
        validate(token, &self.config.refresh_secret)
    }
}
