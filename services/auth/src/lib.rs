//! Credential management: users, password hashing, tokens and the bearer
//! middleware that guards protected routes.

pub mod database;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod service;
pub mod users;
pub mod validation;

pub use jwt::{JwtConfig, JwtService, TokenPair};
pub use middleware::{Authenticator, CurrentUser, require_bearer};
pub use service::{AuthError, AuthService};
pub use users::{UserError, UserService};
