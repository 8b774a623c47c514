//! Credential store abstraction
//!
//! The services only see [`UserRepository`]; PostgreSQL backs it in
//! production and [`InMemoryUserRepository`] in tests and local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

pub mod memory;
pub mod user;

#[cfg(test)]
pub(crate) mod unavailable;

pub use memory::InMemoryUserRepository;
pub use user::PgUserRepository;

/// Errors reported by a credential store
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Another live user already owns this email
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    /// The backing database failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user records.
///
/// Deleted users are invisible to every lookup.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a live user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Find a live user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert the record, or overwrite the profile fields of the live record
    /// with the same ID. Returns `false` when the ID belongs to a deleted user
    /// and nothing was written.
    async fn upsert(&self, user: &User) -> Result<bool, RepositoryError>;

    /// Logically delete a user. Returns `false` when no live user matched.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
