//! Stores that never answer or always fail, for outage tests

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{RepositoryError, UserRepository};
use crate::models::User;

/// Every call blocks for a minute before answering
pub(crate) struct StalledUserRepository;

/// Every call fails as if the connection pool were exhausted
pub(crate) struct FailingUserRepository;

async fn stall() {
    tokio::time::sleep(Duration::from_secs(60)).await;
}

#[async_trait]
impl UserRepository for StalledUserRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, RepositoryError> {
        stall().await;
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        stall().await;
        Ok(None)
    }

    async fn upsert(&self, _user: &User) -> Result<bool, RepositoryError> {
        stall().await;
        Ok(true)
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        stall().await;
        Ok(false)
    }
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn upsert(&self, _user: &User) -> Result<bool, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}
