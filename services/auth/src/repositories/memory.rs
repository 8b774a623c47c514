//! In-memory user repository for tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, UserRepository};
use crate::models::User;

#[derive(Debug)]
struct Entry {
    user: User,
    deleted: bool,
}

/// Credential store kept in a map, with the same uniqueness and
/// logical-delete rules as the PostgreSQL schema
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, Entry>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .get(&id)
            .filter(|entry| !entry.deleted)
            .map(|entry| entry.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|entry| !entry.deleted && entry.user.email == email)
            .map(|entry| entry.user.clone()))
    }

    async fn upsert(&self, user: &User) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;

        let taken = users.values().any(|entry| {
            !entry.deleted && entry.user.email == user.email && entry.user.id != user.id
        });
        if taken {
            return Err(RepositoryError::DuplicateEmail(user.email.clone()));
        }

        match users.get_mut(&user.id) {
            Some(entry) if entry.deleted => return Ok(false),
            Some(entry) => {
                entry.user.first_name = user.first_name.clone();
                entry.user.last_name = user.last_name.clone();
                entry.user.email = user.email.clone();
                entry.user.password_hash = user.password_hash.clone();
                entry.user.updated_at = user.updated_at;
            }
            None => {
                users.insert(
                    user.id,
                    Entry {
                        user: user.clone(),
                        deleted: false,
                    },
                );
            }
        }

        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(entry) if !entry.deleted => {
                entry.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
