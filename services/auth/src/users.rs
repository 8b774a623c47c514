//! User profile operations behind the `/users` routes

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use common::{
    AppError,
    deadline::{DeadlineExceeded, within},
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{NewUser, UpdateUser, User},
    password::{PasswordError, hash_password_blocking},
    repositories::{RepositoryError, UserRepository},
    validation,
};

#[derive(Error, Debug)]
pub enum UserError {
    #[error("{0}")]
    Invalid(String),

    #[error("user {0} not found")]
    NotFound(String),

    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("credential store: {0}")]
    Timeout(#[from] DeadlineExceeded),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Invalid(message) => AppError::BadRequest(message),
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::EmailTaken(_) | UserError::Repository(RepositoryError::DuplicateEmail(_)) => {
                AppError::Conflict(err.to_string())
            }
            other => AppError::system(other),
        }
    }
}

/// Hash the password and build the record for a new user
pub(crate) async fn new_record(new_user: NewUser) -> Result<User, PasswordError> {
    let password_hash = hash_password_blocking(new_user.password).await?;
    let now = Utc::now();

    Ok(User {
        id: Uuid::new_v4(),
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        password_hash,
        created_at: now,
        updated_at: now,
    })
}

/// User CRUD on top of the credential store
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, timeout: Duration) -> Self {
        Self { users, timeout }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, UserError> {
        within(self.timeout, self.users.find_by_id(id))
            .await??
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        within(self.timeout, self.users.find_by_email(email))
            .await??
            .ok_or_else(|| UserError::NotFound(email.to_string()))
    }

    /// Create a user and return its ID
    pub async fn create(&self, new_user: NewUser) -> Result<Uuid, UserError> {
        validation::validate_new_user(&new_user).map_err(UserError::Invalid)?;

        if within(self.timeout, self.users.find_by_email(&new_user.email))
            .await??
            .is_some()
        {
            return Err(UserError::EmailTaken(new_user.email));
        }

        let user = new_record(new_user).await?;
        within(self.timeout, self.users.upsert(&user)).await??;

        info!("Created user {}", user.id);
        Ok(user.id)
    }

    /// Replace the profile fields of an existing user
    pub async fn update(&self, id: Uuid, update: UpdateUser) -> Result<User, UserError> {
        validation::validate_update(&update).map_err(UserError::Invalid)?;

        let mut user = self.get(id).await?;

        if update.email != user.email {
            let owner = within(self.timeout, self.users.find_by_email(&update.email)).await??;
            if owner.is_some_and(|owner| owner.id != id) {
                return Err(UserError::EmailTaken(update.email));
            }
        }

        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        user.updated_at = Utc::now();

        if !within(self.timeout, self.users.upsert(&user)).await?? {
            return Err(UserError::NotFound(id.to_string()));
        }

        info!("Updated user {}", id);
        Ok(user)
    }

    /// Logically delete a user
    pub async fn delete(&self, id: Uuid) -> Result<(), UserError> {
        if !within(self.timeout, self.users.delete(id)).await?? {
            return Err(UserError::NotFound(id.to_string()));
        }

        info!("Deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{password::verify_password, repositories::InMemoryUserRepository};
    use async_trait::async_trait;

    /// Deletes each user right after handing it out, as a concurrent
    /// `DELETE` landing between the read and the write of an update would
    struct DeletedAfterRead(InMemoryUserRepository);

    #[async_trait]
    impl UserRepository for DeletedAfterRead {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
            let user = self.0.find_by_id(id).await?;
            self.0.delete(id).await?;
            Ok(user)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            self.0.find_by_email(email).await
        }

        async fn upsert(&self, user: &User) -> Result<bool, RepositoryError> {
            self.0.upsert(user).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
            self.0.delete(id).await
        }
    }

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()), Duration::from_secs(5))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_is_retrievable() {
        let svc = service();
        let id = svc.create(new_user("a@b.com")).await.unwrap();

        let user = svc.get(id).await.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_ne!(user.password_hash, "secret");
        assert!(verify_password("secret", &user.password_hash).unwrap());

        assert_eq!(svc.get_by_email("a@b.com").await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let svc = service();
        svc.create(new_user("a@b.com")).await.unwrap();

        let err = svc.create(new_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, UserError::EmailTaken(_)));
        assert_eq!(AppError::from(err).status().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let err = service().create(new_user("not-an-email")).await.unwrap_err();
        assert!(matches!(err, UserError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_update_changes_profile_and_guards_email() {
        let svc = service();
        let id = svc.create(new_user("a@b.com")).await.unwrap();
        svc.create(new_user("taken@b.com")).await.unwrap();

        let updated = svc
            .update(
                id,
                UpdateUser {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "grace@b.com".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(svc.get(id).await.unwrap().email, "grace@b.com");

        let err = svc
            .update(
                id,
                UpdateUser {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "taken@b.com".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_not_found() {
        let svc = service();
        let id = svc.create(new_user("a@b.com")).await.unwrap();

        svc.delete(id).await.unwrap();
        assert!(matches!(svc.get(id).await, Err(UserError::NotFound(_))));
        assert!(matches!(svc.delete(id).await, Err(UserError::NotFound(_))));
        assert!(matches!(
            svc.update(
                Uuid::new_v4(),
                UpdateUser {
                    first_name: "A".to_string(),
                    last_name: "B".to_string(),
                    email: "c@d.com".to_string(),
                }
            )
            .await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_of_user_deleted_mid_flight_is_not_found() {
        let repo = Arc::new(DeletedAfterRead(InMemoryUserRepository::new()));
        let svc = UserService::new(repo.clone(), Duration::from_secs(5));
        let id = svc.create(new_user("a@b.com")).await.unwrap();

        let err = svc
            .update(
                id,
                UpdateUser {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "grace@b.com".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
        assert_eq!(AppError::from(err).status().as_u16(), 404);
        assert!(repo.0.find_by_email("grace@b.com").await.unwrap().is_none());
    }
}
