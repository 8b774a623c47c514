//! Application state shared across handlers

use std::{sync::Arc, time::Duration};

use auth::{
    Authenticator, AuthService, JwtService, UserService, repositories::UserRepository,
};
use media::{ApodClient, MediaService, ObjectStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub media: MediaService,
    pub authenticator: Authenticator,
}

impl AppState {
    /// Wire every service on top of the given backends, all sharing one
    /// per-call timeout
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        jwt: JwtService,
        store: Arc<dyn ObjectStore>,
        apod: Arc<dyn ApodClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            auth: AuthService::new(user_repository.clone(), jwt.clone(), timeout),
            users: UserService::new(user_repository.clone(), timeout),
            media: MediaService::new(store, apod, timeout),
            authenticator: Authenticator::new(jwt, user_repository, timeout),
        }
    }
}
