pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use repositories::{SqliteListingRepository, SqliteUserRepository};
use services::{AuthService, ListingService, UserService};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub listing_service: Arc<ListingService>,
    pub pool: SqlitePool,
}

impl AppState {
    /// Wires the SQLite repositories and services over `pool`.
    pub fn from_pool(pool: SqlitePool) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let listing_repository = Arc::new(SqliteListingRepository::new(pool.clone()));

        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let auth_service = Arc::new(AuthService::new(user_repository, user_service.clone()));
        let listing_service = Arc::new(ListingService::new(listing_repository));

        Self {
            user_service,
            auth_service,
            listing_service,
            pool,
        }
    }
}
