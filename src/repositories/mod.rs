pub mod listing_repository;
pub mod user_repository;

pub use listing_repository::{ListingRepository, SqliteListingRepository};
pub use user_repository::{
    NewUser, RepositoryError, RepositoryResult, SqliteUserRepository, UserChanges, UserRepository,
};
