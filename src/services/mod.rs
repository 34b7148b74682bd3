pub mod auth_service;
pub mod image_host;
pub mod listing_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, LoginRequest, ProviderProfile};
pub use image_host::{ImageFile, ImageHost, ImageHostError};
pub use listing_service::{ListingService, ListingServiceError};
pub use user_service::{UserService, UserServiceError};
