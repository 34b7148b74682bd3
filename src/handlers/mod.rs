pub mod listing_handlers;
pub mod user_handlers;

pub use listing_handlers::{
    create_listing_handler, delete_listing_handler, get_listing_handler, search_listings_handler,
    update_listing_handler,
};
pub use user_handlers::{
    delete_user_handler, get_user_handler, update_user_handler, user_listings_handler,
};
