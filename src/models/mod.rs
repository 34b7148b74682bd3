pub mod listing;
pub mod user;

pub use listing::{
    check_listing_rules, Listing, ListingQuery, ListingRow, ListingRuleError, ListingType,
    SortField, SortOrder, TypeFilter, UpsertListingRequest, MAX_IMAGES,
};
pub use user::{PublicUser, User, DEFAULT_AVATAR};
