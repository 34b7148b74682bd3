use crate::models::listing::{
    check_listing_rules, Listing, ListingQuery, ListingRuleError, UpsertListingRequest,
};
use crate::repositories::listing_repository::ListingRepository;
use crate::repositories::user_repository::RepositoryError;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error("{0}")]
    Rule(#[from] ListingRuleError),
    #[error("The {0} field is required.")]
    MissingField(&'static str),
    #[error("The {0} field cannot be negative.")]
    NegativeValue(&'static str),
    #[error("Image URLs must be http(s) links.")]
    InvalidImageUrl,
    #[error("Listing not found!")]
    NotFound,
    #[error("You can only modify your own listings!")]
    NotOwner,
    #[error("You can only view your own listings!")]
    ForeignListings,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct ListingService {
    repository: Arc<dyn ListingRepository>,
}

impl ListingService {
    pub fn new(repository: Arc<dyn ListingRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_listing(
        &self,
        user_id: i64,
        request: UpsertListingRequest,
    ) -> Result<Listing, ListingServiceError> {
        let request = validate(request)?;
        let listing = self.repository.create_listing(user_id, &request).await?;
        tracing::info!(listing_id = listing.id, user_id, "Listing created");
        Ok(listing)
    }

    pub async fn update_listing(
        &self,
        user_id: i64,
        listing_id: i64,
        request: UpsertListingRequest,
    ) -> Result<Listing, ListingServiceError> {
        self.owned_listing(user_id, listing_id).await?;
        let request = validate(request)?;

        match self.repository.update_listing(listing_id, &request).await {
            Ok(listing) => Ok(listing),
            Err(RepositoryError::NotFound) => Err(ListingServiceError::NotFound),
            Err(e) => Err(ListingServiceError::RepositoryError(e)),
        }
    }

    pub async fn delete_listing(
        &self,
        user_id: i64,
        listing_id: i64,
    ) -> Result<(), ListingServiceError> {
        self.owned_listing(user_id, listing_id).await?;

        match self.repository.delete_listing(listing_id).await {
            Ok(()) => {
                tracing::info!(listing_id, user_id, "Listing deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(ListingServiceError::NotFound),
            Err(e) => Err(ListingServiceError::RepositoryError(e)),
        }
    }

    pub async fn get_listing(&self, listing_id: i64) -> Result<Listing, ListingServiceError> {
        self.repository
            .find_by_id(listing_id)
            .await?
            .ok_or(ListingServiceError::NotFound)
    }

    /// Listings owned by `owner_id`; only the owner may list them.
    pub async fn listings_for_user(
        &self,
        requesting_user_id: i64,
        owner_id: i64,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        if requesting_user_id != owner_id {
            return Err(ListingServiceError::ForeignListings);
        }
        Ok(self.repository.list_by_user(owner_id).await?)
    }

    pub async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, ListingServiceError> {
        Ok(self.repository.search(query).await?)
    }

    async fn owned_listing(
        &self,
        user_id: i64,
        listing_id: i64,
    ) -> Result<Listing, ListingServiceError> {
        let listing = self.get_listing(listing_id).await?;
        if listing.user_ref != user_id {
            tracing::warn!(listing_id, user_id, "Rejected change to foreign listing");
            return Err(ListingServiceError::NotOwner);
        }
        Ok(listing)
    }
}

fn validate(
    mut request: UpsertListingRequest,
) -> Result<UpsertListingRequest, ListingServiceError> {
    request.name = request.name.trim().to_string();
    request.description = request.description.trim().to_string();
    request.address = request.address.trim().to_string();

    if request.name.is_empty() {
        return Err(ListingServiceError::MissingField("name"));
    }
    if request.description.is_empty() {
        return Err(ListingServiceError::MissingField("description"));
    }
    if request.address.is_empty() {
        return Err(ListingServiceError::MissingField("address"));
    }

    for (field, value) in [
        ("regularPrice", request.regular_price),
        ("discountPrice", request.discount_price),
        ("bedrooms", request.bedrooms),
        ("bathrooms", request.bathrooms),
    ] {
        if value < 0 {
            return Err(ListingServiceError::NegativeValue(field));
        }
    }

    if request
        .image_urls
        .iter()
        .any(|url| !(url.starts_with("https://") || url.starts_with("http://")))
    {
        return Err(ListingServiceError::InvalidImageUrl);
    }

    check_listing_rules(
        request.regular_price,
        request.discount_price,
        request.image_urls.len(),
    )?;

    Ok(request)
}
