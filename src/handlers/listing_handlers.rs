use crate::auth::current_user_id;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::listing::{Listing, ListingQuery, UpsertListingRequest};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use tower_sessions::Session;

/// POST /api/listing/create
pub async fn create_listing_handler(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<UpsertListingRequest>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let user_id = current_user_id(&session).await?;
    let listing = state.listing_service.create_listing(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// POST /api/listing/update/{id}
pub async fn update_listing_handler(
    State(state): State<AppState>,
    session: Session,
    ApiPath(listing_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpsertListingRequest>,
) -> Result<Json<Listing>, AppError> {
    let user_id = current_user_id(&session).await?;
    let listing = state
        .listing_service
        .update_listing(user_id, listing_id, request)
        .await?;
    Ok(Json(listing))
}

/// DELETE /api/listing/delete/{id}
pub async fn delete_listing_handler(
    State(state): State<AppState>,
    session: Session,
    ApiPath(listing_id): ApiPath<i64>,
) -> Result<Json<&'static str>, AppError> {
    let user_id = current_user_id(&session).await?;
    state
        .listing_service
        .delete_listing(user_id, listing_id)
        .await?;
    Ok(Json("Listing has been deleted!"))
}

/// GET /api/listing/get/{id}
pub async fn get_listing_handler(
    State(state): State<AppState>,
    ApiPath(listing_id): ApiPath<i64>,
) -> Result<Json<Listing>, AppError> {
    Ok(Json(state.listing_service.get_listing(listing_id).await?))
}

/// GET /api/listing/get
pub async fn search_listings_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    Ok(Json(state.listing_service.search(&query).await?))
}
