use crate::auth::current_user_id;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{listing::Listing, user::PublicUser};
use crate::services::user_service::UpdateProfileRequest;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

async fn ensure_self(session: &Session, user_id: i64, action: &str) -> Result<(), AppError> {
    if current_user_id(session).await? != user_id {
        return Err(AppError::Forbidden(format!(
            "You can only {} your own account!",
            action
        )));
    }
    Ok(())
}

/// POST /api/user/update/{id}
pub async fn update_user_handler(
    State(state): State<AppState>,
    session: Session,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateUserBody>,
) -> Result<Json<PublicUser>, AppError> {
    ensure_self(&session, user_id, "update").await?;

    let user = state
        .user_service
        .update_profile(UpdateProfileRequest {
            user_id,
            username: body.username,
            email: body.email,
            password: body.password,
            avatar: body.avatar,
        })
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /api/user/delete/{id}
pub async fn delete_user_handler(
    State(state): State<AppState>,
    session: Session,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<&'static str>, AppError> {
    ensure_self(&session, user_id, "delete").await?;

    state.user_service.delete_user(user_id).await?;
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to clear session of deleted user: {}", e);
    }

    tracing::info!(user_id, "User deleted");
    Ok(Json("User has been deleted!"))
}

/// GET /api/user/listings/{id}
pub async fn user_listings_handler(
    State(state): State<AppState>,
    session: Session,
    ApiPath(owner_id): ApiPath<i64>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let user_id = current_user_id(&session).await?;
    let listings = state
        .listing_service
        .listings_for_user(user_id, owner_id)
        .await?;
    Ok(Json(listings))
}

/// GET /api/user/{id}
pub async fn get_user_handler(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .user_service
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;
    Ok(Json(user.into()))
}
