use crate::auth::establish_session;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::user::PublicUser;
use crate::services::{
    auth_service::{LoginRequest, ProviderProfile},
    user_service::CreateUserRequest,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    /// Email address; a username is accepted for accounts without one.
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// POST /api/auth/signup
pub async fn signup_handler(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<SignUpBody>,
) -> Result<impl IntoResponse, AppError> {
    let request = CreateUserRequest {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    let user = app_state.user_service.create_user(request).await?;
    tracing::info!(user_id = user.id, "User signed up");

    Ok((StatusCode::CREATED, Json("User created successfully!")))
}

/// POST /api/auth/signin
pub async fn signin_handler(
    State(app_state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<SignInBody>,
) -> Result<Json<PublicUser>, AppError> {
    let request = LoginRequest {
        identifier: body.email,
        password: body.password,
    };

    let user = app_state.auth_service.authenticate(request).await?;
    establish_session(&session, &user).await?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(Json(user.into()))
}

/// POST /api/auth/google
///
/// Receives the identity returned by the provider's popup sign-in and
/// signs the matching local account in, creating it on first use.
pub async fn provider_signin_handler(
    State(app_state): State<AppState>,
    session: Session,
    ApiJson(profile): ApiJson<ProviderProfile>,
) -> Result<Json<PublicUser>, AppError> {
    let user = app_state
        .auth_service
        .sign_in_with_provider(profile)
        .await
        .inspect_err(|e| tracing::warn!("Provider sign-in failed: {}", e))?;

    establish_session(&session, &user).await?;

    tracing::info!(user_id = user.id, "User signed in through identity provider");
    Ok(Json(user.into()))
}

/// GET /api/auth/signout
pub async fn signout_handler(session: Session) -> Result<Json<&'static str>, AppError> {
    session.flush().await.map_err(|e| {
        tracing::error!("Failed to clear session: {}", e);
        AppError::InternalError
    })?;
    Ok(Json("User has been logged out!"))
}
