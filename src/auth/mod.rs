pub mod handlers;
pub mod middleware;

use crate::error::AppError;
use crate::models::user::User;
use tower_sessions::Session;

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_USERNAME: &str = "username";
pub const SESSION_AUTH_TIMESTAMP: &str = "auth_timestamp";

/// Binds `user` to the session, rotating the session id first.
pub async fn establish_session(session: &Session, user: &User) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_failure)?;
    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(session_failure)?;
    session
        .insert(SESSION_USERNAME, user.username.as_str())
        .await
        .map_err(session_failure)?;
    session
        .insert(SESSION_AUTH_TIMESTAMP, chrono::Utc::now().timestamp())
        .await
        .map_err(session_failure)?;
    Ok(())
}

/// Id of the signed-in user, or `AuthenticationFailed`.
pub async fn current_user_id(session: &Session) -> Result<i64, AppError> {
    session
        .get::<i64>(SESSION_USER_ID)
        .await
        .map_err(session_failure)?
        .ok_or(AppError::AuthenticationFailed)
}

fn session_failure(err: tower_sessions::session::Error) -> AppError {
    tracing::error!("Session store error: {}", err);
    AppError::InternalError
}
