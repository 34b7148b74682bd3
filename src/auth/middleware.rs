use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::SESSION_USER_ID;

/// Rejects requests without a signed-in user with a 401 error body.
pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(SESSION_USER_ID).await {
        next.run(request).await
    } else {
        AppError::AuthenticationFailed.into_response()
    }
}
