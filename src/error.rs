use crate::services::{AuthServiceError, ListingServiceError, UserServiceError};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized")]
    AuthenticationFailed,

    #[error("Wrong credentials!")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    InternalError,
}

/// Error body understood by the single-page client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationFailed | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidEmail
            | UserServiceError::InvalidUsername
            | UserServiceError::WeakPassword => AppError::Validation(err.to_string()),
            UserServiceError::UsernameTaken | UserServiceError::EmailTaken => {
                AppError::Conflict(err.to_string())
            }
            UserServiceError::UserNotFound => AppError::NotFound("User not found!".to_string()),
            UserServiceError::HashingError(_) | UserServiceError::RepositoryError(_) => {
                tracing::error!("User service failure: {}", err);
                AppError::InternalError
            }
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => AppError::InvalidCredentials,
            AuthServiceError::MissingProviderEmail => AppError::Validation(err.to_string()),
            AuthServiceError::UserNotFound => AppError::NotFound("User not found!".to_string()),
            AuthServiceError::Account(inner) => inner.into(),
            AuthServiceError::RepositoryError(_) => {
                tracing::error!("Auth service failure: {}", err);
                AppError::InternalError
            }
        }
    }
}

impl From<ListingServiceError> for AppError {
    fn from(err: ListingServiceError) -> Self {
        match err {
            ListingServiceError::Rule(_)
            | ListingServiceError::MissingField(_)
            | ListingServiceError::NegativeValue(_)
            | ListingServiceError::InvalidImageUrl => AppError::Validation(err.to_string()),
            ListingServiceError::NotFound => AppError::NotFound(err.to_string()),
            ListingServiceError::NotOwner | ListingServiceError::ForeignListings => {
                AppError::Forbidden(err.to_string())
            }
            ListingServiceError::RepositoryError(_) => {
                tracing::error!("Listing service failure: {}", err);
                AppError::InternalError
            }
        }
    }
}
