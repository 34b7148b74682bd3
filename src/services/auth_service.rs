use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::{
    verify_password, ProviderUserRequest, UserService, UserServiceError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Identity provider did not supply an email address")]
    MissingProviderEmail,
    #[error("User not found")]
    UserNotFound,
    #[error("Account error: {0}")]
    Account(#[from] UserServiceError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] crate::repositories::user_repository::RepositoryError),
}

pub struct LoginRequest {
    /// Email address, or username for accounts without one.
    pub identifier: String,
    pub password: String,
}

/// Identity forwarded by the client after the provider's popup sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub name: String,
    pub email: Option<String>,
    pub photo: Option<String>,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    user_service: Arc<UserService>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, user_service: Arc<UserService>) -> Self {
        Self {
            user_repository,
            user_service,
        }
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let identifier = request.identifier.trim();

        let user = if identifier.contains('@') {
            self.user_repository
                .find_by_email(&identifier.to_lowercase())
                .await?
        } else {
            self.user_repository.find_by_username(identifier).await?
        }
        .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Exchanges a provider-authenticated identity for a local account,
    /// creating the account on first sign-in.
    pub async fn sign_in_with_provider(
        &self,
        profile: ProviderProfile,
    ) -> Result<User, AuthServiceError> {
        let email = profile
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or(AuthServiceError::MissingProviderEmail)?;

        if let Some(user) = self.user_repository.find_by_email(&email).await? {
            tracing::debug!(user_id = user.id, "Provider sign-in for existing user");
            return Ok(user);
        }

        let user = self
            .user_service
            .create_provider_user(ProviderUserRequest {
                display_name: profile.name,
                email,
                photo: profile.photo.filter(|p| !p.trim().is_empty()),
            })
            .await?;

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            "Created account from identity provider"
        );
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<User, AuthServiceError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::DEFAULT_AVATAR;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn service_with(repo: MockUserRepository) -> AuthService {
        let repo: Arc<dyn UserRepository> = Arc::new(repo);
        let user_service = Arc::new(UserService::new(repo.clone()));
        AuthService::new(repo, user_service)
    }

    #[tokio::test]
    async fn test_authenticate_invalid_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_email()
            .with(eq("test@example.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = service_with(mock_repo);

        let request = LoginRequest {
            identifier: "Test@Example.com".to_string(),
            password: "password123".to_string(),
        };

        let result = service.authenticate(request).await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_by_username_looks_up_username() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_username()
            .with(eq("jane"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = service_with(mock_repo);
        let result = service
            .authenticate(LoginRequest {
                identifier: "jane".to_string(),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_provider_sign_in_requires_email() {
        let service = service_with(MockUserRepository::new());

        let result = service
            .sign_in_with_provider(ProviderProfile {
                name: "Jane".to_string(),
                email: None,
                photo: None,
            })
            .await;

        assert!(matches!(result, Err(AuthServiceError::MissingProviderEmail)));
    }

    #[tokio::test]
    async fn test_provider_sign_in_returns_existing_user() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_email()
            .with(eq("jane@example.com"))
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(Some(User {
                        id: 3,
                        username: "jane".to_string(),
                        email: Some("jane@example.com".to_string()),
                        password_hash: "hash".to_string(),
                        avatar: DEFAULT_AVATAR.to_string(),
                        photo: None,
                        created_at: String::new(),
                        updated_at: String::new(),
                    }))
                })
            });
        mock_repo.expect_create_user().times(0);

        let service = service_with(mock_repo);
        let user = service
            .sign_in_with_provider(ProviderProfile {
                name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                photo: Some("https://photos.example/jane.png".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.id, 3);
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = service_with(mock_repo);

        let result = service.get_user_by_id(1).await;
        assert!(matches!(result, Err(AuthServiceError::UserNotFound)));
    }
}
