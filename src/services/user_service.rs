use crate::models::user::User;
use crate::repositories::user_repository::{NewUser, RepositoryError, UserChanges, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use std::sync::Arc;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap());

const MIN_PASSWORD_LEN: usize = 8;
const USERNAME_SUFFIX_LEN: usize = 4;
const MAX_USERNAME_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Username must be 3-32 characters of letters, digits, '.', '_' or '-'")]
    InvalidUsername,
    #[error("Password too weak (minimum 8 characters)")]
    WeakPassword,
    #[error("User not found")]
    UserNotFound,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

/// Profile as handed over by the identity provider after a popup sign-in.
pub struct ProviderUserRequest {
    pub display_name: String,
    pub email: String,
    pub photo: Option<String>,
}

#[derive(Default)]
pub struct UpdateProfileRequest {
    pub user_id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let username = request.username.trim().to_string();
        validate_username(&username)?;

        let email = normalize_email(request.email.as_deref());
        if let Some(ref email) = email {
            validate_email(email)?;
        }

        validate_password(&request.password)?;

        if self.repository.find_by_username(&username).await?.is_some() {
            return Err(UserServiceError::UsernameTaken);
        }
        if let Some(ref email) = email {
            if self.repository.find_by_email(email).await?.is_some() {
                return Err(UserServiceError::EmailTaken);
            }
        }

        let new_user = NewUser {
            username,
            email,
            password_hash: hash_password(&request.password)?,
            avatar: None,
            photo: None,
        };

        match self.repository.create_user(&new_user).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::UsernameTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    /// Creates the local account backing a first-time identity provider sign-in.
    ///
    /// The account gets a generated username and an unguessable password; the
    /// provider photo doubles as the avatar.
    pub async fn create_provider_user(
        &self,
        request: ProviderUserRequest,
    ) -> Result<User, UserServiceError> {
        let email = normalize_email(Some(&request.email)).ok_or(UserServiceError::InvalidEmail)?;
        validate_email(&email)?;

        let password_hash = hash_password(&generate_password())?;

        for _ in 0..MAX_USERNAME_ATTEMPTS {
            let new_user = NewUser {
                username: generate_username(&request.display_name),
                email: Some(email.clone()),
                password_hash: password_hash.clone(),
                avatar: request.photo.clone(),
                photo: request.photo.clone(),
            };

            if self
                .repository
                .find_by_username(&new_user.username)
                .await?
                .is_some()
            {
                continue;
            }

            return match self.repository.create_user(&new_user).await {
                Ok(user) => Ok(user),
                Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
                Err(e) => Err(UserServiceError::RepositoryError(e)),
            };
        }

        Err(UserServiceError::UsernameTaken)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_username(username).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> Result<User, UserServiceError> {
        let mut changes = UserChanges::default();

        if let Some(username) = request.username.as_deref().map(str::trim) {
            if !username.is_empty() {
                validate_username(username)?;
                if let Some(existing) = self.repository.find_by_username(username).await? {
                    if existing.id != request.user_id {
                        return Err(UserServiceError::UsernameTaken);
                    }
                }
                changes.username = Some(username.to_string());
            }
        }

        if let Some(email) = normalize_email(request.email.as_deref()) {
            validate_email(&email)?;
            if let Some(existing) = self.repository.find_by_email(&email).await? {
                if existing.id != request.user_id {
                    return Err(UserServiceError::EmailTaken);
                }
            }
            changes.email = Some(email);
        }

        if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
            validate_password(password)?;
            changes.password_hash = Some(hash_password(password)?);
        }

        changes.avatar = request
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        match self.repository.update_user(request.user_id, &changes).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::UsernameTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn set_password(&self, user_id: i64, password: &str) -> Result<(), UserServiceError> {
        self.update_profile(UpdateProfileRequest {
            user_id,
            password: Some(password.to_string()),
            ..Default::default()
        })
        .await
        .map(|_| ())
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        verify_password(password, password_hash)
    }
}

fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if !email.contains('@') || email.len() > 255 || email.is_empty() {
        return Err(UserServiceError::InvalidEmail);
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if !USERNAME_PATTERN.is_match(username) {
        return Err(UserServiceError::InvalidUsername);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserServiceError::WeakPassword);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::HashingError(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}

/// Display name with whitespace removed, lowercased, plus a random suffix.
pub fn generate_username(display_name: &str) -> String {
    let mut base: String = display_name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(32 - USERNAME_SUFFIX_LEN)
        .collect();

    if base.is_empty() {
        base.push_str("user");
    }

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(USERNAME_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}{}", base, suffix)
}

fn generate_password() -> String {
    let bytes: [u8; 12] = rand::thread_rng().gen();
    hex::encode(bytes)
}
