use estate::{
    repositories::user_repository::SqliteUserRepository,
    services::{
        auth_service::{AuthService, AuthServiceError, LoginRequest, ProviderProfile},
        user_service::UserService,
    },
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use std::sync::Arc;

fn auth_service(pool: SqlitePool) -> AuthService {
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let user_service = Arc::new(UserService::new(repository.clone()));
    AuthService::new(repository, user_service)
}

fn login(identifier: &str, password: &str) -> LoginRequest {
    LoginRequest {
        identifier: identifier.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_authenticate_with_email() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let id = test_helpers::insert_test_user(&pool, "jane", Some("jane@example.com"), "password123")
        .await
        .unwrap();
    let service = auth_service(pool);

    let user = service
        .authenticate(login("JANE@example.com", "password123"))
        .await
        .unwrap();
    assert_eq!(user.id, id);
}

#[tokio::test]
async fn test_authenticate_with_username() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let id = test_helpers::insert_test_user(&pool, "jane", None, "password123")
        .await
        .unwrap();
    let service = auth_service(pool);

    let user = service.authenticate(login("jane", "password123")).await.unwrap();
    assert_eq!(user.id, id);
}

#[tokio::test]
async fn test_authenticate_wrong_password() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "jane", Some("jane@example.com"), "password123")
        .await
        .unwrap();
    let service = auth_service(pool);

    let result = service
        .authenticate(login("jane@example.com", "wrong-password"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn test_authenticate_unknown_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(pool);

    let result = service
        .authenticate(login("ghost@example.com", "password123"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn test_provider_sign_in_creates_account_once() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(pool.clone());

    let profile = ProviderProfile {
        name: "Jane Doe".to_string(),
        email: Some("jane@example.com".to_string()),
        photo: Some("https://photos.example/jane.png".to_string()),
    };

    let first = service.sign_in_with_provider(profile.clone()).await.unwrap();
    let second = service.sign_in_with_provider(profile).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(first.username.starts_with("janedoe"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_provider_sign_in_matches_existing_password_account() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let id = test_helpers::insert_test_user(&pool, "jane", Some("jane@example.com"), "password123")
        .await
        .unwrap();
    let service = auth_service(pool);

    let user = service
        .sign_in_with_provider(ProviderProfile {
            name: "Jane Doe".to_string(),
            email: Some("Jane@Example.com".to_string()),
            photo: None,
        })
        .await
        .unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.username, "jane");
}

#[tokio::test]
async fn test_provider_sign_in_requires_email() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(pool);

    let result = service
        .sign_in_with_provider(ProviderProfile {
            name: "No Mail".to_string(),
            email: None,
            photo: None,
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::MissingProviderEmail)));
}

#[tokio::test]
async fn test_get_user_by_id() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let id = test_helpers::insert_test_user(&pool, "jane", None, "password123")
        .await
        .unwrap();
    let service = auth_service(pool);

    assert_eq!(service.get_user_by_id(id).await.unwrap().username, "jane");
    assert!(matches!(
        service.get_user_by_id(id + 1).await,
        Err(AuthServiceError::UserNotFound)
    ));
}
