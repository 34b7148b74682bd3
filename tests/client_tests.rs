use estate::{
    client::{ApiClient, ClientError, ClientSession, FieldChange, FormError, ListingForm},
    config::{session::SessionConfig, session::SESSION_TABLE, ImageHostConfig},
    models::listing::{ListingQuery, ListingType, TypeFilter},
    routes::build_router,
    services::{
        auth_service::ProviderProfile,
        image_host::{ImageFile, ImageHost},
    },
    test_utils::test_helpers,
    AppState,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_sessions_sqlx_store::SqliteStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves the API on an ephemeral port and returns its base URL.
async fn spawn_api() -> String {
    let pool = test_helpers::create_test_db().await.unwrap();
    let session_store = SqliteStore::new(pool.clone())
        .with_table_name(SESSION_TABLE)
        .unwrap();
    session_store.migrate().await.unwrap();

    let session_layer = SessionConfig::for_environment("development").create_layer(session_store);
    let app = build_router(AppState::from_pool(pool), session_layer);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn signed_in_client() -> (ApiClient, ClientSession) {
    let api = ApiClient::new(spawn_api().await).unwrap();
    api.sign_up("janedoe", Some("jane@example.com"), "password123")
        .await
        .unwrap();

    let mut session = ClientSession::new();
    assert!(session.sign_in(&api, "jane@example.com", "password123").await);
    (api, session)
}

fn image_host(server: &MockServer) -> ImageHost {
    ImageHost::new(ImageHostConfig {
        base_url: server.uri(),
        cloud_name: "demo".to_string(),
        upload_preset: "estate_unsigned".to_string(),
    })
    .unwrap()
}

fn photo(name: &str) -> ImageFile {
    ImageFile::new(name, "image/jpeg", b"fake-jpeg-bytes".to_vec())
}

#[tokio::test]
async fn test_sign_in_populates_session_from_response() {
    let api = ApiClient::new(spawn_api().await).unwrap();
    let message = api
        .sign_up("janedoe", Some("jane@example.com"), "password123")
        .await
        .unwrap();
    assert_eq!(message, "User created successfully!");

    let mut session = ClientSession::new();
    assert!(session.sign_in(&api, "jane@example.com", "password123").await);

    let user = session.current_user.as_ref().expect("signed-in user");
    assert_eq!(user.username, "janedoe");
    assert_eq!(user.email.as_deref(), Some("jane@example.com"));
    assert!(!user.avatar.is_empty());
    assert!(!session.loading);
    assert!(session.error.is_none());
}

#[tokio::test]
async fn test_failed_sign_in_records_error() {
    let api = ApiClient::new(spawn_api().await).unwrap();

    let mut session = ClientSession::new();
    assert!(!session.sign_in(&api, "ghost@example.com", "password123").await);

    assert!(session.current_user.is_none());
    assert!(!session.loading);
    assert_eq!(session.error.as_deref(), Some("Wrong credentials!"));
}

#[tokio::test]
async fn test_provider_sign_in_success() {
    let api = ApiClient::new(spawn_api().await).unwrap();
    let mut session = ClientSession::new();

    let signed_in = session
        .sign_in_with_provider(
            &api,
            ProviderProfile {
                name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                photo: Some("https://photos.example/jane.png".to_string()),
            },
        )
        .await;

    assert!(signed_in);
    let user = session.current_user.expect("signed-in user");
    assert!(user.username.starts_with("janedoe"));
    assert_eq!(user.avatar, "https://photos.example/jane.png");
}

#[tokio::test]
async fn test_provider_sign_in_failure_leaves_session_untouched() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "statusCode": 500,
            "message": "Internal server error"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = ApiClient::new(mock_server.uri()).unwrap();
    let mut session = ClientSession::new();
    session.sign_in_failure("earlier failure");
    let before = session.clone();

    let signed_in = session
        .sign_in_with_provider(
            &api,
            ProviderProfile {
                name: "Jane Doe".to_string(),
                email: Some("jane@example.com".to_string()),
                photo: None,
            },
        )
        .await;

    assert!(!signed_in);
    assert_eq!(session, before);
}

#[tokio::test]
async fn test_api_errors_carry_status_and_message() {
    let api = ApiClient::new(spawn_api().await).unwrap();

    let err = api.get_listing(42).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Listing not found!");
        }
        other => panic!("expected API error, got {:?}", other),
    }

    let err = api
        .create_listing(&test_helpers::valid_listing_request("No session"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_form_upload_and_submit() {
    let (api, session) = signed_in_client().await;
    let owner_id = session.current_user.as_ref().unwrap().id;

    let image_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "secure_url": "https://res.example/house.jpg" })),
        )
        .expect(2)
        .mount(&image_server)
        .await;

    let mut form = ListingForm::new();
    for change in [
        FieldChange::text("name", "Lake House"),
        FieldChange::text("description", "Quiet and bright"),
        FieldChange::text("address", "1 Shore Road"),
        FieldChange::radio("sale"),
        FieldChange::number("bedrooms", "4"),
        FieldChange::number("regularPrice", "320000"),
        FieldChange::checkbox("offer", true),
        FieldChange::number("discountPrice", "300000"),
        FieldChange::checkbox("parking", true),
    ] {
        form.apply(&change).unwrap();
    }

    form.upload_images(&image_host(&image_server), vec![photo("front.jpg"), photo("back.jpg")])
        .await
        .unwrap();
    assert_eq!(form.image_urls.len(), 2);

    let listing = form.submit(&api).await.unwrap();
    assert_eq!(listing.name, "Lake House");
    assert_eq!(listing.listing_type, ListingType::Sale);
    assert_eq!(listing.bedrooms, 4);
    assert_eq!(listing.bathrooms, 1);
    assert!(listing.offer && listing.parking && !listing.furnished);
    assert_eq!(listing.user_ref, owner_id);

    let mut edit = ListingForm::from_listing(&listing);
    edit.apply(&FieldChange::checkbox("furnished", true)).unwrap();
    edit.remove_image_url(1);
    let updated = edit.submit_update(&api, listing.id).await.unwrap();
    assert!(updated.furnished);
    assert_eq!(updated.image_urls.len(), 1);

    let found = api
        .search_listings(&ListingQuery {
            search_term: Some("lake".to_string()),
            listing_type: TypeFilter::Sale,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, listing.id);

    let mine = api.user_listings(owner_id).await.unwrap();
    assert_eq!(mine.len(), 1);

    assert_eq!(
        api.delete_listing(listing.id).await.unwrap(),
        "Listing has been deleted!"
    );
}

#[tokio::test]
async fn test_failed_upload_adds_no_urls() {
    let image_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&image_server)
        .await;

    let mut form = ListingForm::new();
    form.add_image_urls(vec!["https://res.example/existing.jpg".to_string()]);

    let err = form
        .upload_images(&image_host(&image_server), vec![photo("a.jpg"), photo("b.jpg")])
        .await
        .unwrap_err();

    assert_eq!(err, FormError::UploadFailed);
    assert_eq!(err.to_string(), "Image upload failed. Please try again.");
    assert_eq!(form.image_urls, vec!["https://res.example/existing.jpg".to_string()]);
}

#[tokio::test]
async fn test_oversized_selection_never_reaches_image_host() {
    let image_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&image_server)
        .await;

    let mut form = ListingForm::new();
    let files = (0..7).map(|i| photo(&format!("{}.jpg", i))).collect();
    let err = form
        .upload_images(&image_host(&image_server), files)
        .await
        .unwrap_err();

    assert_eq!(err, FormError::ImageLimit);
    assert!(form.image_urls.is_empty());
}

#[tokio::test]
async fn test_invalid_form_is_not_submitted() {
    let api_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&api_server)
        .await;
    let api = ApiClient::new(api_server.uri()).unwrap();

    let mut form = ListingForm::new();
    form.add_image_urls(vec!["https://res.example/a.jpg".to_string()]);
    form.apply(&FieldChange::number("regularPrice", "100")).unwrap();
    form.apply(&FieldChange::number("discountPrice", "120")).unwrap();

    let err = form.submit(&api).await.unwrap_err();
    assert_eq!(err.to_string(), "Discount price cannot exceed regular price.");
}

#[tokio::test]
async fn test_sign_out_clears_local_and_remote_session() {
    let (api, mut session) = signed_in_client().await;

    assert!(session.sign_out_remote(&api).await);
    assert!(!session.is_signed_in());

    let err = api.user_listings(1).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}
