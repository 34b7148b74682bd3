use crate::config::session::SessionLayer;
use crate::{auth, handlers, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the API router with session and tracing layers applied.
pub fn build_router(state: AppState, session_layer: SessionLayer) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/listing/create",
            post(handlers::create_listing_handler),
        )
        .route(
            "/api/listing/update/{id}",
            post(handlers::update_listing_handler),
        )
        .route(
            "/api/listing/delete/{id}",
            delete(handlers::delete_listing_handler),
        )
        .route("/api/user/update/{id}", post(handlers::update_user_handler))
        .route(
            "/api/user/delete/{id}",
            delete(handlers::delete_user_handler),
        )
        .route(
            "/api/user/listings/{id}",
            get(handlers::user_listings_handler),
        )
        .route("/api/user/{id}", get(handlers::get_user_handler))
        .layer(middleware::from_fn(auth::middleware::require_auth));

    Router::new()
        .route("/api/auth/signup", post(auth::handlers::signup_handler))
        .route("/api/auth/signin", post(auth::handlers::signin_handler))
        .route(
            "/api/auth/google",
            post(auth::handlers::provider_signin_handler),
        )
        .route("/api/auth/signout", get(auth::handlers::signout_handler))
        .route("/api/listing/get", get(handlers::search_listings_handler))
        .route("/api/listing/get/{id}", get(handlers::get_listing_handler))
        .merge(protected_routes)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy letting the single-page app send credentialed requests.
pub fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(origin) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Ignoring invalid CLIENT_ORIGIN: {}", origin);
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .max_age(std::time::Duration::from_secs(3600)),
    )
}
