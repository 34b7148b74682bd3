use estate::{
    config::{
        session::{validate_production_config, SessionConfig, SESSION_TABLE},
        ServerConfig,
    },
    db, routes, AppState,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    validate_production_config()?;
    let server_config = ServerConfig::from_env()?;

    let pool = db::create_pool().await?;
    db::run_migrations(&pool).await?;

    let session_store = SqliteStore::new(pool.clone()).with_table_name(SESSION_TABLE)?;
    session_store.migrate().await?;
    let session_layer = SessionConfig::from_env().create_layer(session_store);

    let app_state = AppState::from_pool(pool);
    let mut app = routes::build_router(app_state, session_layer);

    if let Some(cors) = server_config
        .client_origin
        .as_deref()
        .and_then(routes::cors_layer)
    {
        app = app.layer(cors);
    }

    let addr = server_config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
