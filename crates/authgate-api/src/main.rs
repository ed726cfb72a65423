//! Authgate API Server
//!
//! REST API server for authentication and session management.

use authgate_api::auth::AuthService;
use authgate_api::store::PostgresStore;
use authgate_api::{create_router, AppState};
use authgate_core::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(config.database.pool_size)
        .connect(&config.database.url)
        .await?;

    let store = Arc::new(PostgresStore::new(pool));
    let auth = AuthService::new(
        store.clone(),
        store,
        config.auth.clone(),
        config.environment,
    );

    // Create application state and router
    let state = Arc::new(AppState::new(config, auth));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Authgate API server starting on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
