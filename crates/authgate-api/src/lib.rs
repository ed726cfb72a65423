//! Authgate API - authentication and session REST server
//!
//! Provides HTTP endpoints for registration, login, token refresh, logout,
//! and session introspection, plus the middleware for protecting routes in
//! downstream services.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub use state::AppState;

/// Build a router backed by the in-memory store, for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    use auth::AuthService;
    use authgate_core::config::AppConfig;
    use store::InMemoryStore;

    let config = AppConfig::default();
    let store = Arc::new(InMemoryStore::new());
    let auth = AuthService::new(
        store.clone(),
        store,
        config.auth.clone(),
        config.environment,
    );
    create_router(Arc::new(AppState::new(config, auth)))
}
