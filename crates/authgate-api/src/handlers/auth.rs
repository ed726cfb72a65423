//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration, login, token refresh, logout,
//! and session introspection. Every response uses the `ApiResponse`
//! envelope.

use super::ApiJson;
use crate::auth::middleware::{client_ip, user_agent, AuthenticatedUser};
use crate::auth::models::{
    AuthResponse, LoginRequest, LogoutResponse, RefreshRequest, RefreshResponse, RegisterRequest,
};
use crate::auth::ClientMeta;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use authgate_core::{Session, User};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

fn client_meta(headers: &HeaderMap, peer: Option<ConnectInfo<SocketAddr>>) -> ClientMeta {
    ClientMeta {
        user_agent: user_agent(headers),
        ip_address: client_ip(headers, peer.map(|ci| ci.0)),
    }
}

/// Register a new user account
///
/// Creates a user with the provided email, password, and name. New users
/// get the 'user' role. On success the initial token pair and a session
/// are issued.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let meta = client_meta(&headers, peer);
    let response = state.auth.register(request, meta).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// Login with email and password
///
/// Unknown email and wrong password return the identical 401 response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let meta = client_meta(&headers, peer);
    let response = state.auth.login(request, meta).await?;

    Ok(Json(ApiResponse::ok(response)))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = RefreshResponse),
        (status = 401, description = "Invalid refresh token"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, AppError> {
    let response = state.auth.refresh(request).await?;

    Ok(Json(ApiResponse::ok(response)))
}

/// Delete all of the caller's sessions
///
/// Issued tokens remain valid until expiry.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<LogoutResponse>>, AppError> {
    let response = state.auth.logout(&user.user_id).await?;

    Ok(Json(ApiResponse::ok(response)))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let profile = state.auth.current_user(&user.user_id).await?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// List the authenticated user's active sessions, newest first
#[utoipa::path(
    get,
    path = "/api/auth/sessions",
    tag = "auth",
    responses(
        (status = 200, description = "Active sessions", body = Vec<Session>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Session>>>, AppError> {
    let sessions = state.auth.list_sessions(&user.user_id).await?;

    Ok(Json(ApiResponse::ok(sessions)))
}
