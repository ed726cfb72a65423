//! Authorization middleware for protecting routes
//!
//! Extracts and validates JWT access tokens from the Authorization header.
//! On success, adds authenticated user information to request extensions;
//! identity travels only with the request, never through ambient state.

use super::jwt::{extract_bearer_token, validate_token, Claims, TokenError};
use crate::audit::{audit_log, AuditEvent};
use crate::response::ApiResponse;
use crate::state::AppState;
use authgate_core::{TokenType, UserRole};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

/// Authenticated user information extracted from a validated access token
///
/// This is added to request extensions by the auth middleware and can be
/// extracted in handlers using `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub user_id: String,
    /// User's email address
    pub email: String,
    /// User's role
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = UserRole::parse(&claims.role).ok_or(AuthError::InvalidToken)?;
        Ok(Self {
            user_id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

/// Authorization middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuthHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
        };

        let body: ApiResponse<()> = ApiResponse::err(message);
        (status, Json(body)).into_response()
    }
}

/// Resolve the client IP for a request
///
/// Takes the first entry of X-Forwarded-For if present, then X-Real-IP,
/// then the transport peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return Some(first_ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

/// Extract the user agent header
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(auth_header).map_err(|_| AuthError::InvalidAuthHeader)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        TokenError::ExpiredToken => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    // Only access tokens authorize API calls
    if claims.token_type != TokenType::Access {
        return Err(AuthError::InvalidToken);
    }

    AuthenticatedUser::try_from(claims)
}

/// Middleware that requires a valid access token
///
/// On success, adds `AuthenticatedUser` to request extensions. Attach with
/// `middleware::from_fn_with_state(state, require_auth)`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let ip_address = client_ip(request.headers(), peer);

    let user = match authenticate(request.headers(), state.auth.jwt_secret()) {
        Ok(user) => user,
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                reason: e.to_string(),
                ip_address,
            });
            return Err(e);
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Unlike `require_auth`, this never fails the request. It only adds the
/// user to extensions when a valid access token is present, so handlers can
/// serve both anonymous and authenticated callers.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Ok(user) = authenticate(request.headers(), state.auth.jwt_secret()) {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Type alias for role middleware future
type RoleMiddlewareFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>;

/// Middleware factory for role-based access control
///
/// Returns a middleware that passes only callers whose role is in the
/// allowed set. Must run after `require_auth`; a request with no attached
/// identity is rejected as unauthenticated.
///
/// ```ignore
/// let app = Router::new()
///     .route("/admin", get(admin_handler))
///     .route_layer(middleware::from_fn(require_role(&[UserRole::Admin])))
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub fn require_role(
    allowed: &'static [UserRole],
) -> impl Fn(Request<Body>, Next) -> RoleMiddlewareFuture + Clone {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let user = request
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or(AuthError::MissingAuthHeader)?
                .clone();

            if !allowed.contains(&user.role) {
                audit_log(&AuditEvent::AccessDenied {
                    user_id: user.user_id.clone(),
                    email: user.email.clone(),
                    required_roles: allowed
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                });

                return Err(AuthError::InsufficientPermissions);
            }

            Ok(next.run(request).await)
        })
    }
}
