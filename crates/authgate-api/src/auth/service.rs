//! Authentication service layer
//!
//! Provides business logic for user registration, login, token refresh,
//! logout, and session introspection. Talks to storage only through the
//! `IdentityResolver` and `SessionStore` traits; configuration and the
//! deployment environment are injected at construction.

use super::jwt::{issue_access_token, issue_refresh_token, validate_token, TokenError};
use super::models::{
    AuthResponse, LoginRequest, LogoutResponse, RefreshRequest, RefreshResponse, RegisterRequest,
};
use super::password::{hash_password, verify_password};
use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::validation::{normalize_email, validate_email, validate_password};
use authgate_core::{
    AuthConfig, Environment, IdentityResolver, Session, SessionStore, StoreError, TokenType, User,
    UserRole,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Message returned for any credential failure during login
///
/// Unknown email and wrong password produce this same message so login
/// responses carry no account-enumeration signal.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Request metadata captured into new sessions
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn IdentityResolver>,
    sessions: Arc<dyn SessionStore>,
    config: AuthConfig,
    environment: Environment,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn IdentityResolver>,
        sessions: Arc<dyn SessionStore>,
        config: AuthConfig,
        environment: Environment,
    ) -> Self {
        Self {
            users,
            sessions,
            config,
            environment,
        }
    }

    /// Signing secret for middleware token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }

    /// Register a new user
    ///
    /// Validates inputs, rejects duplicate emails with Conflict, hashes the
    /// password, and issues the initial token pair alongside a session.
    pub async fn register(
        &self,
        request: RegisterRequest,
        meta: ClientMeta,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);

        if !validate_email(&email) {
            return Err(AppError::BadRequest("Invalid email format".to_string()));
        }
        if !validate_password(&request.password) {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }

        // Pre-check for a friendlier error; the unique constraint still
        // backs this up under concurrent registration
        match self.users.find_user_by_email(&email).await {
            Ok(_) => {
                audit_log(&AuditEvent::RegistrationFailure {
                    email: email.clone(),
                    reason: "Email already registered".to_string(),
                    ip_address: meta.ip_address.clone(),
                    user_agent: meta.user_agent.clone(),
                });
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(self.internal(e)),
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

        let mut user = User::new(
            email.clone(),
            Some(password_hash),
            request.name.trim().to_string(),
            UserRole::User,
        );

        if let Err(e) = self.users.create_user(&mut user).await {
            return match e {
                StoreError::DuplicateEmail => {
                    audit_log(&AuditEvent::RegistrationFailure {
                        email,
                        reason: "Email already registered".to_string(),
                        ip_address: meta.ip_address.clone(),
                        user_agent: meta.user_agent.clone(),
                    });
                    Err(AppError::Conflict("Email already registered".to_string()))
                }
                other => Err(self.internal(other)),
            };
        }

        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        });

        self.issue_pair_with_session(user, meta).await
    }

    /// Login with email and password
    pub async fn login(
        &self,
        request: LoginRequest,
        meta: ClientMeta,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);

        let user = match self.users.find_user_by_email(&email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                audit_log(&AuditEvent::LoginFailure {
                    email,
                    reason: "Unknown email".to_string(),
                    ip_address: meta.ip_address.clone(),
                    user_agent: meta.user_agent.clone(),
                });
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Err(e) => return Err(self.internal(e)),
        };

        // Password-less (OAuth-only) accounts fail the same way as a wrong
        // password
        let verified = user
            .password_hash
            .as_deref()
            .map(|hash| verify_password(hash, &request.password))
            .unwrap_or(false);

        if !verified {
            audit_log(&AuditEvent::LoginFailure {
                email,
                reason: "Wrong password".to_string(),
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            });
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id.clone(),
            email: user.email.clone(),
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        });

        self.issue_pair_with_session(user, meta).await
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Validity is purely cryptographic: the session record created at login
    /// is not consulted, so deleting sessions does not revoke an unexpired
    /// refresh token.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, AppError> {
        let claims = validate_token(&request.refresh_token, &self.config.jwt_secret).map_err(
            |e| match e {
                TokenError::ExpiredToken => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            },
        )?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }

        let user = match self.users.find_user_by_id(&claims.sub).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                return Err(AppError::Unauthorized("User not found".to_string()))
            }
            Err(e) => return Err(self.internal(e)),
        };

        let access_token = issue_access_token(&user, &self.config)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))?;

        audit_log(&AuditEvent::TokenRefresh {
            user_id: user.id,
            email: user.email,
        });

        Ok(RefreshResponse {
            access_token,
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Delete all of the caller's sessions
    ///
    /// Issued tokens stay valid until they expire; logout only removes the
    /// server-side session records.
    pub async fn logout(&self, user_id: &str) -> Result<LogoutResponse, AppError> {
        let deleted = self
            .sessions
            .delete_user_sessions(user_id)
            .await
            .map_err(|e| self.internal(e))?;

        audit_log(&AuditEvent::Logout {
            user_id: user_id.to_string(),
            sessions_deleted: deleted,
        });

        Ok(LogoutResponse {
            sessions_deleted: deleted,
        })
    }

    /// Resolve the authenticated caller's full user record
    pub async fn current_user(&self, user_id: &str) -> Result<User, AppError> {
        match self.users.find_user_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) => Err(self.internal(e)),
        }
    }

    /// List the caller's active sessions, newest first
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, AppError> {
        self.sessions
            .list_active_sessions(user_id)
            .await
            .map_err(|e| self.internal(e))
    }

    /// Issue access+refresh tokens and a session sharing the refresh window
    async fn issue_pair_with_session(
        &self,
        user: User,
        meta: ClientMeta,
    ) -> Result<AuthResponse, AppError> {
        let access_token = issue_access_token(&user, &self.config)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))?;
        let refresh_token = issue_refresh_token(&user, &self.config)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_token_ttl_secs as i64);
        let mut session = Session::new(user.id.clone(), expires_at);
        session.user_agent = meta.user_agent;
        session.ip_address = meta.ip_address;

        self.sessions
            .create_session(&mut session)
            .await
            .map_err(|e| self.internal(e))?;

        Ok(AuthResponse {
            user,
            access_token,
            refresh_token,
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Classify a storage error, hiding detail outside development
    fn internal(&self, err: StoreError) -> AppError {
        match err {
            StoreError::Database(msg) if self.environment.is_development() => {
                AppError::Internal(msg)
            }
            StoreError::Database(msg) => {
                tracing::error!(error = %msg, "storage failure");
                AppError::Internal("Internal server error".to_string())
            }
            other => AppError::from(other),
        }
    }
}
