//! Authgate Core - Domain models, collaborator traits, and shared types
//!
//! This crate defines the core abstractions used throughout the Authgate
//! authentication subsystem:
//! - Identity models (users, roles, OAuth account stubs)
//! - Session records tracking issued refresh-token lineages
//! - Storage collaborator traits (identity resolution, session store)
//! - Type-tagged identifier generation
//! - Configuration management

pub mod config;
pub mod ids;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, Environment};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Storage Errors
// ============================================================================

/// Errors surfaced by the storage collaborators
///
/// `NotFound` is the only "row absent" signal; everything else the backend
/// produces is carried as `Database` and classified by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// User Models
// ============================================================================

/// User role
///
/// Determines the access level granted by the role-gate middleware:
/// - `Admin`: full access, including administrative endpoints
/// - `Moderator`: elevated access for content moderation
/// - `User`: default role for self-registered accounts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            "moderator" => Some(UserRole::Moderator),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User account
///
/// The email is normalized (trimmed, lowercased) before any lookup or
/// storage. `password_hash` is `None` for OAuth-only accounts and is never
/// serialized into any outward-facing representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Type-tagged identifier (`user_` prefix, time-ordered)
    pub id: String,

    /// Email address (unique, normalized)
    pub email: String,

    /// Argon2id password hash, absent for OAuth-only accounts
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Display name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar_url: Option<String>,

    pub role: UserRole,

    pub email_verified: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a freshly generated id
    ///
    /// Timestamps are provisional; the storage collaborator overwrites them
    /// with its own values on create.
    pub fn new(email: String, password_hash: Option<String>, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: ids::new_user_id(),
            email,
            password_hash,
            name,
            avatar_url: None,
            role,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Safe public projection of this user
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public user profile, safe for display to other users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Session Models
// ============================================================================

/// Server-side session record
///
/// One session is created per successful login or registration, with the
/// same validity window as the refresh token issued alongside it. A session
/// is valid only while `now < expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Type-tagged identifier (`sess_` prefix)
    pub id: String,

    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ip_address: Option<String>,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for a user, expiring at the given time
    pub fn new(user_id: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: ids::new_session_id(),
            user_id,
            user_agent: None,
            ip_address: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

// ============================================================================
// Token Types
// ============================================================================

/// Kind of signed token
///
/// Access tokens authorize individual API calls; refresh tokens are used
/// solely to mint new access tokens. Each is rejected where the other is
/// expected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// OAuth Models (stub - third-party login flows are out of scope)
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
    Twitter,
}

/// Linked third-party account
///
/// Provider tokens are never serialized into any outward-facing
/// representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthAccount {
    /// Type-tagged identifier (`oauth_` prefix)
    pub id: String,

    pub user_id: String,

    pub provider: OAuthProvider,

    pub provider_account_id: String,

    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,

    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// User lookup and creation, backed by persistent storage
///
/// Callers normalize emails before lookups; implementations must fail with
/// `StoreError::DuplicateEmail` on a unique-email violation so concurrent
/// registrations surface as a conflict rather than a crash.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User>;

    /// Persist a new user, filling in the storage-assigned timestamps
    async fn create_user(&self, user: &mut User) -> StoreResult<()>;
}

/// Session record storage
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, filling in the storage-assigned creation time
    async fn create_session(&self, session: &mut Session) -> StoreResult<()>;

    async fn find_session_by_id(&self, id: &str) -> StoreResult<Session>;

    /// Unexpired sessions for a user, newest-created first
    async fn list_active_sessions(&self, user_id: &str) -> StoreResult<Vec<Session>>;

    /// Delete a single session; `NotFound` if it does not exist
    async fn delete_session(&self, id: &str) -> StoreResult<()>;

    /// Delete all sessions owned by a user, returning how many were removed
    async fn delete_user_sessions(&self, user_id: &str) -> StoreResult<u64>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_role_conversion() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::Moderator.as_str(), "moderator");

        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("moderator"), Some(UserRole::Moderator));
        assert_eq!(UserRole::parse("superuser"), None);
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_creation_defaults() {
        let user = User::new(
            "test@example.com".to_string(),
            Some("hashed".to_string()),
            "Test User".to_string(),
            UserRole::User,
        );

        assert!(user.id.starts_with("user_"));
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, UserRole::User);
        assert!(!user.email_verified);
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User::new(
            "test@example.com".to_string(),
            Some("secret_hash".to_string()),
            "Test User".to_string(),
            UserRole::User,
        );

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("emailVerified"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn test_user_to_public() {
        let user = User::new(
            "test@example.com".to_string(),
            Some("hash".to_string()),
            "Test User".to_string(),
            UserRole::Moderator,
        );

        let public = user.to_public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.name, user.name);

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("email"));
        assert!(!json.contains("role"));
    }

    #[test]
    fn test_session_expiry() {
        let mut session = Session::new(
            "user_1".to_string(),
            Utc::now() + Duration::days(7),
        );

        assert!(session.id.starts_with("sess_"));
        assert!(!session.is_expired());

        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_token_type_serde() {
        assert_eq!(serde_json::to_string(&TokenType::Access).unwrap(), "\"access\"");
        assert_eq!(
            serde_json::from_str::<TokenType>("\"refresh\"").unwrap(),
            TokenType::Refresh
        );
    }

    #[test]
    fn test_oauth_account_hides_provider_tokens() {
        let now = Utc::now();
        let account = OAuthAccount {
            id: ids::new_oauth_account_id(),
            user_id: "user_1".to_string(),
            provider: OAuthProvider::Google,
            provider_account_id: "google-123".to_string(),
            access_token: Some("provider-access-secret".to_string()),
            refresh_token: Some("provider-refresh-secret".to_string()),
            expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("provider-access-secret"));
        assert!(!json.contains("provider-refresh-secret"));
        assert!(json.contains("google"));
    }
}
