//! Authentication and authorization
//!
//! Token issuance and validation, password hashing, the authentication
//! service, and route-protection middleware.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::{extract_bearer_token, issue_access_token, issue_refresh_token, validate_token};
pub use middleware::{optional_auth, require_auth, require_role, AuthenticatedUser};
pub use service::{AuthService, ClientMeta};
