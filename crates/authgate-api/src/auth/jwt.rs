//! JWT token issuance and validation
//!
//! Implements JWT-based authentication with HMAC signing. Access tokens
//! authorize API calls for a short window; refresh tokens are longer-lived
//! and accepted only by the refresh endpoint. Both carry the same claim set
//! and differ only in the `type` claim and expiry.

use authgate_core::{AuthConfig, TokenType, User};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims structure containing user information
///
/// These claims are embedded in every issued token and extracted during
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: String,
    /// User's email address
    pub email: String,
    /// User's role (admin, user, moderator)
    pub role: String,
    /// Token kind (access or refresh)
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

/// Token issuance and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode JWT: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Malformed Authorization header")]
    MalformedHeader,
}

/// Issue a signed token of the given kind for a user
///
/// # Arguments
///
/// * `user` - The user the token identifies
/// * `token_type` - Access or refresh
/// * `ttl_secs` - Lifetime in seconds from now
/// * `secret` - HMAC signing secret
///
/// # Returns
///
/// * `Ok(String)` - Encoded JWT
/// * `Err(TokenError)` - If encoding fails
pub fn issue_token(
    user: &User,
    token_type: TokenType,
    ttl_secs: u64,
    secret: &str,
) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        token_type,
        iat: now,
        exp: now + ttl_secs as i64,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Issue a short-lived access token using the configured TTL
pub fn issue_access_token(user: &User, config: &AuthConfig) -> Result<String, TokenError> {
    issue_token(
        user,
        TokenType::Access,
        config.access_token_ttl_secs,
        &config.jwt_secret,
    )
}

/// Issue a refresh token using the configured TTL
pub fn issue_refresh_token(user: &User, config: &AuthConfig) -> Result<String, TokenError> {
    issue_token(
        user,
        TokenType::Refresh,
        config.refresh_token_ttl_secs,
        &config.jwt_secret,
    )
}

/// Validate a token and extract its claims
///
/// Accepts only HMAC-family algorithms, so a token re-signed under a
/// different algorithm family never verifies. Expiry is checked with zero
/// leeway.
///
/// # Returns
///
/// * `Ok(Claims)` - Decoded and validated claims
/// * `Err(TokenError::ExpiredToken)` - Signature valid but past `exp`
/// * `Err(TokenError::InvalidToken)` - Any other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Extract the bearer token from an Authorization header value
///
/// The scheme prefix is exactly `"Bearer "`, case-sensitive, and the
/// remainder must be non-empty.
pub fn extract_bearer_token(header: &str) -> Result<&str, TokenError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(TokenError::MalformedHeader)?;
    if token.is_empty() {
        return Err(TokenError::MalformedHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_core::UserRole;

    fn test_user() -> User {
        User::new(
            "test@example.com".to_string(),
            Some("hash".to_string()),
            "Test User".to_string(),
            UserRole::User,
        )
    }

    fn test_config() -> AuthConfig {
        AuthConfig::default()
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let config = test_config();
        let user = test_user();

        let token = issue_access_token(&user, &config).expect("Failed to issue token");
        let claims = validate_token(&token, &config.jwt_secret).expect("Failed to validate token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_has_refresh_type_and_ttl() {
        let config = test_config();
        let user = test_user();

        let token = issue_refresh_token(&user, &config).unwrap();
        let claims = validate_token(&token, &config.jwt_secret).unwrap();

        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_invalid_token() {
        let config = test_config();
        let result = validate_token("invalid.token.here", &config.jwt_secret);
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = test_user();
        let token = issue_token(&user, TokenType::Access, 900, "secret-one").unwrap();

        let result = validate_token(&token, "secret-two");
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let user = test_user();
        let secret = "test-secret";
        let now = Utc::now().timestamp();

        // Expired an hour ago
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: "user".to_string(),
            token_type: TokenType::Access,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let result = validate_token(&token, secret);
        assert!(matches!(result, Err(TokenError::ExpiredToken)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let config = test_config();
        let user = test_user();
        let token = issue_access_token(&user, &config).unwrap();

        // Swap the payload segment for one claiming a different subject
        let parts: Vec<&str> = token.split('.').collect();
        let other = issue_access_token(&test_user(), &config).unwrap();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        let result = validate_token(&tampered, &config.jwt_secret);
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");

        assert!(matches!(
            extract_bearer_token("bearer abc"),
            Err(TokenError::MalformedHeader)
        ));
        assert!(matches!(
            extract_bearer_token("Basic abc"),
            Err(TokenError::MalformedHeader)
        ));
        assert!(matches!(
            extract_bearer_token("Bearer "),
            Err(TokenError::MalformedHeader)
        ));
        assert!(matches!(
            extract_bearer_token("abc.def.ghi"),
            Err(TokenError::MalformedHeader)
        ));
    }
}
