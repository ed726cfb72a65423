//! Request and response models for authentication endpoints

use authgate_core::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response to successful registration or login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Response to a successful token refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Response to logout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub sessions_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_camel_case() {
        let body = r#"{"email":"a@b.co","password":"longenough","name":"A"}"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.email, "a@b.co");
    }

    #[test]
    fn test_refresh_request_field_name() {
        let body = r#"{"refreshToken":"abc.def.ghi"}"#;
        let req: RefreshRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.refresh_token, "abc.def.ghi");
    }

    #[test]
    fn test_auth_response_wire_names() {
        let user = User::new(
            "a@b.co".to_string(),
            Some("hash".to_string()),
            "A".to_string(),
            Default::default(),
        );
        let resp = AuthResponse {
            user,
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 900,
        };

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["accessToken"], "at");
        assert_eq!(json["refreshToken"], "rt");
        assert_eq!(json["expiresIn"], 900);
        assert!(json["user"].get("passwordHash").is_none());
    }
}
