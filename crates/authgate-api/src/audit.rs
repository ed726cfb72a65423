//! Security audit logging for authentication events
//!
//! Provides structured audit logging for logins, registrations, token
//! refreshes, logouts, and access control failures.
//!
//! All audit events are logged at INFO level with the "audit" target,
//! making them easy to filter and route to security monitoring systems.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events for authentication and authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user login
    LoginSuccess {
        user_id: String,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed login attempt
    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Successful user registration
    RegistrationSuccess {
        user_id: String,
        email: String,
        role: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed registration attempt
    RegistrationFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Access token refresh
    TokenRefresh {
        user_id: String,
        email: String,
    },

    /// User logout (session deletion)
    Logout {
        user_id: String,
        sessions_deleted: u64,
    },

    /// Access denied due to insufficient role
    AccessDenied {
        user_id: String,
        email: String,
        required_roles: String,
    },

    /// Invalid or expired token presented
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
    },
}

/// Log a security audit event with structured fields
///
/// Events are logged at INFO level with the "audit" target, making them
/// easy to filter and route separately from application logs. The full
/// event is serialized to JSON for log aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            user_id,
            email,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            email,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::RegistrationSuccess {
            user_id,
            email,
            role,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                role = %role,
                ip_address = ?ip_address,
                "Registration successful"
            );
        }
        AuditEvent::RegistrationFailure {
            email,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                ip_address = ?ip_address,
                "Registration failed"
            );
        }
        AuditEvent::TokenRefresh { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Token refresh"
            );
        }
        AuditEvent::Logout {
            user_id,
            sessions_deleted,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                sessions_deleted = %sessions_deleted,
                "User logout"
            );
        }
        AuditEvent::AccessDenied {
            user_id,
            email,
            required_roles,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                required_roles = %required_roles,
                "Access denied"
            );
        }
        AuditEvent::InvalidToken { reason, ip_address } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Invalid token"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            user_id: "user_1".to_string(),
            email: "test@example.com".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("login_success"));
        assert!(json.contains("test@example.com"));
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::LoginFailure {
            email: "test@example.com".to_string(),
            reason: "Invalid password".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: None,
        });

        audit_log(&AuditEvent::Logout {
            user_id: "user_1".to_string(),
            sessions_deleted: 2,
        });
    }
}
