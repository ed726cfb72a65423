//! Type-tagged identifiers
//!
//! Every record id is a lowercase type prefix, an underscore, and a UUIDv7
//! rendered as 32 hex characters. The v7 timestamp prefix makes ids of the
//! same type sort in creation order.

use uuid::Uuid;

pub const USER_PREFIX: &str = "user";
pub const SESSION_PREFIX: &str = "sess";
pub const OAUTH_ACCOUNT_PREFIX: &str = "oauth";

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::now_v7().simple())
}

pub fn new_user_id() -> String {
    new_id(USER_PREFIX)
}

pub fn new_session_id() -> String {
    new_id(SESSION_PREFIX)
}

pub fn new_oauth_account_id() -> String {
    new_id(OAUTH_ACCOUNT_PREFIX)
}

/// Check that an id carries the expected prefix and a plausible payload
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    match id.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('_')) {
        Some(payload) => {
            payload.len() == 32 && payload.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let id = new_user_id();
        assert!(id.starts_with("user_"));
        assert_eq!(id.len(), "user_".len() + 32);
        assert!(has_prefix(&id, USER_PREFIX));
    }

    #[test]
    fn test_prefix_check() {
        let id = new_session_id();
        assert!(has_prefix(&id, SESSION_PREFIX));
        assert!(!has_prefix(&id, USER_PREFIX));
        assert!(!has_prefix("sess_short", SESSION_PREFIX));
        assert!(!has_prefix("sess-nounderscore", SESSION_PREFIX));
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let first = new_session_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_session_id();
        assert!(first < second);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_user_id();
        let b = new_user_id();
        assert_ne!(a, b);
    }
}
