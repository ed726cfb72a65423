//! Input validation helpers
//!
//! Emails are normalized before any lookup or storage so equality is
//! case-insensitive everywhere. Password policy is length-only; strength
//! scoring is left to clients.

/// Normalize an email address for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check that an email has a local part, an `@`, and a dotted domain,
/// with no whitespace anywhere
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain needs a dot with non-empty segments around it
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

/// Check the minimum password length (8 bytes)
pub fn validate_password(password: &str) -> bool {
    password.len() >= 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@example.com"), "bob@example.com");
    }

    #[test]
    fn test_validate_email_accepts_normal_addresses() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last@sub.example.co"));
        assert!(validate_email("u+tag@example.io"));
    }

    #[test]
    fn test_validate_email_rejects_malformed_addresses() {
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@nodot"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("user@domain."));
        assert!(!validate_email("user name@example.com"));
        assert!(!validate_email("user@exa mple.com"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678"));
        assert!(validate_password("a much longer passphrase"));
        assert!(!validate_password("1234567"));
        assert!(!validate_password(""));
    }
}
