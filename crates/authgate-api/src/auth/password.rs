/// Password hashing and verification using Argon2id
///
/// Implements secure password hashing following OWASP recommendations:
/// - Algorithm: Argon2id (memory-hard, resistant to GPU attacks)
/// - Memory: 64 MB
/// - Iterations: 3
/// - Parallelism: 4 threads
/// - Salt: 16 bytes random
/// - Output: 32 bytes hash
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
}

/// Password hashing configuration
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism (threads, default: 4)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
            output_len: Some(32),
        }
    }
}

impl PasswordConfig {
    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

/// Hash a plaintext password using Argon2id
///
/// Returns a PHC string that embeds the algorithm, parameters, and salt, so
/// it is safe to store as-is and needs no companion columns.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let config = PasswordConfig::default();
    hash_password_with_config(password, &config)
}

/// Hash a password with custom Argon2 parameters
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = config.to_params()?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// Returns false for any non-match, including a hash that fails to parse.
/// Callers must not be able to distinguish a malformed stored hash from a
/// wrong password.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "SecureP@ssw0rd!";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(&hash, password));
        assert!(!verify_password(&hash, "WrongPassword"));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        // Due to random salt, same password should produce different hashes
        let password = "SamePassword123!";

        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(verify_password(&hash1, password));
        assert!(verify_password(&hash2, password));
    }

    #[test]
    fn test_hash_is_phc_format() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("invalid-hash-format", "password"));
        assert!(!verify_password("", "password"));
    }

    #[test]
    fn test_custom_config() {
        let config = PasswordConfig {
            memory_cost: 32768, // 32 MB (lighter for tests)
            time_cost: 2,
            parallelism: 2,
            output_len: Some(32),
        };

        let password = "TestPassword123!";
        let hash = hash_password_with_config(password, &config).unwrap();

        assert!(verify_password(&hash, password));
        assert!(hash.contains("m=32768"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=2"));
    }
}
