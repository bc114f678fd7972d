//! Password hashing utilities

use bcrypt::{hash, verify};

use crate::shared::errors::InfraError;

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const COST: u32 = 4;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, InfraError> {
    hash(password, COST).map_err(|e| InfraError::Crypto(e.to_string()))
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, InfraError> {
    verify(password, hash).map_err(|e| InfraError::Crypto(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("rahasia123").unwrap();
        assert_ne!(hashed, "rahasia123");
        assert!(verify_password("rahasia123", &hashed).unwrap());
        assert!(!verify_password("salah", &hashed).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_error() {
        assert!(verify_password("x", "not-a-bcrypt-hash").is_err());
    }
}
