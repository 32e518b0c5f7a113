//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Hash with an explicit cost; tests use the minimum of 4.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matches_only_original() {
        let hashed = hash_password_with_cost("hunter22", 4).unwrap();
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
    }
}
