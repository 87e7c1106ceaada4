/// Password Hashing and Verification
///
/// Bcrypt with the library's default cost. The cost and salt are embedded
/// in the hash output, so verification needs no side-channel
/// configuration.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password using bcrypt
///
/// # Errors
/// Fails only on a catastrophic hashing failure, never on password
/// content.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
///
/// Comparison is constant-time inside bcrypt. A wrong password and a
/// malformed stored hash produce the same error, so the caller learns
/// nothing about which check failed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AppError> {
    match verify(password, stored_hash) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(AppError::Authentication),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let password = "PurpleMonkeyDishWasher";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hashed);
        // bcrypt identifier, with the cost embedded in the output
        assert!(hashed.starts_with("$2"));

        verify_password(password, &hashed).expect("Correct password should verify");
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hashed = hash_password("CorrectHorse1").expect("Failed to hash password");

        let err = verify_password("BatteryStaple2", &hashed)
            .expect_err("Wrong password should not verify");
        assert_eq!(err, AppError::Authentication);
    }

    #[test]
    fn malformed_hash_is_indistinguishable_from_wrong_password() {
        let hashed = hash_password("CorrectHorse1").expect("Failed to hash password");

        let wrong_password = verify_password("BatteryStaple2", &hashed).unwrap_err();
        let malformed_hash = verify_password("CorrectHorse1", "not-a-bcrypt-hash").unwrap_err();
        assert_eq!(wrong_password, malformed_hash);
    }

    #[test]
    fn same_password_hashes_differently() {
        // Fresh salt per hash
        let first = hash_password("SamePassword9").unwrap();
        let second = hash_password("SamePassword9").unwrap();
        assert_ne!(first, second);
    }
}
