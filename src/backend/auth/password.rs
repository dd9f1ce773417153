//! Password hashing with bcrypt.

use crate::backend::error::BackendError;

/// bcrypt work factor for stored password hashes
pub const HASH_COST: u32 = 10;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, BackendError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| {
        tracing::error!("[Auth] Password hashing failed: {:?}", e);
        BackendError::internal(format!("password hashing failed: {}", e))
    })
}

/// Compare a candidate password with a stored hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("[Auth] Stored password hash is unreadable: {:?}", e);
            false
        }
    }
}

pub fn validate_new_password(password: &str) -> Result<(), BackendError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
