use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{Rng, thread_rng};

use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn check_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    check_strength(password)?;
    hash_secret(password)
}

/// Argon2 hash for short-lived secrets such as one-time codes.
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|err| AuthError::Internal(format!("hashing failed: {err}")))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(candidate: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AuthError::Internal(format!("invalid stored hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

/// Six-digit numeric login code.
pub fn one_time_code() -> String {
    thread_rng().gen_range(100_000..1_000_000).to_string()
}
