use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

/// Hash a plain-text password with Argon2 and a random salt.
#[tracing::instrument(name = "Hash password.", skip(password))]
pub fn hash(password: &str) -> Result<String, String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Argon2 password hashing failed: {}", err);
            "Password hashing failed".to_string()
        })
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash itself is unusable.
#[tracing::instrument(name = "Verify password.", skip(stored_hash, password))]
pub fn verify(stored_hash: &str, password: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| {
        tracing::error!("Stored password hash is invalid: {}", err);
        "Invalid stored password hash".to_string()
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => {
            tracing::error!("Argon2 password verification failed: {}", err);
            Err("Password verification failed".to_string())
        }
    }
}
