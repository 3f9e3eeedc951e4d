/// Password hashing with Argon2id
///
/// Hashes are stored as PHC strings, so the parameters and salt travel with
/// the hash and verification needs no configuration.
///
/// # Parameters
///
/// - **Memory**: 64 MiB (65536 KiB)
/// - **Iterations**: 3
/// - **Parallelism**: 4 lanes
/// - **Output**: 32 bytes
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3r$ecret")?;
///
/// assert!(verify_password("Sup3r$ecret", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn argon2id() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// # Returns
///
/// PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2id()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// # Returns
///
/// `Ok(false)` for a wrong password; `Err` only when the hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks a new password against the strength rules
///
/// A password needs at least [`MIN_PASSWORD_LENGTH`] characters including an
/// uppercase letter, a lowercase letter, a digit and a symbol.
///
/// ```
/// use taskboard_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    let checks: [(fn(char) -> bool, &str); 4] = [
        (char::is_uppercase, "an uppercase letter"),
        (char::is_lowercase, "a lowercase letter"),
        (char::is_numeric, "a digit"),
        (|c: char| !c.is_alphanumeric(), "a special character"),
    ];

    for (check, requirement) in checks {
        if !password.chars().any(check) {
            return Err(format!("Password must contain {}", requirement));
        }
    }

    Ok(())
}
