/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: Session-bound JWT access and refresh tokens
/// - [`middleware`]: Caller identity (`AuthContext`) and bearer-token parsing
/// - [`authorization`]: Project role checks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3r$ecret")?;
/// assert!(verify_password("Sup3r$ecret", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
