//! Session and identity service
//!
//! Owns sign-up, sign-in, sign-out and the mapping from a presented token to
//! a user profile. Every token names its session (`sid`), and a token only
//! authenticates while that session is active.
//!
//! Sign-up writes two rows that cannot share a transaction across the
//! [`Store`] boundary: the credential and then the profile. When the profile
//! insert fails the credential is deleted again, so a failed sign-up never
//! leaves a credential without a profile.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_shared::identity::{IdentityService, IdentitySettings, SignUp};
//! use taskboard_shared::store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = IdentityService::new(
//!     Arc::new(MemoryStore::new()),
//!     IdentitySettings::new("a-secret-key-that-is-at-least-32-bytes"),
//! );
//!
//! let signed_in = identity.sign_up(SignUp {
//!     email: "jane@example.com".to_string(),
//!     password: "Sup3r$ecret".to_string(),
//!     first_name: "Jane".to_string(),
//!     last_name: "Doe".to_string(),
//!     role: "Designer".to_string(),
//!     department: "Product".to_string(),
//! }).await?;
//!
//! let me = identity.current_user(&signed_in.access_token).await;
//! assert_eq!(me.map(|u| u.first_name), Some("Jane".to_string()));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::jwt::{self, Claims, JwtError, TokenType};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{self, PasswordError};
use crate::error::StoreError;
use crate::models::session::Session;
use crate::models::user::{normalize_email, CreateCredential, CreateProfile, UpdateProfile, User};
use crate::store::Store;

/// Error type for identity operations
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The profile insert failed after the credential was created
    #[error("Failed to create user profile: {0}")]
    ProfileCreation(String),

    /// Credentials are valid but no profile row exists for them
    #[error("User profile not found")]
    ProfileNotFound,

    /// Token invalid or expired, or its session revoked or expired
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("{0}")]
    WeakPassword(String),

    /// The configured session lifetime does not fit in a timestamp
    #[error("Session lifetime is out of range")]
    SessionTtlOutOfRange,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Shortest token lifetime worth issuing, in seconds; a session closer to expiry than this must sign in again
pub const MIN_TOKEN_TTL_SECONDS: i64 = 60;

/// Token and session lifetimes
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// How long a session stays usable after sign-in
    pub session_ttl: Duration,

    pub access_token_ttl: Duration,

    pub refresh_token_ttl: Duration,
}

impl IdentitySettings {
    /// Settings with the default lifetimes: 30 day sessions, 24h access and 30d refresh tokens
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            session_ttl: Duration::days(30),
            access_token_ttl: TokenType::Access.default_expiration(),
            refresh_token_ttl: TokenType::Refresh.default_expiration(),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }
}

/// Sign-up request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUp {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password strength rules
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    /// Job role label
    #[validate(length(min = 1, max = 100, message = "Role must be 1-100 characters"))]
    pub role: String,

    #[validate(length(min = 1, max = 100, message = "Department must be 1-100 characters"))]
    pub department: String,
}

/// Sign-in request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignIn {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Password change request
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

/// Result of a successful sign-up or sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub user: User,

    pub session_id: Uuid,

    pub access_token: String,

    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Fresh access token issued from a refresh token
#[derive(Debug, Clone, Serialize)]
pub struct Refreshed {
    pub access_token: String,
    pub expires_in: i64,
}

/// Identity operations over a [`Store`]
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    settings: Arc<IdentitySettings>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>, settings: IdentitySettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }

    /// Registers a credential and profile, then opens a session
    ///
    /// # Errors
    ///
    /// - `Validation` / `WeakPassword`: bad input, nothing written
    /// - `EmailTaken`: the email already has a credential
    /// - `ProfileCreation`: the profile insert failed; the credential was removed
    pub async fn sign_up(&self, mut request: SignUp) -> Result<SignedIn, IdentityError> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        password::validate_password_strength(&request.password)
            .map_err(IdentityError::WeakPassword)?;

        let email = request.email.clone();
        let password_hash = password::hash_password(&request.password)?;

        let credential = self
            .store
            .create_credential(CreateCredential {
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => IdentityError::EmailTaken,
                other => IdentityError::Store(other),
            })?;

        let profile = self
            .store
            .create_profile(CreateProfile {
                id: credential.id,
                email,
                first_name: request.first_name,
                last_name: request.last_name,
                role: request.role,
                department: request.department,
            })
            .await;

        let user = match profile {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id = %credential.id, error = %e, "Profile insert failed, removing credential");
                if let Err(cleanup) = self.store.delete_credential(credential.id).await {
                    error!(
                        user_id = %credential.id,
                        error = %cleanup,
                        "Failed to remove credential after profile insert failure"
                    );
                }
                return Err(IdentityError::ProfileCreation(e.to_string()));
            }
        };

        info!(user_id = %user.id, "User signed up");

        self.open_session(user).await
    }

    /// Verifies credentials, loads the profile and opens a session
    pub async fn sign_in(&self, mut request: SignIn) -> Result<SignedIn, IdentityError> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let credential = self
            .store
            .find_credential_by_email(&request.email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !password::verify_password(&request.password, &credential.password_hash)? {
            debug!(user_id = %credential.id, "Password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        let user = self
            .store
            .find_user(credential.id)
            .await?
            .ok_or(IdentityError::ProfileNotFound)?;

        info!(user_id = %user.id, "User signed in");

        self.open_session(user).await
    }

    /// Revokes the caller's session
    ///
    /// Signing out an already revoked session is not an error.
    pub async fn sign_out(&self, caller: &AuthContext) -> Result<(), IdentityError> {
        let revoked = self.store.revoke_session(caller.session_id).await?;

        info!(
            user_id = %caller.user_id,
            session_id = %caller.session_id,
            revoked,
            "User signed out"
        );

        Ok(())
    }

    /// Resolves an access token to its caller
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when the token is invalid or expired, or its session
    /// is missing, revoked, expired or belongs to another user.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthContext, IdentityError> {
        let claims = jwt::validate_access_token(access_token, &self.settings.jwt_secret)
            .map_err(|e| IdentityError::Unauthenticated(e.to_string()))?;

        self.active_session(&claims).await?;

        Ok(AuthContext::new(claims.sub, claims.sid))
    }

    /// Profile of the token's user, or `None` if the token does not authenticate
    pub async fn current_user(&self, access_token: &str) -> Option<User> {
        let caller = self.authenticate(access_token).await.ok()?;

        match self.store.find_user(caller.user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id = %caller.user_id, error = %e, "Failed to load current user");
                None
            }
        }
    }

    /// Profile of an already authenticated caller
    pub async fn profile(&self, caller: &AuthContext) -> Result<User, IdentityError> {
        self.store
            .find_user(caller.user_id)
            .await?
            .ok_or(IdentityError::ProfileNotFound)
    }

    /// Exchanges a refresh token for a new access token while its session is active
    pub async fn refresh(&self, refresh_token: &str) -> Result<Refreshed, IdentityError> {
        let claims = jwt::validate_refresh_token(refresh_token, &self.settings.jwt_secret)
            .map_err(|e| IdentityError::Unauthenticated(e.to_string()))?;

        let session = self.active_session(&claims).await?;

        let (access_token, expires_in) =
            self.issue(&session, TokenType::Access, self.settings.access_token_ttl)?;

        debug!(user_id = %session.user_id, session_id = %session.id, "Access token refreshed");

        Ok(Refreshed {
            access_token,
            expires_in,
        })
    }

    /// Edits the caller's profile
    pub async fn update_profile(
        &self,
        caller: &AuthContext,
        update: UpdateProfile,
    ) -> Result<User, IdentityError> {
        update.validate()?;

        if update.is_noop() {
            return self.profile(caller).await;
        }

        let user = self
            .store
            .update_profile(caller.user_id, update)
            .await?
            .ok_or(IdentityError::ProfileNotFound)?;

        info!(user_id = %user.id, "Profile updated");

        Ok(user)
    }

    /// Replaces the caller's password after checking the current one
    pub async fn change_password(
        &self,
        caller: &AuthContext,
        request: ChangePassword,
    ) -> Result<(), IdentityError> {
        let credential = self
            .store
            .find_credential(caller.user_id)
            .await?
            .ok_or(IdentityError::ProfileNotFound)?;

        if !password::verify_password(&request.current_password, &credential.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        password::validate_password_strength(&request.new_password)
            .map_err(IdentityError::WeakPassword)?;

        let password_hash = password::hash_password(&request.new_password)?;
        self.store
            .update_password_hash(caller.user_id, &password_hash)
            .await?;

        info!(user_id = %caller.user_id, "Password changed");

        Ok(())
    }

    async fn open_session(&self, user: User) -> Result<SignedIn, IdentityError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.settings.session_ttl)
            .ok_or(IdentityError::SessionTtlOutOfRange)?;
        let session = self.store.create_session(user.id, expires_at).await?;

        let (access_token, expires_in) =
            self.issue(&session, TokenType::Access, self.settings.access_token_ttl)?;
        let (refresh_token, _) =
            self.issue(&session, TokenType::Refresh, self.settings.refresh_token_ttl)?;

        Ok(SignedIn {
            user,
            session_id: session.id,
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// Signs a token that expires no later than its session
    ///
    /// Fails with `Unauthenticated` when less than [`MIN_TOKEN_TTL_SECONDS`] of the session remains.
    fn issue(
        &self,
        session: &Session,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<(String, i64), IdentityError> {
        let remaining = session.expires_at - Utc::now();
        if remaining < Duration::seconds(MIN_TOKEN_TTL_SECONDS) {
            return Err(IdentityError::Unauthenticated(
                "Session is about to expire".to_string(),
            ));
        }
        let ttl = ttl.min(remaining);

        let claims = Claims::with_expiration(session.user_id, session.id, token_type, ttl);
        let token = jwt::create_token(&claims, &self.settings.jwt_secret)?;

        Ok((token, ttl.num_seconds()))
    }

    async fn active_session(&self, claims: &Claims) -> Result<Session, IdentityError> {
        let session = self
            .store
            .find_session(claims.sid)
            .await?
            .ok_or_else(|| IdentityError::Unauthenticated("Unknown session".to_string()))?;

        if session.user_id != claims.sub {
            warn!(session_id = %session.id, "Token subject does not match session owner");
            return Err(IdentityError::Unauthenticated(
                "Session does not belong to token subject".to_string(),
            ));
        }

        if !session.is_active() {
            return Err(IdentityError::Unauthenticated(
                "Session is no longer active".to_string(),
            ));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = IdentitySettings::new("secret");
        assert_eq!(settings.session_ttl, Duration::days(30));
        assert_eq!(settings.access_token_ttl, Duration::hours(24));
        assert_eq!(settings.refresh_token_ttl, Duration::days(30));

        let short = settings.with_session_ttl(Duration::hours(1));
        assert_eq!(short.session_ttl, Duration::hours(1));
    }

    #[test]
    fn test_sign_up_validation() {
        let request = SignUp {
            email: "not-an-email".to_string(),
            password: "Sup3r$ecret".to_string(),
            first_name: String::new(),
            last_name: "Doe".to_string(),
            role: "Designer".to_string(),
            department: "Product".to_string(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("last_name"));
    }
}
