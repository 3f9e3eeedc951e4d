/// Caller identity for Axum handlers
///
/// The API's authentication layer validates the bearer token and its session,
/// then inserts an [`AuthContext`] into the request extensions. Handlers take
/// `AuthContext` as an extractor; every access-layer call is made on behalf of
/// that explicit caller.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("user {} via session {}", auth.user_id, auth.session_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Session the presented token belongs to
    pub session_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid, session_id: Uuid) -> Self {
        Self {
            user_id,
            session_id,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::InvalidFormat(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };

        let body = serde_json::json!({
            "error": error,
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
