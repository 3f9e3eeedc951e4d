/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; every shared-library error
/// converts into it with `?`.
///
/// Access-layer results arrive as [`Outcome`]s. [`found`] turns an `Empty`
/// single-item outcome into a 404, [`items`] turns an `Empty` list outcome
/// into an empty list.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::error::{found, ApiResult};
/// use taskboard_shared::access::AccessLayer;
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::models::task::Task;
/// use axum::Json;
/// use uuid::Uuid;
///
/// async fn handler(access: AccessLayer, auth: AuthContext, id: Uuid) -> ApiResult<Json<Task>> {
///     let task = found(access.get_task(&auth, id).await, "Task")?;
///     Ok(Json(task))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::{
    access::AccessError, auth::middleware::AuthError, error::StoreError,
    identity::IdentityError, outcome::Outcome,
};
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email or membership
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String, Option<Vec<ValidationErrorDetail>>) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Flattens validator errors into per-field details, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Unwraps a single-item outcome; `Empty` becomes a 404 naming `what`
pub fn found<T>(outcome: Outcome<T>, what: &str) -> ApiResult<T> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::Empty => Err(ApiError::NotFound(format!("{} not found", what))),
        Outcome::Failed(err) => Err(err.into()),
    }
}

/// Unwraps a list outcome; `Empty` becomes an empty list
pub fn items<T>(outcome: Outcome<Vec<T>>) -> ApiResult<Vec<T>> {
    Ok(outcome.into_items()?)
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::ValidationError(validation_details(&err))
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(constraint) => {
                if constraint.contains("email") {
                    return ApiError::Conflict("Email already exists".to_string());
                }
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            StoreError::MissingReference(constraint) => {
                ApiError::NotFound(format!("Referenced resource not found ({})", constraint))
            }
            StoreError::Decode(_) | StoreError::Backend(_) => {
                ApiError::InternalError(format!("Database error: {}", err))
            }
        }
    }
}

/// Convert access-layer errors to API errors
impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden(msg) => ApiError::Forbidden(msg),
            AccessError::NotFound(msg) => ApiError::NotFound(msg),
            AccessError::Conflict(msg) => ApiError::Conflict(msg),
            AccessError::Validation(errors) => errors.into(),
            AccessError::Store(err) => err.into(),
        }
    }
}

/// Convert identity errors to API errors
impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken => ApiError::Conflict("Email already exists".to_string()),
            IdentityError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            IdentityError::Unauthenticated(msg) => ApiError::Unauthorized(msg),
            IdentityError::ProfileNotFound => {
                ApiError::NotFound("User profile not found".to_string())
            }
            IdentityError::WeakPassword(message) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message,
                }])
            }
            IdentityError::Validation(errors) => errors.into(),
            IdentityError::Store(err) => err.into(),
            IdentityError::ProfileCreation(_)
            | IdentityError::SessionTtlOutOfRange
            | IdentityError::Password(_)
            | IdentityError::Jwt(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
        }
    }
}
