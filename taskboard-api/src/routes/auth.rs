/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Sign-up and sign-in
/// - Token refresh
/// - Sign-out (revokes the session)
/// - The caller's own profile and password
///
/// # Endpoints
///
/// - `POST /v1/auth/sign-up` - Register and open a session
/// - `POST /v1/auth/sign-in` - Open a session
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
/// - `POST /v1/auth/sign-out` - Revoke the current session
/// - `GET /v1/auth/me` - Current profile
/// - `PATCH /v1/auth/me` - Edit the current profile
/// - `PUT /v1/auth/password` - Change password

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    identity::{ChangePassword, Refreshed, SignIn, SignUp, SignedIn},
    models::user::{UpdateProfile, User},
};

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Sign-out response
#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    /// The revoked session
    pub session_id: String,
}

/// Register a new user
///
/// Creates the credential and profile, then signs the user in.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/sign-up
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "SecureP@ss123",
///   "first_name": "Jane",
///   "last_name": "Doe",
///   "role": "Product Manager",
///   "department": "Product"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "user": { "id": "uuid", "email": "jane@example.com", "first_name": "Jane", ... },
///   "session_id": "uuid",
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "expires_in": 86400
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed or weak password
/// - `500 Internal Server Error`: Server error
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUp>,
) -> ApiResult<(StatusCode, Json<SignedIn>)> {
    let signed_in = state.identity.sign_up(req).await?;

    Ok((StatusCode::CREATED, Json(signed_in)))
}

/// Sign in with email and password
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/sign-in
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// Same shape as sign-up.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `404 Not Found`: Credentials exist but the profile is missing
/// - `422 Unprocessable Entity`: Validation failed
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignIn>,
) -> ApiResult<Json<SignedIn>> {
    Ok(Json(state.identity.sign_in(req).await?))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token while the session it
/// belongs to is still active.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/refresh
/// Content-Type: application/json
///
/// {
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "expires_in": 86400
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or session revoked
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<Refreshed>> {
    Ok(Json(state.identity.refresh(&req.refresh_token).await?))
}

/// Revoke the caller's session
///
/// Access and refresh tokens bound to the session stop working immediately.
pub async fn sign_out(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<SignOutResponse>> {
    state.identity.sign_out(&auth).await?;

    Ok(Json(SignOutResponse {
        session_id: auth.session_id.to_string(),
    }))
}

/// Current user's profile
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    Ok(Json(state.identity.profile(&auth).await?))
}

/// Edit the current user's profile
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/auth/me
/// Content-Type: application/json
///
/// {
///   "department": "Design",
///   "location": "Berlin",
///   "bio": null
/// }
/// ```
///
/// Omitted fields are left unchanged; `null` clears an optional field.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<UpdateProfile>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.identity.update_profile(&auth, req).await?))
}

/// Change the current user's password
///
/// # Endpoint
///
/// ```text
/// PUT /v1/auth/password
/// Content-Type: application/json
///
/// {
///   "current_password": "SecureP@ss123",
///   "new_password": "EvenM0re$ecure"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Current password is wrong
/// - `422 Unprocessable Entity`: New password is too weak
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ChangePassword>,
) -> ApiResult<StatusCode> {
    state.identity.change_password(&auth, req).await?;

    Ok(StatusCode::NO_CONTENT)
}
