/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Logout
///
/// # Endpoints
///
/// - `POST /register` - Register new user
/// - `POST /login` - Login and get a bearer token
/// - `POST /logout` - Acknowledge logout (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username (unique across all users)
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    /// Password (stored only as an Argon2id hash)
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login request
///
/// Not validated for emptiness: an unknown or empty username fails the
/// credential check and surfaces as the same 401 as a wrong password.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token, valid for one hour
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "registered"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty fields, or username already taken
/// - `500 Internal Server Error`: hashing or database failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    // Unique constraint on username backstops the race between this
    // check and the insert
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username already taken".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
        },
    )
    .await?;

    Ok(Json(MessageResponse::new("registered")))
}

/// Login and receive a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password, never
///   distinguished in the response
/// - `500 Internal Server Error`: hashing or database failure
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;

    // Find user by username
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.tokens.issue(user.id)?;

    Ok(Json(LoginResponse { token }))
}

/// Logout acknowledgement
///
/// Tokens are stateless and expire on their own; there is no server-side
/// session to destroy. Clients discard the token after calling this.
pub async fn logout() -> ApiResult<Json<MessageResponse>> {
    Ok(Json(MessageResponse::new("logged out")))
}
