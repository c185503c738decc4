//! Authentication API handlers.
//!
//! Login and refresh bind the session to a device fingerprint: the hex
//! SHA-256 of the `User-Agent` header.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3000/api/auth/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "mario.rossi", "password": "password123", "name": "Mario", "surname": "Rossi"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:3000/api/auth/signin \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "mario.rossi", "password": "password123"}'
//! ```

use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use courtside::auth::{AuthError, LoginRequest, RegisterRequest, User, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use super::{
    ApiError, AppState, auth_error, error_response, extract::ApiJson, request_id::RequestId,
};
use crate::{logging::log_security_event, metrics};

#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Hex SHA-256 of the `User-Agent` header (empty when absent)
pub fn device_fingerprint(headers: &HeaderMap) -> String {
    let user_agent = headers
        .get(USER_AGENT)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    hex::encode(Sha256::digest(user_agent))
}

/// Register a new user account.
///
/// # Response
///
/// `201 Created` with `{ "message": "User created" }`.
///
/// # Errors
///
/// - `400 Bad Request`: invalid username or weak password
/// - `409 Conflict`: username already taken
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = RegisterRequest {
        username: payload.username,
        password: payload.password,
        name: payload.name,
        surname: payload.surname,
    };

    state
        .auth_manager
        .register(request)
        .await
        .map_err(auth_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "message": "User created" }))))
}

/// Authenticate a user and issue tokens.
///
/// # Response
///
/// ```json
/// { "token": "eyJhbGciOi...", "refreshToken": "6f1c...", "user": { "id": 1, "username": "mario.rossi", ... } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown user or wrong password
pub async fn signin(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<SigninPayload>,
) -> Result<Json<SigninResponse>, ApiError> {
    let request = LoginRequest {
        username: payload.username,
        password: payload.password,
    };

    match state
        .auth_manager
        .login(request, device_fingerprint(&headers))
        .await
    {
        Ok((user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(SigninResponse {
                token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                user,
            }))
        }
        Err(e @ (AuthError::UserNotFound | AuthError::InvalidPassword)) => {
            metrics::login_attempts_total(false);
            log_security_event("failed_login", None, Some(request_id.as_str()), &e.to_string());
            Err(error_response(StatusCode::BAD_REQUEST, e.client_message()))
        }
        Err(e) => Err(auth_error(e)),
    }
}

/// Exchange a refresh token for a new token pair.
///
/// The presented token is consumed; the device fingerprint must match the
/// one recorded at login.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown, reused, expired or foreign-device token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = state
        .auth_manager
        .refresh_token(payload.refresh_token, device_fingerprint(&headers))
        .await
        .map_err(auth_error)?;

    Ok(Json(TokenResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// Invalidate a refresh token. Access tokens stay valid until they expire.
///
/// Returns `204 No Content`.
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_manager
        .logout(payload.refresh_token)
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public profile of the authenticated user
pub async fn whoami(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .auth_manager
        .get_user(user_id)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}
