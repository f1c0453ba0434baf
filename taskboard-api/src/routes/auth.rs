/// Token issuance endpoint
///
/// Exchanges username/password credentials for a bearer token. Account
/// creation and password management live in the external identity service;
/// this endpoint only verifies stored credentials.
///
/// # Endpoints
///
/// - `POST /v1/auth/token` - Obtain an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password},
    models::user::User,
};

/// Token request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Username (case-insensitive)
    pub username: String,

    /// Password
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token (HS256 JWT, 24h)
    pub token: String,

    /// Authenticated user ID
    pub user_id: String,
}

/// Obtain an access token
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/token
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "s3cret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (identical
///   message for both, so the endpoint does not leak which usernames exist)
/// - `500 Internal Server Error`: Server error
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        token,
        user_id: user.id.to_string(),
    }))
}
