/// JWT token generation and validation
///
/// Access tokens are signed with HS256 (HMAC-SHA256) and carry the user
/// identity as the subject claim. The token is the "opaque bearer
/// credential" of the API: clients obtain one from `POST /v1/auth/token`
/// and present it as `Authorization: Bearer <token>`.
///
/// # Security
///
/// - **Algorithm**: HS256
/// - **Expiration**: 24 hours
/// - **Validation**: signature, expiration and issuer checks
/// - **Secret**: at least 32 bytes, from the `JWT_SECRET` environment variable
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value
const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was not issued by this service
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// Standard claims only; the subject is the authenticated user's ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24h expiration
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::hours(24))
    }

    /// Creates claims with a custom expiration
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if signing fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a JWT and returns its claims
///
/// Checks signature, expiration (with no leeway), not-before and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if past the `exp` claim
/// - `JwtError::InvalidIssuer` if not issued by this service
/// - `JwtError::ValidationError` for any other failure (bad signature,
///   malformed token, ...)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id);

        let token = create_token(&claims, SECRET).unwrap();
        let validated = validate_token(&token, SECRET).unwrap();

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4());
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "a-completely-different-secret-value");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::with_expiration(Uuid::new_v4(), Duration::hours(-1));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4());
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_token("not.a.token", SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_expired() {
        let fresh = Claims::new(Uuid::new_v4());
        assert!(!fresh.is_expired());

        let stale = Claims::with_expiration(Uuid::new_v4(), Duration::seconds(-1));
        assert!(stale.is_expired());
    }
}
