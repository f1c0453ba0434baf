/// Authentication and authorization
///
/// - `jwt`: access-token creation and validation (HS256)
/// - `password`: Argon2id password hashing and verification
/// - `middleware`: bearer-token extraction for axum handlers
/// - `policy`: the pure ownership/membership authorization rules

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
