/// User directory endpoints (read-only)
///
/// Users are managed by the external identity service; this API only exposes
/// lookups so clients can resolve owners, members, assignees and authors.
///
/// # Endpoints
///
/// - `GET /v1/users` - List users (search + pagination)
/// - `GET /v1/users/:id` - Get a single user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::user::User;
use uuid::Uuid;

/// Public view of a user
///
/// Deliberately excludes `password_hash` and the server-side timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Case-insensitive substring over username/email/first/last names
    pub search: Option<String>,
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /v1/users?search=ali&limit=20&offset=0
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list(
        &state.db,
        query.search.as_deref(),
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a single user
///
/// # Errors
///
/// - `404 Not Found`: No user with that ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
