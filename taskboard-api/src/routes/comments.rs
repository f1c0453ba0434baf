/// Comment endpoints
///
/// Comments hang off tasks. Creating a comment requires the caller to be
/// the owner or a member of the task's project; editing and deleting only
/// require authentication (inherited asymmetry, see `auth::policy`).
///
/// # Endpoints
///
/// - `GET /v1/comments` - List comments (optional `task` filter)
/// - `POST /v1/comments` - Create a comment
/// - `GET /v1/comments/:id` - Get a comment
/// - `PUT/PATCH /v1/comments/:id` - Update a comment's text
/// - `DELETE /v1/comments/:id` - Delete a comment

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    routes::{users::UserResponse, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskboard_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        comment::{Comment, CreateComment},
        project::Project,
        task::Task,
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Comment with its author embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    /// Comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author
    pub author: UserResponse,

    /// Comment body
    pub text: String,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    /// Builds the response DTO, resolving the author
    pub async fn build(pool: &PgPool, comment: Comment) -> ApiResult<Self> {
        let author = User::find_by_id(pool, comment.author_id)
            .await?
            .ok_or_else(|| ApiError::InternalError("Comment author missing".to_string()))?;

        Ok(Self {
            id: comment.id,
            task_id: comment.task_id,
            author: author.into(),
            text: comment.text,
            created_at: comment.created_at,
        })
    }
}

/// Query parameters for listing comments
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    /// Only comments on this task (UUID); an unparseable value matches nothing
    pub task: Option<String>,
}

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Task to comment on
    pub task: Option<Uuid>,

    /// Comment body
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// New comment body
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,
}

/// List comments, oldest first
///
/// Without a `task` filter this returns comments across all tasks. A `task`
/// value that is not a valid UUID yields an empty list rather than an error.
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let task_id = match query.task.as_deref() {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return Ok(Json(vec![])),
        },
        None => None,
    };

    let comments = Comment::list(&state.db, task_id, pagination.limit(), pagination.offset())
        .await?;

    let mut responses = Vec::with_capacity(comments.len());
    for comment in comments {
        responses.push(CommentResponse::build(&state.db, comment).await?);
    }

    Ok(Json(responses))
}

/// Create a comment
///
/// The author is always the acting user.
///
/// # Errors
///
/// - `404 Not Found`: Task missing or unknown
/// - `403 Forbidden`: Caller is neither owner nor member of the task's project
/// - `422 Unprocessable Entity`: Empty text
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    req.validate().map_err(validation_error)?;

    let task_id = req
        .task
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task's project missing".to_string()))?;

    let is_member = Project::is_member(&state.db, project.id, auth.user_id).await?;
    if !policy::can_act_on_project(auth.user_id, project.owner_id, is_member) {
        return Err(ApiError::Forbidden(
            "You must be the project owner or a member to comment".to_string(),
        ));
    }

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: task.id,
            author_id: auth.user_id,
            text: req.text,
        },
    )
    .await?;

    let response = CommentResponse::build(&state.db, comment).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single comment
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommentResponse>> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(CommentResponse::build(&state.db, comment).await?))
}

/// Update a comment's text
///
/// Only the body is writable; task and author are fixed at creation.
pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    req.validate().map_err(validation_error)?;

    let comment = Comment::update_text(&state.db, id, req.text)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(CommentResponse::build(&state.db, comment).await?))
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Comment::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
