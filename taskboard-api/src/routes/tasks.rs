/// Task endpoints
///
/// Tasks live inside a project. Creating one requires the caller to be the
/// project owner or a member; assignment requires the *target* user to be
/// owner or member. Updating and deleting only require authentication
/// (inherited asymmetry, see `auth::policy`).
///
/// # Endpoints
///
/// - `GET /v1/tasks` - List tasks (filters + search + ordering)
/// - `POST /v1/tasks` - Create a task
/// - `GET /v1/tasks/:id` - Get a task
/// - `PUT/PATCH /v1/tasks/:id` - Partially update a task
/// - `DELETE /v1/tasks/:id` - Delete a task (and its comments)
/// - `POST /v1/tasks/:id/assign_task` - Assign the task to a user

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    routes::{comments::CommentResponse, users::UserResponse, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use taskboard_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        comment::Comment,
        project::Project,
        task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Task with users and comments embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// Assigned user, if any
    pub assigned_to: Option<UserResponse>,

    /// User who created the task
    pub created_by: UserResponse,

    /// Comments on the task, oldest first
    pub comments: Vec<CommentResponse>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    /// Builds the response DTO, resolving users and comments
    pub async fn build(pool: &PgPool, task: Task) -> ApiResult<Self> {
        let assigned_to = match task.assigned_to {
            Some(user_id) => User::find_by_id(pool, user_id)
                .await?
                .map(UserResponse::from),
            None => None,
        };

        let created_by = User::find_by_id(pool, task.created_by)
            .await?
            .ok_or_else(|| ApiError::InternalError("Task creator missing".to_string()))?;

        let raw_comments = Comment::list_by_task(pool, task.id).await?;
        let mut comments = Vec::with_capacity(raw_comments.len());
        for comment in raw_comments {
            comments.push(CommentResponse::build(pool, comment).await?);
        }

        Ok(Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            status: task.status,
            priority: task.priority,
            project_id: task.project_id,
            assigned_to,
            created_by: created_by.into(),
            comments,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }
}

/// Query parameters for listing tasks
///
/// Filter values arrive as raw strings so an unrecognized value (bad UUID,
/// unknown status label) can yield an empty result instead of an error.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Only tasks in this project (UUID)
    pub project: Option<String>,

    /// Only tasks with this status (TODO/IN_PROGRESS/REVIEW/DONE)
    pub status: Option<String>,

    /// Only tasks with this priority (LOW/MEDIUM/HIGH/URGENT)
    pub priority: Option<String>,

    /// Only tasks assigned to this user (UUID)
    pub assigned_to: Option<String>,

    /// Case-insensitive substring over title/description
    pub search: Option<String>,

    /// Sort key (`title`, `created_at`, `due_date`, `status`, `priority`;
    /// `-` prefix for descending). Unknown keys fall back to the default.
    pub ordering: Option<String>,
}

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project the task belongs to
    pub project: Option<Uuid>,

    /// Title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Description (defaults to empty)
    #[serde(default)]
    pub description: String,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Status (defaults to TODO)
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority (defaults to MEDIUM)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional initial assignee
    pub assigned_to: Option<Uuid>,
}

/// Request body for (partially) updating a task
///
/// PUT and PATCH share this handler; absent fields are left untouched.
/// `due_date` and `assigned_to` distinguish "absent" from explicit `null`
/// (which clears the column).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee; `null` unassigns
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Request body for assigning a task
#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    /// Target user
    pub user_id: Option<Uuid>,
}

/// Plain status message response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Human-readable outcome
    pub status: String,
}

/// Distinguishes an absent field from an explicit `null`
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// List tasks
///
/// Filters combine with AND. A filter value that does not parse (bad UUID,
/// unknown status/priority label) matches nothing, so the result is an
/// empty list, never an error.
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks?project=<uuid>&status=TODO&priority=HIGH&ordering=-due_date
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let mut filter = TaskFilter {
        search: query.search.clone(),
        ..Default::default()
    };

    if let Some(raw) = query.project.as_deref() {
        match Uuid::parse_str(raw) {
            Ok(id) => filter.project = Some(id),
            Err(_) => return Ok(Json(vec![])),
        }
    }
    if let Some(raw) = query.status.as_deref() {
        match TaskStatus::parse(raw) {
            Some(status) => filter.status = Some(status),
            None => return Ok(Json(vec![])),
        }
    }
    if let Some(raw) = query.priority.as_deref() {
        match TaskPriority::parse(raw) {
            Some(priority) => filter.priority = Some(priority),
            None => return Ok(Json(vec![])),
        }
    }
    if let Some(raw) = query.assigned_to.as_deref() {
        match Uuid::parse_str(raw) {
            Ok(id) => filter.assigned_to = Some(id),
            Err(_) => return Ok(Json(vec![])),
        }
    }

    let tasks = Task::list(
        &state.db,
        &filter,
        query.ordering.as_deref(),
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        responses.push(TaskResponse::build(&state.db, task).await?);
    }

    Ok(Json(responses))
}

/// Create a task
///
/// The creator is always the acting user; clients cannot set it.
///
/// # Errors
///
/// - `404 Not Found`: `project` missing or unknown
/// - `403 Forbidden`: Caller is neither owner nor member of the project
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate().map_err(validation_error)?;

    let project_id = req
        .project
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let is_member = Project::is_member(&state.db, project.id, auth.user_id).await?;
    if !policy::can_act_on_project(auth.user_id, project.owner_id, is_member) {
        return Err(ApiError::Forbidden(
            "You must be the project owner or a member to create tasks".to_string(),
        ));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: project.id,
            created_by: auth.user_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            priority: req.priority,
            assigned_to: req.assigned_to,
        },
    )
    .await?;

    let response = TaskResponse::build(&state.db, task).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::build(&state.db, task).await?))
}

/// Update a task (PUT and PATCH)
///
/// Only title/description/due_date/status/priority/assigned_to are
/// writable; the project and creator are fixed at creation.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate().map_err(validation_error)?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            status: req.status,
            priority: req.priority,
            assigned_to: req.assigned_to,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::build(&state.db, task).await?))
}

/// Delete a task and its comments
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Assign a task to a user
///
/// The target user must be the project owner or a member.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `user_id`, or target is not owner/member
/// - `404 Not Found`: Unknown task or user
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task's project missing".to_string()))?;

    let is_member = Project::is_member(&state.db, project.id, user.id).await?;
    if !policy::is_assignable(user.id, project.owner_id, is_member) {
        return Err(ApiError::BadRequest(
            "User is not a member of the project".to_string(),
        ));
    }

    Task::assign(&state.db, task.id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(StatusResponse {
        status: "Task assigned successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_absent_vs_null() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.assigned_to.is_none());
        assert!(absent.due_date.is_none());

        let cleared: UpdateTaskRequest =
            serde_json::from_str(r#"{"assigned_to": null, "due_date": null}"#).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"assigned_to": "8c80ed67-556c-46be-b3a7-12e706d1632c"}"#)
                .unwrap();
        assert!(matches!(set.assigned_to, Some(Some(_))));
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"project": "8c80ed67-556c-46be-b3a7-12e706d1632c", "title": "Ship it"}"#,
        )
        .unwrap();

        assert_eq!(req.status, TaskStatus::Todo);
        assert_eq!(req.priority, TaskPriority::Medium);
        assert_eq!(req.description, "");
        assert!(req.assigned_to.is_none());
    }

    #[test]
    fn test_create_request_title_validation() {
        let req = CreateTaskRequest {
            project: Some(Uuid::new_v4()),
            title: "".to_string(),
            description: String::new(),
            due_date: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assigned_to: None,
        };
        assert!(req.validate().is_err());

        let req = CreateTaskRequest {
            title: "x".repeat(201),
            ..req
        };
        assert!(req.validate().is_err());
    }
}
