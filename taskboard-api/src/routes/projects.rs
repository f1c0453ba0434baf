/// Project endpoints
///
/// Projects are owned by the creating user and carry a member set. Owner
/// writes (update/delete) are owner-only; membership mutations are open to
/// any authenticated caller (inherited behavior, see `auth::policy`).
///
/// # Endpoints
///
/// - `GET /v1/projects` - List projects (search + ordering + pagination)
/// - `POST /v1/projects` - Create a project
/// - `GET /v1/projects/:id` - Get a project
/// - `PUT/PATCH /v1/projects/:id` - Partially update a project (owner only)
/// - `DELETE /v1/projects/:id` - Delete a project and everything under it (owner only)
/// - `POST /v1/projects/:id/add_member` - Add a user to the member set
/// - `POST /v1/projects/:id/remove_member` - Remove a user from the member set

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    routes::{tasks::TaskResponse, users::UserResponse, Pagination},
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
        project::{CreateProject, Project, UpdateProject},
        task::Task,
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Project with owner, members and tasks embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    /// Project ID
    pub id: Uuid,

    /// Name
    pub name: String,

    /// Description
    pub description: String,

    /// Owning user
    pub owner: UserResponse,

    /// Member set, in join order
    pub members: Vec<UserResponse>,

    /// Tasks in the project, oldest first (comments included)
    pub tasks: Vec<TaskResponse>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    /// Builds the response DTO, resolving owner, members and tasks
    pub async fn build(pool: &PgPool, project: Project) -> ApiResult<Self> {
        let owner = User::find_by_id(pool, project.owner_id)
            .await?
            .ok_or_else(|| ApiError::InternalError("Project owner missing".to_string()))?;

        let members = Project::members(pool, project.id)
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect();

        let raw_tasks = Task::list_by_project(pool, project.id).await?;
        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for task in raw_tasks {
            tasks.push(TaskResponse::build(pool, task).await?);
        }

        Ok(Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner: owner.into(),
            members,
            tasks,
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }
}

/// Query parameters for listing projects
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Case-insensitive substring over name/description
    pub search: Option<String>,

    /// Sort key (`name`, `created_at`; `-` prefix for descending).
    /// Unknown keys fall back to the default.
    pub ordering: Option<String>,
}

/// Request body for creating a project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Description (defaults to empty)
    #[serde(default)]
    pub description: String,
}

/// Request body for (partially) updating a project
///
/// PUT and PATCH share this handler; absent fields are left untouched.
/// The owner is never client-writable.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Request body for membership mutations
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    /// Target user
    pub user_id: Option<Uuid>,
}

/// Plain status message response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Human-readable outcome
    pub status: String,
}

/// List projects
///
/// # Endpoint
///
/// ```text
/// GET /v1/projects?search=apollo&ordering=-created_at&limit=20
/// ```
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list(
        &state.db,
        query.search.as_deref(),
        query.ordering.as_deref(),
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        responses.push(ProjectResponse::build(&state.db, project).await?);
    }

    Ok(Json(responses))
}

/// Create a project
///
/// The owner is always the acting user; clients cannot set it. The member
/// set starts empty (the owner is authorized without being a member).
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    req.validate().map_err(validation_error)?;

    let project = Project::create(
        &state.db,
        auth.user_id,
        CreateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    let response = ProjectResponse::build(&state.db, project).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single project
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse::build(&state.db, project).await?))
}

/// Update a project (PUT and PATCH)
///
/// Owner only; members cannot modify the project itself.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Unknown project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate().map_err(validation_error)?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !policy::can_write(auth.user_id, project.owner_id) {
        return Err(ApiError::Forbidden(
            "Only the project owner can modify the project".to_string(),
        ));
    }

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse::build(&state.db, project).await?))
}

/// Delete a project and everything under it
///
/// Owner only. Removes the project's comments, tasks and membership rows
/// in one transaction, then the project itself.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !policy::can_write(auth.user_id, project.owner_id) {
        return Err(ApiError::Forbidden(
            "Only the project owner can delete the project".to_string(),
        ));
    }

    Project::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to the project's member set
///
/// Adding an existing member is a no-op (atomic set-add).
///
/// # Errors
///
/// - `400 Bad Request`: Missing `user_id`
/// - `404 Not Found`: Unknown project or user
pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Project::add_member(&state.db, project.id, user.id).await?;

    Ok(Json(StatusResponse {
        status: "User added to project".to_string(),
    }))
}

/// Remove a user from the project's member set
///
/// Removing a non-member is a no-op (atomic keyed delete).
///
/// # Errors
///
/// - `400 Bad Request`: Missing `user_id`
/// - `404 Not Found`: Unknown project or user
pub async fn remove_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Project::remove_member(&state.db, project.id, user.id).await?;

    Ok(Json(StatusResponse {
        status: "User removed from project".to_string(),
    }))
}
