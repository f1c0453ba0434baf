/// Task model and database operations
///
/// Tasks belong to exactly one project, carry workflow status and priority,
/// and may be assigned to a single user who must be the project owner or a
/// member (enforced at the service layer, see `auth::policy`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'REVIEW', 'DONE');
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH', 'URGENT');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     due_date TIMESTAMPTZ,
///     status task_status NOT NULL DEFAULT 'TODO',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting the assigned user clears `assigned_to`; deleting the creator or
/// the project removes the task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, due_date, status, priority, \
                            project_id, assigned_to, created_by, created_at, updated_at";

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet (default for new tasks)
    Todo,

    /// Someone is working on it
    InProgress,

    /// Waiting for review
    Review,

    /// Finished
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl TaskStatus {
    /// Converts status to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    /// Parses a wire label; unknown labels yield None
    ///
    /// List filters treat unknown labels as matching nothing, so parsing
    /// is deliberately non-failing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "REVIEW" => Some(TaskStatus::Review),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    /// Converts priority to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    /// Parses a wire label; unknown labels yield None
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(TaskPriority::Low),
            "MEDIUM" => Some(TaskPriority::Medium),
            "HIGH" => Some(TaskPriority::High),
            "URGENT" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description (empty string when unset)
    pub description: String,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Project this task belongs to (immutable after creation)
    pub project_id: Uuid,

    /// Assigned user, if any (cleared when that user is deleted)
    pub assigned_to: Option<Uuid>,

    /// User who created the task; set by the server, never client-writable
    pub created_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Creator (the acting user)
    pub created_by: Uuid,

    /// Task title
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

/// Input for updating a task
///
/// Only non-None fields are written. `due_date` and `assigned_to` are
/// nullable columns, hence the nested Option (use `Some(None)` to clear).
/// The owning project and the creator are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline (use Some(None) to clear)
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee (use Some(None) to unassign)
    pub assigned_to: Option<Option<Uuid>>,
}

/// Filters for listing tasks
///
/// All filters are optional and combine conjunctively (AND).
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks in this project
    pub project: Option<Uuid>,

    /// Only tasks with this status
    pub status: Option<TaskStatus>,

    /// Only tasks with this priority
    pub priority: Option<TaskPriority>,

    /// Only tasks assigned to this user
    pub assigned_to: Option<Uuid>,

    /// Case-insensitive substring match on title/description
    pub search: Option<String>,
}

/// Maps a client-supplied ordering key to a whitelisted ORDER BY clause
fn order_clause(ordering: Option<&str>) -> &'static str {
    match ordering {
        Some("title") => "title ASC",
        Some("-title") => "title DESC",
        Some("created_at") => "created_at ASC",
        Some("-created_at") => "created_at DESC",
        Some("due_date") => "due_date ASC",
        Some("-due_date") => "due_date DESC",
        Some("status") => "status ASC",
        Some("-status") => "status DESC",
        Some("priority") => "priority ASC",
        Some("-priority") => "priority DESC",
        _ => "created_at DESC",
    }
}

impl Task {
    /// Creates a new task
    ///
    /// Membership of the creator in the target project is checked at the
    /// service layer before this is called.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, due_date, status, priority,
                               project_id, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.project_id)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching the filter, with ordering and pagination
    ///
    /// Filters compose with AND. The WHERE clause is built dynamically but
    /// every value goes through a bind parameter; only the whitelisted
    /// ORDER BY fragment is interpolated.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        ordering: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE TRUE");
        let mut bind_count = 0;

        if filter.project.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND project_id = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority = ${}", bind_count));
        }
        if filter.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assigned_to = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                bind_count
            ));
        }

        query.push_str(&format!(
            " ORDER BY {} LIMIT ${} OFFSET ${}",
            order_clause(ordering),
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Task>(&query);

        if let Some(project) = filter.project {
            q = q.bind(project);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = filter.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }

        let tasks = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Lists all tasks in a project, oldest first
    ///
    /// Used when embedding a project's tasks in its response payload.
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task
    ///
    /// Only non-None fields are written; `updated_at` is bumped. A single
    /// statement, so multi-field updates apply all-or-nothing.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Assigns the task to a user
    ///
    /// The caller is responsible for checking the target user is the
    /// project owner or a member before calling this.
    pub async fn assign(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task and its comments
    ///
    /// Explicit transactional fan-out, same rationale as `Project::delete`.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks in a project
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
