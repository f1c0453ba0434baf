/// Project model, ownership and membership operations
///
/// A project has exactly one owner (the creating user) and a set of member
/// users. The owner is always authorized for project writes even when not
/// present in the membership set. Tasks belong to projects and are removed
/// with them; membership mutations are single atomic statements so
/// concurrent add/remove calls cannot lose updates.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description (empty string when unset)
    pub description: String,

    /// Owning user; set at creation, never reassigned through updates
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
///
/// The owner is not part of the input; it is always the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Description (defaults to empty)
    #[serde(default)]
    pub description: String,
}

/// Input for updating a project
///
/// Only non-None fields are written. Owner and timestamps are never
/// client-writable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Maps a client-supplied ordering key to a whitelisted ORDER BY clause
///
/// Unknown keys fall back to newest-first, mirroring how unrecognized
/// ordering is ignored rather than rejected.
fn order_clause(ordering: Option<&str>) -> &'static str {
    match ordering {
        Some("name") => "name ASC",
        Some("-name") => "name DESC",
        Some("created_at") => "created_at ASC",
        Some("-created_at") => "created_at DESC",
        _ => "created_at DESC",
    }
}

impl Project {
    /// Creates a new project owned by `owner_id` with an empty member set
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects with optional search, ordering and pagination
    ///
    /// The search term matches name and description (case-insensitive
    /// substring). Ordering accepts `name`/`created_at` with a `-` prefix
    /// for descending.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        ordering: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let order = order_clause(ordering);

        let projects = match search {
            Some(term) => {
                sqlx::query_as::<_, Project>(&format!(
                    r#"
                    SELECT {PROJECT_COLUMNS}
                    FROM projects
                    WHERE name ILIKE $1 OR description ILIKE $1
                    ORDER BY {order}
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(format!("%{}%", term))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Project>(&format!(
                    r#"
                    SELECT {PROJECT_COLUMNS}
                    FROM projects
                    ORDER BY {order}
                    LIMIT $1 OFFSET $2
                    "#,
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(projects)
    }

    /// Updates a project
    ///
    /// Only non-None fields are written; `updated_at` is bumped. The whole
    /// update is a single statement, so multi-field updates apply
    /// all-or-nothing.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project and everything under it
    ///
    /// Fans out in one transaction: comments on the project's tasks, then
    /// the tasks, then the membership rows, then the project itself. The
    /// schema also declares ON DELETE CASCADE, but the service layer does
    /// not rely on store-level cascades.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a user to the project's member set
    ///
    /// Atomic set-add: adding an existing member is a no-op, and concurrent
    /// adds cannot lose each other's writes.
    pub async fn add_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a user from the project's member set
    ///
    /// Removing a non-member is a no-op.
    pub async fn remove_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Checks whether a user is in the project's member set
    ///
    /// Note this is the membership set only; the owner is authorized
    /// separately (see `auth::policy`).
    pub async fn is_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the project's members in join order
    pub async fn members(pool: &PgPool, project_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let members = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.password_hash, u.created_at, u.updated_at, u.last_login_at
            FROM users u
            INNER JOIN project_members pm ON pm.user_id = u.id
            WHERE pm.project_id = $1
            ORDER BY pm.added_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts total number of projects
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_default_description() {
        let data: CreateProject = serde_json::from_str(r#"{"name": "Apollo"}"#).unwrap();
        assert_eq!(data.name, "Apollo");
        assert_eq!(data.description, "");
    }

    #[test]
    fn test_update_project_default() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_order_clause_whitelist() {
        assert_eq!(order_clause(Some("name")), "name ASC");
        assert_eq!(order_clause(Some("-name")), "name DESC");
        assert_eq!(order_clause(Some("created_at")), "created_at ASC");
        assert_eq!(order_clause(Some("-created_at")), "created_at DESC");
        // Unknown keys fall back to the default instead of erroring
        assert_eq!(order_clause(Some("owner_id")), "created_at DESC");
        assert_eq!(order_clause(Some("; DROP TABLE projects")), "created_at DESC");
        assert_eq!(order_clause(None), "created_at DESC");
    }
}
