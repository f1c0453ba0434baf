/// Comment model and database operations
///
/// Comments hang off a task and record their author. Deleting the task or
/// the author removes the comment.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     text TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, task_id, author_id, text, created_at";

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author; set by the server to the acting user
    pub author_id: Uuid,

    /// Comment body
    pub text: String,

    /// When the comment was created (server time)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author (the acting user)
    pub author_id: Uuid,

    /// Comment body
    pub text: String,
}

impl Comment {
    /// Creates a new comment
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (task_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.text)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists comments, optionally scoped to one task, oldest first
    ///
    /// Without a task filter this returns comments across all tasks.
    pub async fn list(
        pool: &PgPool,
        task_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let comments = match task_id {
            Some(task_id) => {
                sqlx::query_as::<_, Comment>(&format!(
                    r#"
                    SELECT {COMMENT_COLUMNS}
                    FROM comments
                    WHERE task_id = $1
                    ORDER BY created_at ASC
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(task_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Comment>(&format!(
                    r#"
                    SELECT {COMMENT_COLUMNS}
                    FROM comments
                    ORDER BY created_at ASC
                    LIMIT $1 OFFSET $2
                    "#,
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(comments)
    }

    /// Lists all comments on a task, oldest first
    ///
    /// Used when embedding a task's comments in its response payload.
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Updates the comment body
    pub async fn update_text(
        pool: &PgPool,
        id: Uuid,
        text: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET text = $2
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(text)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
