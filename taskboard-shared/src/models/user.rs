/// User model and database operations
///
/// Users are referenced by projects (owner, members), tasks (assignee,
/// creator) and comments (author). Account lifecycle belongs to the external
/// identity service; this crate only reads user records and verifies
/// credentials at login. `User::create` exists for seeding and tests, there
/// is no HTTP write surface for users.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username CITEXT NOT NULL UNIQUE,
///     email VARCHAR(254) NOT NULL,
///     first_name VARCHAR(150) NOT NULL DEFAULT '',
///     last_name VARCHAR(150) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
                            created_at, updated_at, last_login_at";

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the
/// hash must never be serialized into API responses (response DTOs carry
/// the public fields only).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Unique username (case-insensitive via CITEXT)
    pub username: String,

    /// Email address
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a user record (seeding/tests only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Unique username
    pub username: String,

    /// Email address
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash (NOT a plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Creates a new user record
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint)
    /// or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (case-insensitive via CITEXT)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users with optional free-text search and pagination
    ///
    /// The search term matches username, email and both name fields
    /// (case-insensitive substring).
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = match search {
            Some(term) => {
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    WHERE username ILIKE $1 OR email ILIKE $1
                       OR first_name ILIKE $1 OR last_name ILIKE $1
                    ORDER BY username ASC
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
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS}
                    FROM users
                    ORDER BY username ASC
                    LIMIT $1 OFFSET $2
                    "#,
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
