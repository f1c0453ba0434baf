/// API route handlers
///
/// Route modules:
/// - `health`: Health check endpoint
/// - `auth`: Token issuance
/// - `users`: Read-only user directory
/// - `projects`: Projects and membership management
/// - `tasks`: Tasks and assignment
/// - `comments`: Comments on tasks

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use serde::Deserialize;

/// Common pagination query parameters
///
/// Defaults to the first 50 rows; `limit` is clamped to 1..=100.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// Maximum number of rows to return
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub offset: Option<i64>,
}

impl Pagination {
    /// Effective limit, clamped to a sane range
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    /// Effective offset (never negative)
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
