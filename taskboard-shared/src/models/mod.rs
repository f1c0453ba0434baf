/// Database models
///
/// Each module pairs a `sqlx::FromRow` model with its Create/Update input
/// structs and the SQL operations the API layer builds on:
///
/// - `user`: user accounts (read-side; lifecycle owned by the identity service)
/// - `project`: projects, ownership and the membership set
/// - `task`: tasks with status/priority enums and conjunctive list filters
/// - `comment`: task comments

pub mod comment;
pub mod project;
pub mod task;
pub mod user;
