/// Authorization policy
///
/// The complete write-access rules of the system, as pure functions so they
/// can be tested without a database. Handlers look up the facts (owner id,
/// membership) and these functions make the decision.
///
/// The model is deliberately simple:
///
/// - Reads are public to any authenticated user; there is no per-row
///   visibility restriction anywhere.
/// - Project update/delete is owner-only.
/// - Creating a task or comment under a project requires the acting user
///   to be the project owner or a member.
/// - Assigning a task requires the *target* user to be owner or member.
/// - Task and comment update/delete only require authentication. This
///   asymmetry with project writes is inherited behavior and preserved
///   on purpose (see DESIGN.md).
///
/// Decisions are evaluated fresh on every mutating call; nothing here is
/// cached.

use uuid::Uuid;

/// Whether `user_id` may update or delete a project owned by `owner_id`
///
/// Owner-only. Members do not get project-level write access.
pub fn can_write(user_id: Uuid, owner_id: Uuid) -> bool {
    user_id == owner_id
}

/// Whether `user_id` may act within a project (create tasks/comments)
///
/// True for the owner (even when not in the membership set) and for
/// members.
pub fn can_act_on_project(user_id: Uuid, owner_id: Uuid, is_member: bool) -> bool {
    user_id == owner_id || is_member
}

/// Whether `user_id` is a valid assignee for a task in the project
///
/// Same owner-or-member test as `can_act_on_project`, but applied to the
/// assignment target rather than the acting user.
pub fn is_assignable(user_id: Uuid, owner_id: Uuid, is_member: bool) -> bool {
    can_act_on_project(user_id, owner_id, is_member)
}
