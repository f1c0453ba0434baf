/// End-to-end API tests
///
/// These exercise the full stack (router, auth middleware, policy, SQL)
/// against a real PostgreSQL, so they are `#[ignore]`d; run them with
///
/// ```bash
/// DATABASE_URL=... JWT_SECRET=... cargo test -p taskboard-api -- --ignored
/// ```

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
#[ignore]
async fn test_project_crud_and_ownership() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);
    let member_token = ctx.auth_header(&ctx.member);

    // Create: owner is the caller, members start empty
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Apollo", "description": "Moonshot"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner"]["id"], ctx.owner.id.to_string());
    assert_eq!(body["members"], json!([]));
    assert!(body.get("password_hash").is_none());

    let project_id = body["id"].as_str().unwrap().to_string();
    let project_uri = format!("/v1/projects/{}", project_id);

    // Non-owner cannot update
    let (status, _) = ctx
        .send(
            "PATCH",
            &project_uri,
            Some(&member_token),
            Some(json!({"name": "Hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner partial update leaves other fields intact
    let (status, body) = ctx
        .send(
            "PATCH",
            &project_uri,
            Some(&owner_token),
            Some(json!({"name": "Apollo 11"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apollo 11");
    assert_eq!(body["description"], "Moonshot");

    // Non-owner cannot delete
    let (status, _) = ctx
        .send("DELETE", &project_uri, Some(&member_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner can
    let (status, _) = ctx
        .send("DELETE", &project_uri, Some(&owner_token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send("GET", &project_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_membership_gates_task_creation() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);
    let outsider_token = ctx.auth_header(&ctx.outsider);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Gatekeeping"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    // Outsider cannot create tasks
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&outsider_token),
            Some(json!({"project": project_id, "title": "Sneak in"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner can, without being in the member set
    let (status, task) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&owner_token),
            Some(json!({"project": project_id, "title": "Owner task"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["created_by"]["id"], ctx.owner.id.to_string());
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["priority"], "MEDIUM");

    // Add the outsider; they gain task-create rights
    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/projects/{}/add_member", project_id),
            Some(&owner_token),
            Some(json!({"user_id": ctx.outsider.id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "User added to project");

    let (status, task) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&outsider_token),
            Some(json!({"project": project_id, "title": "Member task"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["created_by"]["id"], ctx.outsider.id.to_string());

    // Remove them again; rights are gone
    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/projects/{}/remove_member", project_id),
            Some(&owner_token),
            Some(json!({"user_id": ctx.outsider.id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "User removed from project");

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&outsider_token),
            Some(json!({"project": project_id, "title": "Locked out"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_membership_error_cases() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Edge cases"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    // Missing user_id
    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/projects/{}/add_member", project_id),
            Some(&owner_token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User ID is required");

    // Unknown user
    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/projects/{}/add_member", project_id),
            Some(&owner_token),
            Some(json!({"user_id": uuid::Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    // Unknown project
    let (status, _) = ctx
        .send(
            "POST",
            &format!("/v1/projects/{}/add_member", uuid::Uuid::new_v4()),
            Some(&owner_token),
            Some(json!({"user_id": ctx.member.id})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Adding twice is a no-op, not an error
    for _ in 0..2 {
        let (status, _) = ctx
            .send(
                "POST",
                &format!("/v1/projects/{}/add_member", project_id),
                Some(&owner_token),
                Some(json!({"user_id": ctx.member.id})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_assign_task_requires_target_membership() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Assignments"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, task) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&owner_token),
            Some(json!({"project": project_id, "title": "Handoff"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();
    let assign_uri = format!("/v1/tasks/{}/assign_task", task_id);

    // Target not in the project
    let (status, body) = ctx
        .send(
            "POST",
            &assign_uri,
            Some(&owner_token),
            Some(json!({"user_id": ctx.outsider.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User is not a member of the project");

    // Unknown target
    let (status, _) = ctx
        .send(
            "POST",
            &assign_uri,
            Some(&owner_token),
            Some(json!({"user_id": uuid::Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner is always assignable, even with an empty member set
    let (status, body) = ctx
        .send(
            "POST",
            &assign_uri,
            Some(&owner_token),
            Some(json!({"user_id": ctx.owner.id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Task assigned successfully");

    // A member becomes assignable after add_member
    ctx.send(
        "POST",
        &format!("/v1/projects/{}/add_member", project_id),
        Some(&owner_token),
        Some(json!({"user_id": ctx.member.id})),
    )
    .await;

    let (status, _) = ctx
        .send(
            "POST",
            &assign_uri,
            Some(&owner_token),
            Some(json!({"user_id": ctx.member.id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, task) = ctx
        .send(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(task["assigned_to"]["id"], ctx.member.id.to_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_project_delete_cascades() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Doomed"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, task) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&owner_token),
            Some(json!({"project": project_id, "title": "Doomed task"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (_, comment) = ctx
        .send(
            "POST",
            "/v1/comments",
            Some(&owner_token),
            Some(json!({"task": task_id, "text": "Doomed comment"})),
        )
        .await;
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/v1/projects/{}", project_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Everything underneath is gone
    let (status, _) = ctx
        .send(
            "GET",
            &format!("/v1/tasks/{}", task_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(
            "GET",
            &format!("/v1/comments/{}", comment_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_task_filters_combine_with_and() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Filtering"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    for (title, status, priority) in [
        ("alpha", "TODO", "HIGH"),
        ("beta", "TODO", "LOW"),
        ("gamma", "DONE", "HIGH"),
    ] {
        let (code, _) = ctx
            .send(
                "POST",
                "/v1/tasks",
                Some(&owner_token),
                Some(json!({
                    "project": project_id,
                    "title": title,
                    "status": status,
                    "priority": priority,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    // Conjunctive: project AND status AND priority
    let (status, body) = ctx
        .send(
            "GET",
            &format!(
                "/v1/tasks?project={}&status=TODO&priority=HIGH",
                project_id
            ),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "alpha");

    // Unknown status label matches nothing
    let (status, body) = ctx
        .send(
            "GET",
            &format!("/v1/tasks?project={}&status=BOGUS", project_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Ordering by title
    let (_, body) = ctx
        .send(
            "GET",
            &format!("/v1/tasks?project={}&ordering=title", project_id),
            Some(&owner_token),
            None,
        )
        .await;
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["alpha", "beta", "gamma"]);

    // Unknown ordering key is ignored, not an error
    let (status, _) = ctx
        .send(
            "GET",
            &format!("/v1/tasks?project={}&ordering=bogus", project_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_comment_authorization_and_updates() {
    let ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.auth_header(&ctx.owner);
    let outsider_token = ctx.auth_header(&ctx.outsider);

    let (_, project) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Discussion"})),
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, task) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(&owner_token),
            Some(json!({"project": project_id, "title": "Talk about it"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Outsider cannot comment
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/comments",
            Some(&outsider_token),
            Some(json!({"task": task_id, "text": "Drive-by"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner can; author is the caller
    let (status, comment) = ctx
        .send(
            "POST",
            "/v1/comments",
            Some(&owner_token),
            Some(json!({"task": task_id, "text": "First!"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"]["id"], ctx.owner.id.to_string());
    let comment_id = comment["id"].as_str().unwrap().to_string();

    // Updates only require authentication (inherited asymmetry)
    let (status, updated) = ctx
        .send(
            "PATCH",
            &format!("/v1/comments/{}", comment_id),
            Some(&outsider_token),
            Some(json!({"text": "Edited by someone else"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "Edited by someone else");

    // Task-scoped listing
    let (status, body) = ctx
        .send(
            "GET",
            &format!("/v1/comments?task={}", task_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_token_endpoint() {
    let ctx = TestContext::new().await.unwrap();

    // Good credentials
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/token",
            None,
            Some(json!({
                "username": ctx.owner.username,
                "password": common::TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], ctx.owner.id.to_string());
    let token = format!("Bearer {}", body["token"].as_str().unwrap());

    // The issued token works
    let (status, user) = ctx
        .send(
            "GET",
            &format!("/v1/users/{}", ctx.owner.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], ctx.owner.username);
    assert!(user.get("password_hash").is_none());

    // Wrong password
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/token",
            None,
            Some(json!({
                "username": ctx.owner.username,
                "password": "wrong",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown username gets the same error shape
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/token",
            None,
            Some(json!({
                "username": "no-such-user",
                "password": common::TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_user_directory_search() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.auth_header(&ctx.owner);

    let (status, body) = ctx
        .send(
            "GET",
            &format!("/v1/users?search={}", ctx.member.username),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], ctx.member.id.to_string());
    assert!(users[0].get("password_hash").is_none());

    ctx.cleanup().await.unwrap();
}
