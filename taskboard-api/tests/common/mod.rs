/// Common test utilities for integration tests
///
/// Provides shared infrastructure for DB-backed tests:
/// - Test database setup (migrations)
/// - Test user creation with known passwords
/// - JWT token generation
/// - Request helpers
///
/// These tests require a running PostgreSQL and a configured environment
/// (`DATABASE_URL`, `JWT_SECRET`), hence they are `#[ignore]`d by default.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::auth::password::hash_password;
use taskboard_shared::models::user::{CreateUser, User};
use tower::ServiceExt;
use uuid::Uuid;

/// Password shared by all test users
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub owner: User,
    pub member: User,
    pub outsider: User,
}

impl TestContext {
    /// Creates a new test context with three users: a project owner, a
    /// future member, and an outsider.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../taskboard-shared/migrations")
            .run(&db)
            .await?;

        let owner = create_test_user(&db, "owner").await?;
        let member = create_test_user(&db, "member").await?;
        let outsider = create_test_user(&db, "outsider").await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            owner,
            member,
            outsider,
        })
    }

    /// Returns an authorization header value for the given user
    pub fn auth_header(&self, user: &User) -> String {
        let claims = Claims::new(user.id);
        let token = create_token(&claims, &self.config.jwt.secret)
            .expect("token creation should not fail");
        format!("Bearer {}", token)
    }

    /// Sends a request and returns the status code and parsed JSON body
    ///
    /// `token` is a full `Bearer ...` header value; `body` of None sends an
    /// empty JSON object for write methods.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Deletes the test users; schema-level cascades remove everything they
    /// own (projects, tasks, comments, membership rows).
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for user in [&self.owner, &self.member, &self.outsider] {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user.id)
                .execute(&self.db)
                .await?;
        }
        Ok(())
    }
}

/// Creates a user with a unique username and a known password
pub async fn create_test_user(db: &PgPool, role: &str) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();
    let user = User::create(
        db,
        CreateUser {
            username: format!("{}-{}", role, suffix),
            email: format!("{}-{}@example.com", role, suffix),
            first_name: role.to_string(),
            last_name: "Tester".to_string(),
            password_hash: hash_password(TEST_PASSWORD)?,
        },
    )
    .await?;

    Ok(user)
}
