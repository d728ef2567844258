/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Hermetic in-memory database per test
/// - Router construction with a fixed test configuration
/// - Request driving helpers
/// - Register/login shortcuts
///
/// Every context uses `sqlite::memory:` with a single pooled connection;
/// a second connection would see a different, empty database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::{ApiConfig, Config, DatabaseConfig as ApiDatabaseConfig, JwtConfig};
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
use tower::ServiceExt;

/// Signing secret used by every test context
pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: sqlx::SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context over a fresh in-memory database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: ApiDatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let db = create_pool(DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: None,
            max_lifetime_seconds: None,
            test_before_acquire: true,
        })
        .await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Sends a request and returns the raw response
    ///
    /// `token` is sent as `Authorization: Bearer <token>` when present;
    /// `body` is serialized as a JSON request body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builder");

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails")
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Registers a user and logs in, returning the bearer token
pub async fn register_and_login(
    ctx: &TestContext,
    username: &str,
    password: &str,
) -> anyhow::Result<String> {
    let response = ctx
        .request(
            "POST",
            "/register",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
    if response.status() != StatusCode::OK {
        anyhow::bail!("register failed with {}", response.status());
    }

    let response = ctx
        .request(
            "POST",
            "/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
    if response.status() != StatusCode::OK {
        anyhow::bail!("login failed with {}", response.status());
    }

    let body = body_json(response).await;
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("login response missing token"))?;
    Ok(token.to_string())
}

/// Creates a task through the API and returns its JSON representation
pub async fn create_task(ctx: &TestContext, token: &str, body: Value) -> Value {
    let response = ctx.request("POST", "/tasks", Some(token), Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK, "task creation failed");
    body_json(response).await
}
