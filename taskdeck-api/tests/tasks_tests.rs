/// Integration tests for task management endpoints
///
/// These drive the full router over an in-memory database:
/// - Create/update/delete lifecycle with soft-delete semantics
/// - Ownership isolation between users
/// - List filtering (search, status, due date), sorting and pagination
/// - Due-soon view and per-user statistics
/// - Response shape guarantees

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{body_json, create_task, register_and_login, TestContext};
use serde_json::{json, Value};
use std::collections::HashSet;
use uuid::Uuid;

fn parse_ts(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp string"))
        .expect("valid RFC 3339")
        .with_timezone(&Utc)
}

async fn list_tasks(ctx: &TestContext, token: &str, query: &str) -> (StatusCode, Value) {
    let uri = if query.is_empty() {
        "/tasks".to_string()
    } else {
        format!("/tasks?{}", query)
    };
    let response = ctx.request("GET", &uri, Some(token), None).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// Creating with only a title fills in the documented defaults
#[tokio::test]
async fn test_create_task_defaults() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let task = create_task(&ctx, &token, json!({ "title": "buy milk" })).await;

    assert_eq!(task["title"], "buy milk");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "medium");
    assert!(task["due_date"].is_null());
    assert!(task["id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert!(task["user_id"].as_str().unwrap().parse::<Uuid>().is_ok());
}

/// Status and due date from the request are persisted and echoed back
#[tokio::test]
async fn test_create_task_with_status_and_due_date() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let due = "2026-09-01T08:00:00Z";
    let task = create_task(
        &ctx,
        &token,
        json!({ "title": "file report", "status": "in_progress", "due_date": due }),
    )
    .await;

    assert_eq!(task["status"], "in_progress");
    let expected = DateTime::parse_from_rfc3339(due).unwrap().with_timezone(&Utc);
    assert_eq!(parse_ts(&task["due_date"]), expected);
}

/// Invalid creation payloads are rejected with 400
#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    // Empty title
    let response = ctx
        .request("POST", "/tasks", Some(&token), Some(json!({ "title": "" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "title is required");

    // Missing title entirely
    let response = ctx
        .request(
            "POST",
            "/tasks",
            Some(&token),
            Some(json!({ "status": "todo" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Status outside the closed enumeration
    let response = ctx
        .request(
            "POST",
            "/tasks",
            Some(&token),
            Some(json!({ "title": "x", "status": "completed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Update overwrites title, status and due date; omitting the due date
/// clears it and priority is untouched
#[tokio::test]
async fn test_update_task_full_overwrite() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let task = create_task(
        &ctx,
        &token,
        json!({ "title": "draft", "status": "todo", "due_date": "2026-09-01T08:00:00Z" }),
    )
    .await;
    let id = task["id"].as_str().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&token),
            Some(json!({ "title": "final", "status": "done" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(updated["id"], task["id"]);
    assert_eq!(updated["title"], "final");
    assert_eq!(updated["status"], "done");
    assert!(updated["due_date"].is_null());
    assert_eq!(updated["priority"], "medium");
    assert_eq!(updated["created_at"], task["created_at"]);
    assert!(parse_ts(&updated["updated_at"]) > parse_ts(&task["created_at"]));
}

/// Update payloads must carry a status and a non-empty title
#[tokio::test]
async fn test_update_task_validation() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let task = create_task(&ctx, &token, json!({ "title": "draft" })).await;
    let id = task["id"].as_str().unwrap();

    // Missing status
    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&token),
            Some(json!({ "title": "final" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty title
    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&token),
            Some(json!({ "title": "", "status": "done" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Status outside the closed enumeration
    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&token),
            Some(json!({ "title": "final", "status": "completed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The task is unchanged
    let (_, body) = list_tasks(&ctx, &token, "").await;
    assert_eq!(body["tasks"][0]["title"], "draft");
    assert_eq!(body["tasks"][0]["status"], "todo");
}

/// Ids that match nothing produce 404, including non-UUID ids
#[tokio::test]
async fn test_update_missing_task() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let body = json!({ "title": "x", "status": "todo" });

    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", Uuid::new_v4()),
            Some(&token),
            Some(body.clone()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], "task not found");

    let response = ctx
        .request("PUT", "/tasks/not-a-uuid", Some(&token), Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Soft-deleted tasks vanish from every read path and cannot be touched
#[tokio::test]
async fn test_delete_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let task = create_task(&ctx, &token, json!({ "title": "temporary" })).await;
    let id = task["id"].as_str().unwrap().to_string();

    let response = ctx
        .request("DELETE", &format!("/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "task deleted");

    // Gone from the list
    let (_, body) = list_tasks(&ctx, &token, "").await;
    assert_eq!(body["total"], 0);
    assert!(body["tasks"].as_array().unwrap().is_empty());

    // Second delete and update both 404
    let response = ctx
        .request("DELETE", &format!("/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&token),
            Some(json!({ "title": "back", "status": "todo" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The row itself is retained with its deletion marker
    let (live,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE deleted_at IS NOT NULL")
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(live, 1);
}

/// One user's tasks are invisible and untouchable to another
#[tokio::test]
async fn test_cross_user_isolation() {
    let ctx = TestContext::new().await.unwrap();
    let alice = register_and_login(&ctx, "alice", "pw1").await.unwrap();
    let bob = register_and_login(&ctx, "bob", "pw2").await.unwrap();

    let task = create_task(&ctx, &alice, json!({ "title": "alice's task" })).await;
    let id = task["id"].as_str().unwrap();

    // Bob sees nothing
    let (_, body) = list_tasks(&ctx, &bob, "").await;
    assert_eq!(body["total"], 0);

    // Bob cannot update or delete by id
    let response = ctx
        .request(
            "PUT",
            &format!("/tasks/{}", id),
            Some(&bob),
            Some(json!({ "title": "hijacked", "status": "done" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .request("DELETE", &format!("/tasks/{}", id), Some(&bob), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice's task is intact
    let (_, body) = list_tasks(&ctx, &alice, "").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["title"], "alice's task");
}

/// Page walk covers every task exactly once and echoes normalized params
#[tokio::test]
async fn test_list_pagination() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    for i in 0..25 {
        create_task(&ctx, &token, json!({ "title": format!("task {}", i) })).await;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for page in 1..=3 {
        let (status, body) = list_tasks(&ctx, &token, &format!("page={}&limit=10", page)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 25);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["page"], page);
        assert_eq!(body["limit"], 10);

        let tasks = body["tasks"].as_array().unwrap();
        let expected_len = if page == 3 { 5 } else { 10 };
        assert_eq!(tasks.len(), expected_len);
        for task in tasks {
            assert!(seen.insert(task["id"].as_str().unwrap().to_string()));
        }
    }
    assert_eq!(seen.len(), 25);

    // A page past the end is empty but keeps the totals
    let (_, body) = list_tasks(&ctx, &token, "page=4&limit=10").await;
    assert!(body["tasks"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 25);

    // Junk pagination values normalize to the defaults
    let (status, body) = list_tasks(&ctx, &token, "page=abc&limit=-5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 10);

    let (_, body) = list_tasks(&ctx, &token, "page=0&limit=0").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);

    // A limit at the i64 ceiling still answers with everything on one page
    let query = format!("limit={}", i64::MAX);
    let (status, body) = list_tasks(&ctx, &token, &query).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 25);
}

/// Substring search on title is case-insensitive
#[tokio::test]
async fn test_list_search_filter() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    for title in ["buy milk", "buy bread", "milk the cows", "walk the dog"] {
        create_task(&ctx, &token, json!({ "title": title })).await;
    }

    let (_, body) = list_tasks(&ctx, &token, "search=milk").await;
    assert_eq!(body["total"], 2);

    let (_, body) = list_tasks(&ctx, &token, "search=MILK").await;
    assert_eq!(body["total"], 2);

    let (_, body) = list_tasks(&ctx, &token, "search=xyz").await;
    assert_eq!(body["total"], 0);
}

/// Status filter matches exactly; unknown enum values are rejected
#[tokio::test]
async fn test_list_status_filter() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    create_task(&ctx, &token, json!({ "title": "a", "status": "done" })).await;
    create_task(&ctx, &token, json!({ "title": "b", "status": "done" })).await;
    create_task(&ctx, &token, json!({ "title": "c", "status": "todo" })).await;

    let (status, body) = list_tasks(&ctx, &token, "status=done").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    for task in body["tasks"].as_array().unwrap() {
        assert_eq!(task["status"], "done");
    }

    let (status, _) = list_tasks(&ctx, &token, "status=completed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = list_tasks(&ctx, &token, "sort=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Combined filters apply as a conjunction, and deletion wins over any match
#[tokio::test]
async fn test_list_combined_filters() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    // Each of these misses exactly one of the three predicates below
    create_task(
        &ctx,
        &token,
        json!({ "title": "buy milk today", "status": "todo", "due_date": "2026-09-01T09:00:00Z" }),
    )
    .await;
    create_task(
        &ctx,
        &token,
        json!({ "title": "buy milk again", "status": "done", "due_date": "2026-09-02T08:00:00Z" }),
    )
    .await;
    create_task(
        &ctx,
        &token,
        json!({ "title": "call the bank", "status": "done", "due_date": "2026-09-01T10:00:00Z" }),
    )
    .await;

    // And these two match all three
    create_task(
        &ctx,
        &token,
        json!({ "title": "buy milk", "status": "done", "due_date": "2026-09-01T08:00:00Z" }),
    )
    .await;
    let doomed = create_task(
        &ctx,
        &token,
        json!({ "title": "spilt milk", "status": "done", "due_date": "2026-09-01T12:00:00Z" }),
    )
    .await;

    let query = "search=milk&status=done&due=2026-09-01";
    let (status, body) = list_tasks(&ctx, &token, query).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    for task in body["tasks"].as_array().unwrap() {
        assert!(task["title"].as_str().unwrap().contains("milk"));
        assert_eq!(task["status"], "done");
    }

    // Soft-deleting one of the matches removes it from the same query
    let id = doomed["id"].as_str().unwrap();
    let response = ctx
        .request("DELETE", &format!("/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = list_tasks(&ctx, &token, query).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["title"], "buy milk");
}

/// Sort orders by creation time in either direction
#[tokio::test]
async fn test_list_sort_order() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    for title in ["first", "second", "third"] {
        create_task(&ctx, &token, json!({ "title": title })).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let (_, body) = list_tasks(&ctx, &token, "sort=asc").await;
    assert_eq!(body["tasks"][0]["title"], "first");
    assert_eq!(body["tasks"][2]["title"], "third");

    let (_, body) = list_tasks(&ctx, &token, "sort=desc").await;
    assert_eq!(body["tasks"][0]["title"], "third");

    // Default is newest first
    let (_, body) = list_tasks(&ctx, &token, "").await;
    assert_eq!(body["tasks"][0]["title"], "third");
}

/// The due filter matches any time within the named UTC day
#[tokio::test]
async fn test_list_due_filter() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    create_task(
        &ctx,
        &token,
        json!({ "title": "morning", "due_date": "2026-09-01T08:00:00Z" }),
    )
    .await;
    create_task(
        &ctx,
        &token,
        json!({ "title": "late night", "due_date": "2026-09-01T23:30:00Z" }),
    )
    .await;
    create_task(
        &ctx,
        &token,
        json!({ "title": "next day", "due_date": "2026-09-02T00:00:00Z" }),
    )
    .await;
    create_task(&ctx, &token, json!({ "title": "no due date" })).await;

    let (status, body) = list_tasks(&ctx, &token, "due=2026-09-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = list_tasks(&ctx, &token, "due=2026-09-02").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["title"], "next day");

    let (status, _) = list_tasks(&ctx, &token, "due=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Due-soon returns the next 72 hours ordered by due date
#[tokio::test]
async fn test_due_soon_window() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let now = Utc::now();
    let in_window_late = (now + Duration::hours(71)).to_rfc3339();
    let in_window_soon = (now + Duration::hours(4)).to_rfc3339();
    let beyond = (now + Duration::days(10)).to_rfc3339();
    let past = (now - Duration::days(1)).to_rfc3339();

    // Inserted out of order on purpose
    create_task(
        &ctx,
        &token,
        json!({ "title": "in three days", "due_date": in_window_late }),
    )
    .await;
    create_task(
        &ctx,
        &token,
        json!({ "title": "later today", "due_date": in_window_soon }),
    )
    .await;
    create_task(&ctx, &token, json!({ "title": "far off", "due_date": beyond })).await;
    create_task(&ctx, &token, json!({ "title": "overdue", "due_date": past })).await;
    create_task(&ctx, &token, json!({ "title": "no due date" })).await;

    let response = ctx.request("GET", "/tasks/due-soon", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["later today", "in three days"]);

    // Deleting a task removes it from the view
    let id = body[0]["id"].as_str().unwrap();
    let response = ctx
        .request("DELETE", &format!("/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.request("GET", "/tasks/due-soon", Some(&token), None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "in three days");
}

/// Stats count live tasks only, split into completed and pending
#[tokio::test]
async fn test_stats() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let done = create_task(&ctx, &token, json!({ "title": "a", "status": "done" })).await;
    create_task(&ctx, &token, json!({ "title": "b", "status": "done" })).await;
    create_task(&ctx, &token, json!({ "title": "c", "status": "todo" })).await;
    create_task(&ctx, &token, json!({ "title": "d", "status": "in_progress" })).await;

    let response = ctx.request("GET", "/tasks/stats", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_tasks"], 4);
    assert_eq!(body["completed"], 2);
    assert_eq!(body["pending"], 2);

    // Soft-deleted tasks drop out of the counts
    let id = done["id"].as_str().unwrap();
    ctx.request("DELETE", &format!("/tasks/{}", id), Some(&token), None)
        .await;

    let response = ctx.request("GET", "/tasks/stats", Some(&token), None).await;
    let body = body_json(response).await;
    assert_eq!(body["total_tasks"], 3);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["pending"], 2);

    // And stats are per-user
    let bob = register_and_login(&ctx, "bob", "pw2").await.unwrap();
    let response = ctx.request("GET", "/tasks/stats", Some(&bob), None).await;
    let body = body_json(response).await;
    assert_eq!(body["total_tasks"], 0);
}

/// Serialized tasks expose exactly the public fields
#[tokio::test]
async fn test_task_response_shape() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_and_login(&ctx, "alice", "pw1").await.unwrap();

    let task = create_task(&ctx, &token, json!({ "title": "shape check" })).await;

    let mut keys: Vec<&str> = task.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "created_at",
            "due_date",
            "id",
            "priority",
            "status",
            "title",
            "updated_at",
            "user_id"
        ]
    );
}
