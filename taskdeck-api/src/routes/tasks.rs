/// Task management endpoints
///
/// Every handler here runs behind the auth middleware and scopes its
/// queries to the authenticated user; a task belonging to someone else
/// is indistinguishable from one that does not exist.
///
/// # Endpoints
///
/// - `POST /tasks` - Create task
/// - `GET /tasks` - List tasks with filtering, sorting and pagination
/// - `PUT /tasks/:id` - Update task (full overwrite of mutable fields)
/// - `DELETE /tasks/:id` - Soft-delete task
/// - `GET /tasks/due-soon` - Tasks due within the next 72 hours
/// - `GET /tasks/stats` - Per-user task counts

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthUser,
    routes::MessageResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::models::task::{
    CreateTask, Pagination, SortOrder, Task, TaskFilter, TaskStatus, UpdateTask,
};
use uuid::Uuid;
use validator::Validate;

/// How far ahead the due-soon view looks
const DUE_SOON_HORIZON_HOURS: i64 = 72;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    /// Initial status; defaults to `todo` when omitted
    #[serde(default)]
    pub status: TaskStatus,

    /// Optional due date (RFC 3339)
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request
///
/// The update is a full overwrite of the mutable fields: `status` is
/// required, and omitting `due_date` clears any previously-set one.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    /// New status
    pub status: TaskStatus,

    /// New due date (RFC 3339)
    pub due_date: Option<DateTime<Utc>>,
}

/// List tasks query parameters
///
/// `page` and `limit` stay strings here: out-of-range or non-numeric
/// values normalize to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// 1-indexed page (default 1)
    pub page: Option<String>,

    /// Page size (default 10)
    pub limit: Option<String>,

    /// Case-insensitive substring match on title
    pub search: Option<String>,

    /// Creation-time order, `asc` or `desc` (default `desc`)
    pub sort: Option<SortOrder>,

    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Due date, `YYYY-MM-DD`; matches any time within that UTC day
    pub due: Option<NaiveDate>,
}

/// List tasks response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks on the requested page
    pub tasks: Vec<Task>,

    /// Total matching tasks across all pages
    pub total: i64,

    /// 1-indexed page served
    pub page: i64,

    /// Page size used
    pub limit: i64,

    /// Total number of pages (`ceil(total / limit)`)
    pub total_pages: i64,
}

/// Task statistics response
#[derive(Debug, Serialize)]
pub struct TaskStatsResponse {
    /// All live tasks owned by the user
    pub total_tasks: i64,

    /// Tasks with status `done`
    pub completed: i64,

    /// Everything else (`todo` and `in_progress`)
    pub pending: i64,
}

/// Create a new task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "title": "buy milk",
///   "status": "todo",
///   "due_date": "2026-09-01T08:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed body, empty title, or unknown status
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title: req.title,
            status: req.status,
            due_date: req.due_date,
        },
    )
    .await?;

    Ok(Json(task))
}

/// List tasks with filtering, sorting and pagination
///
/// # Endpoint
///
/// ```text
/// GET /tasks?page=1&limit=10&search=milk&sort=desc&status=todo&due=2026-09-01
/// ```
///
/// All parameters are optional. Soft-deleted tasks never appear.
///
/// # Response
///
/// ```json
/// {
///   "tasks": [...],
///   "total": 42,
///   "page": 1,
///   "limit": 10,
///   "total_pages": 5
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown status, unknown sort, or malformed due date
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<ListTasksResponse>> {
    let Query(params) = query?;

    let pagination = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    let sort = params.sort.unwrap_or_default();
    let filter = TaskFilter {
        search: params.search,
        status: params.status,
        due_on: params.due,
    };

    let (tasks, total) = Task::list(&state.db, auth.user_id, &filter, sort, pagination).await?;

    Ok(Json(ListTasksResponse {
        tasks,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages(total),
    }))
}

/// Update a task
///
/// # Endpoint
///
/// ```text
/// PUT /tasks/:id
/// Content-Type: application/json
///
/// {
///   "title": "buy oat milk",
///   "status": "in_progress",
///   "due_date": "2026-09-02T08:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed body, empty title, or unknown status
/// - `404 Not Found`: task missing, soft-deleted, or owned by another user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;
    req.validate()?;

    // A non-UUID id cannot name any task
    let Path(id) = path.map_err(|_| ApiError::NotFound("task not found".to_string()))?;

    let updated = Task::update_owned(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            status: req.status,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;

    Ok(Json(updated))
}

/// Soft-delete a task
///
/// The row is retained with a deletion marker; it disappears from every
/// read path. Deleting an already-deleted task returns 404.
///
/// # Errors
///
/// - `404 Not Found`: task missing, soft-deleted, or owned by another user
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path.map_err(|_| ApiError::NotFound("task not found".to_string()))?;

    let deleted = Task::soft_delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("task not found".to_string()));
    }

    Ok(Json(MessageResponse::new("task deleted")))
}

/// Tasks due within the next 72 hours
///
/// Returns a bare array ordered by due date ascending. Tasks without a
/// due date are never included.
pub async fn due_soon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Task>>> {
    let now = Utc::now();
    let tasks = Task::due_within(
        &state.db,
        auth.user_id,
        now,
        Duration::hours(DUE_SOON_HORIZON_HOURS),
    )
    .await?;

    Ok(Json(tasks))
}

/// Per-user task statistics
///
/// # Response
///
/// ```json
/// {
///   "total_tasks": 12,
///   "completed": 4,
///   "pending": 8
/// }
/// ```
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<TaskStatsResponse>> {
    // One query for both counters: a write landing between two separate
    // counts could report more completed tasks than live ones
    let (total_tasks, completed) =
        Task::status_counts(&state.db, auth.user_id, TaskStatus::Done).await?;

    Ok(Json(TaskStatsResponse {
        total_tasks,
        completed,
        pending: total_tasks - completed,
    }))
}
