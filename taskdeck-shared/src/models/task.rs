/// Task model and database operations
///
/// This module provides the Task model and the owner-scoped queries behind
/// the task endpoints. Every read and write here is filtered by the owning
/// user id, so cross-user access is impossible at the query level rather
/// than merely unlikely. Deletion is logical: rows gain a `deleted_at`
/// timestamp and drop out of every query.
///
/// # Status Values
///
/// ```text
/// todo → in_progress → done
/// todo → done
/// ```
///
/// The progression above is the expected workflow. It is not enforced; an
/// owner may write any status at any time.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BLOB PRIMARY KEY,
///     user_id BLOB NOT NULL REFERENCES users(id),
///     title TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'todo',
///     due_date TEXT,
///     priority TEXT NOT NULL DEFAULT 'medium',
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL,
///     deleted_at TEXT
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{CreateTask, Task, TaskStatus};
/// # use sqlx::SqlitePool;
/// use uuid::Uuid;
///
/// # async fn example(pool: SqlitePool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     user_id,
///     title: "buy milk".to_string(),
///     status: TaskStatus::Todo,
///     due_date: None,
/// }).await?;
///
/// let found = Task::find_owned(&pool, task.id, user_id).await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Task workflow status
///
/// A closed set: anything outside these three values is rejected at the
/// request boundary before it can reach a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl TaskStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
///
/// Stored and serialized but never set through the current API surface;
/// every task is created at the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    /// Converts priority to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Sort direction for task listings
///
/// The accepted values close over the SQL keywords, so a direction can
/// never smuggle arbitrary text into an ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl SortOrder {
    /// The SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Task model representing a single tracked task
///
/// The deletion marker is internal bookkeeping and is skipped during
/// serialization, so a response body never reveals it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user; never transferable
    pub user_id: Uuid,

    /// Short description of the work
    pub title: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// When the task is due (None = no deadline)
    pub due_date: Option<DateTime<Utc>>,

    /// Priority level
    pub priority: TaskPriority,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was soft-deleted (None = live)
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Initial status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating a task
///
/// Updates are full overwrites of the mutable fields. A None due date
/// clears any stored deadline.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    /// New title
    pub title: String,

    /// New status
    pub status: TaskStatus,

    /// New due date (None clears it)
    pub due_date: Option<DateTime<Utc>>,
}

/// Optional predicates applied to task listings
///
/// Each field is independent; absent fields add no constraint. The owner
/// match and the live-rows check are always applied on top of these.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring match on title
    pub search: Option<String>,

    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Match tasks due anywhere within this UTC day
    pub due_on: Option<NaiveDate>,
}

/// 1-indexed page selection for task listings
///
/// Construction through [`Pagination::from_params`] guarantees both fields
/// are positive, so the derived offset is never negative and the page
/// count division never sees a zero limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    /// Builds a pagination from raw query parameters
    ///
    /// Non-numeric or non-positive values fall back to the defaults
    /// (page 1, limit 10) field by field, without rejecting the request.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let defaults = Self::default();

        let parse_positive = |raw: Option<&str>, fallback: i64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };

        Self {
            page: parse_positive(page, defaults.page),
            limit: parse_positive(limit, defaults.limit),
        }
    }

    /// Number of rows to skip for this page
    ///
    /// Saturates on extreme page/limit pairs; query parameters can carry
    /// any positive i64.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` rows at this limit
    ///
    /// Saturating for the same reason as [`Pagination::offset`].
    pub fn total_pages(&self, total: i64) -> i64 {
        total.saturating_add(self.limit - 1) / self.limit
    }
}

/// Builds the WHERE fragment for the optional filter predicates
///
/// The fragment starts with " AND" and the caller appends it after the
/// always-present owner and deleted_at conditions. Bind order must match
/// the fragment order: search, status, then the due day range.
fn filter_clauses(filter: &TaskFilter) -> String {
    let mut clauses = String::new();

    if filter.search.is_some() {
        clauses.push_str(" AND title LIKE ?");
    }
    if filter.status.is_some() {
        clauses.push_str(" AND status = ?");
    }
    if filter.due_on.is_some() {
        // Half-open day range in UTC
        clauses.push_str(" AND due_date >= ? AND due_date < ?");
    }

    clauses
}

/// Bounds of the UTC day a due filter matches
fn day_range(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

impl Task {
    /// Creates a new task for the given owner
    ///
    /// The id and both timestamps are generated here; priority starts at
    /// the schema default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, user_id, title, status, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, title, status, due_date, priority,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.status)
        .bind(data.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a live task by id, scoped to its owner
    ///
    /// # Returns
    ///
    /// None when the task does not exist, belongs to someone else, or has
    /// been soft-deleted. The three cases are indistinguishable on purpose.
    pub async fn find_owned(
        pool: &SqlitePool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, status, due_date, priority,
                   created_at, updated_at, deleted_at
            FROM tasks
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Overwrites the mutable fields of an owned task
    ///
    /// Title, status, and due date are replaced wholesale; priority is
    /// untouched. Refreshes `updated_at`.
    ///
    /// # Returns
    ///
    /// The updated task, or None under the same merged conditions as
    /// [`Task::find_owned`].
    pub async fn update_owned(
        pool: &SqlitePool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?, status = ?, due_date = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            RETURNING id, user_id, title, status, due_date, priority,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.title)
        .bind(data.status)
        .bind(data.due_date)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Soft-deletes an owned task
    ///
    /// Sets the deletion marker; the row persists but stops matching every
    /// other query in this module.
    ///
    /// # Returns
    ///
    /// True if a live owned task was marked, false otherwise
    pub async fn soft_delete(
        pool: &SqlitePool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists an owner's live tasks with filtering, sorting, and pagination
    ///
    /// The total is counted from the same predicate set without the page
    /// bounds, so callers can derive an exact page count. Ordering is by
    /// creation time in the requested direction with the row id as a
    /// stable tiebreak, which keeps page walks free of duplicates or gaps.
    ///
    /// # Returns
    ///
    /// The requested page of tasks and the total matching count
    pub async fn list(
        pool: &SqlitePool,
        owner_id: Uuid,
        filter: &TaskFilter,
        sort: SortOrder,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let clauses = filter_clauses(filter);

        let count_sql = format!(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? AND deleted_at IS NULL{}",
            clauses
        );

        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(owner_id);
        if let Some(ref search) = filter.search {
            count_query = count_query.bind(format!("%{}%", search));
        }
        if let Some(status) = filter.status {
            count_query = count_query.bind(status);
        }
        if let Some(day) = filter.due_on {
            let (start, end) = day_range(day);
            count_query = count_query.bind(start).bind(end);
        }
        let (total,) = count_query.fetch_one(pool).await?;

        let list_sql = format!(
            "SELECT id, user_id, title, status, due_date, priority, \
             created_at, updated_at, deleted_at \
             FROM tasks WHERE user_id = ? AND deleted_at IS NULL{} \
             ORDER BY created_at {}, id LIMIT ? OFFSET ?",
            clauses,
            sort.as_sql()
        );

        let mut list_query = sqlx::query_as::<_, Task>(&list_sql).bind(owner_id);
        if let Some(ref search) = filter.search {
            list_query = list_query.bind(format!("%{}%", search));
        }
        if let Some(status) = filter.status {
            list_query = list_query.bind(status);
        }
        if let Some(day) = filter.due_on {
            let (start, end) = day_range(day);
            list_query = list_query.bind(start).bind(end);
        }
        let tasks = list_query
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((tasks, total))
    }

    /// Counts an owner's live tasks, in total and in one status
    ///
    /// Both counters come from a single query, so together they are a
    /// consistent snapshot even while other requests write.
    ///
    /// # Returns
    ///
    /// `(total, matching)` where `matching <= total` always holds
    pub async fn status_counts(
        pool: &SqlitePool,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> Result<(i64, i64), sqlx::Error> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(status = ?), 0)
            FROM tasks
            WHERE user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(status)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }

    /// Lists an owner's live tasks due within the given window
    ///
    /// Matches tasks whose due date falls in `[from, from + horizon]`,
    /// both ends inclusive, ordered soonest first. Tasks without a due
    /// date never match.
    pub async fn due_within(
        pool: &SqlitePool,
        owner_id: Uuid,
        from: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let until = from + horizon;

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, status, due_date, priority,
                   created_at, updated_at, deleted_at
            FROM tasks
            WHERE user_id = ? AND deleted_at IS NULL
              AND due_date >= ? AND due_date <= ?
            ORDER BY due_date ASC
            "#,
        )
        .bind(owner_id)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
