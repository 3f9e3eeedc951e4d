/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:id/tasks` - A project's tasks, newest first
/// - `POST /v1/projects/:id/tasks` - Create a task (owner or member)
/// - `GET /v1/tasks/mine` - The caller's tasks, filtered, with stats
/// - `GET /v1/tasks/:id` - One task
/// - `PATCH /v1/tasks/:id` - Edit a task (owner or member)
/// - `GET /v1/tasks/:id/comments` - A task's comments, oldest first
/// - `POST /v1/tasks/:id/comments` - Comment on a task (owner or member)

use crate::{
    app::AppState,
    error::{found, items, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::comment::{NewComment, TaskComment},
    models::task::{NewTask, Task, TaskPriority, UpdateTask},
    views::{filter_tasks, TaskQuery, TaskStats},
};
use uuid::Uuid;

/// Task creation body; the project comes from the path
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub assignee_id: Uuid,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    pub due_date: NaiveDate,
}

impl CreateTaskRequest {
    fn into_new_task(self, project_id: Uuid) -> NewTask {
        NewTask {
            name: self.name,
            description: self.description,
            project_id,
            assignee_id: self.assignee_id,
            priority: self.priority.unwrap_or(TaskPriority::Medium),
            due_date: self.due_date,
        }
    }
}

/// My-tasks response
#[derive(Debug, Serialize)]
pub struct MyTasksResponse {
    /// Tasks passing the query
    pub tasks: Vec<Task>,

    /// Counters over all of the caller's tasks, before filtering
    pub stats: TaskStats,
}

/// List a project's tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = items(state.access.get_tasks_by_project(&auth, project_id).await)?;

    Ok(Json(tasks))
}

/// Create a task in a project
///
/// New tasks start in `todo`. Priority defaults to `medium`.
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects/:id/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "name": "Draft Q1 goals",
///   "assignee_id": "uuid",
///   "priority": "high",
///   "due_date": "2025-01-01"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The caller is only a viewer
/// - `404 Not Found`: No such project visible to the caller, or no such assignee
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = found(
        state
            .access
            .create_task(&auth, req.into_new_task(project_id))
            .await,
        "Task",
    )?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// The caller's tasks with filters and stats
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks/mine?search=docs&status=in-progress&priority=high&tab=overdue
/// Authorization: Bearer <token>
/// ```
///
/// `tab` is one of `all`, `due-today`, `in-progress`, `overdue`, evaluated
/// against today's UTC date.
pub async fn my_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<MyTasksResponse>> {
    let all = items(state.access.get_my_tasks(&auth).await)?;
    let today = Utc::now().date_naive();

    Ok(Json(MyTasksResponse {
        tasks: filter_tasks(&all, &query, today),
        stats: TaskStats::from_tasks(&all, today),
    }))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(found(state.access.get_task(&auth, id).await, "Task")?))
}

/// Edit a task
///
/// Any field may change, including moving between any two statuses.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    Ok(Json(found(state.access.update_task(&auth, id, req).await, "Task")?))
}

/// List a task's comments
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskComment>>> {
    Ok(Json(items(state.access.get_task_comments(&auth, id).await)?))
}

/// Comment on a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks/:id/comments
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "content": "Wireframes are up for review." }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The caller is only a viewer
/// - `404 Not Found`: No such task visible to the caller
/// - `422 Unprocessable Entity`: Blank or longer than 2000 characters
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<NewComment>,
) -> ApiResult<(StatusCode, Json<TaskComment>)> {
    let comment = found(state.access.add_task_comment(&auth, id, req).await, "Task")?;

    Ok((StatusCode::CREATED, Json(comment)))
}
