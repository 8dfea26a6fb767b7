use crate::notification::NotificationDispatcher;
use crate::task::{SortOrder, Task, TaskService};
use crate::web::api::{ApiError, DetailsResponse, ValidJson};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub notifications: NotificationDispatcher,
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    task_id: i32,
    title: String,
    description: String,
    /// Whether the task has been completed
    is_complete: bool,
    /// Goal the task is assigned to, if any
    goal_id: Option<i32>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            is_complete: task.is_complete(),
            goal_id: task.goal_id(),
        }
    }
}

/// API response wrapping a single task.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    task: TaskJson,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            task: TaskJson::from(task),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    /// Optional goal to assign the task to
    goal_id: Option<i32>,
}

/// Request body for replacing a task's title and description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    title: String,
    description: String,
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// `asc` or `desc` to order by title
    sort: Option<String>,
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid data", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    ValidJson(payload): ValidJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let service = TaskService::new(&state.db);
    let task = service
        .create_task(payload.title, payload.description, payload.goal_id)
        .await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Handler for GET /tasks - Returns all tasks, optionally sorted by title.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 500, description = "Internal server error", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let sort = query.sort.as_deref().and_then(SortOrder::from_query);
    let service = TaskService::new(&state.db);
    let tasks = service.get_all_tasks(sort).await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /tasks/{id} - Returns one task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Task not found", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.get_task_by_id(&id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Handler for PUT /tasks/{id} - Replaces a task's title and description.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid data", body = DetailsResponse),
        (status = 404, description = "Task not found", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<ValidJson<UpdateTaskRequest>, ApiError>,
) -> Result<Json<TaskResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    service.get_task_by_id(&id).await?;
    let ValidJson(payload) = payload?;
    let task = service
        .update_task_by_id(&id, payload.title, payload.description)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Handler for DELETE /tasks/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task deleted", body = DetailsResponse),
        (status = 404, description = "Task not found", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.delete_task_by_id(&id).await?;
    Ok(Json(DetailsResponse::new(format!(
        "Task {} \"{}\" successfully deleted",
        task.id(),
        task.title()
    ))))
}

/// Handler for PATCH /tasks/{id}/mark_complete - Completes a task and
/// announces it on the notification channel.
///
/// The announcement runs in the background; its outcome never changes the response.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/mark_complete",
    params(("id" = String, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task completed", body = TaskResponse),
        (status = 404, description = "Task not found", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn mark_complete_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.mark_complete(&id).await?;
    state.notifications.task_completed(task.title());
    Ok(Json(TaskResponse::from(task)))
}

/// Handler for PATCH /tasks/{id}/mark_incomplete - Reopens a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/mark_incomplete",
    params(("id" = String, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task reopened", body = TaskResponse),
        (status = 404, description = "Task not found", body = DetailsResponse)
    ),
    tag = "Tasks"
)]
pub async fn mark_incomplete_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.mark_incomplete(&id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/{id}/mark_complete", patch(mark_complete_handler))
        .route("/tasks/{id}/mark_incomplete", patch(mark_incomplete_handler))
        .with_state(state)
}
