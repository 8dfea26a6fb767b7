use crate::goal::{Goal, GoalService};
use crate::record::RecordKey;
use crate::task::api::TaskJson;
use crate::web::api::{ApiError, DetailsResponse, ValidJson};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
pub struct GoalState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// JSON representation of a Goal for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoalJson {
    /// Unique identifier for the goal
    goal_id: i32,
    title: String,
}

impl From<Goal> for GoalJson {
    fn from(goal: Goal) -> Self {
        Self {
            goal_id: goal.id(),
            title: goal.title().to_string(),
        }
    }
}

/// API response wrapping a single goal.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoalResponse {
    goal: GoalJson,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            goal: GoalJson::from(goal),
        }
    }
}

/// Request body for creating or renaming a goal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoalRequest {
    title: String,
}

/// Request body for assigning tasks to a goal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTasksRequest {
    /// IDs of the tasks to assign
    #[schema(value_type = Vec<i64>)]
    task_ids: Vec<RecordKey>,
}

/// API response listing the IDs of all tasks assigned to a goal.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoalTaskIdsResponse {
    id: i32,
    task_ids: Vec<i32>,
}

/// API response listing a goal with its assigned tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoalTasksResponse {
    id: i32,
    title: String,
    tasks: Vec<TaskJson>,
}

/// Handler for POST /goals - Creates a goal.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/goals",
    request_body = GoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Invalid data", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn create_goal_handler(
    State(state): State<Arc<GoalState>>,
    ValidJson(payload): ValidJson<GoalRequest>,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    let service = GoalService::new(&state.db);
    let goal = service.create_goal(payload.title).await?;
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

/// Handler for GET /goals - Returns all goals.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/goals",
    responses(
        (status = 200, description = "Successfully retrieved goals", body = Vec<GoalJson>),
        (status = 500, description = "Internal server error", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn get_goals_handler(
    State(state): State<Arc<GoalState>>,
) -> Result<Json<Vec<GoalJson>>, ApiError> {
    let service = GoalService::new(&state.db);
    let goals = service.get_all_goals().await?;
    Ok(Json(goals.into_iter().map(GoalJson::from).collect()))
}

/// Handler for GET /goals/{id} - Returns one goal.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/goals/{id}",
    params(("id" = String, Path, description = "Goal identifier")),
    responses(
        (status = 200, description = "Goal found", body = GoalResponse),
        (status = 404, description = "Goal not found", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn get_goal_handler(
    State(state): State<Arc<GoalState>>,
    Path(id): Path<String>,
) -> Result<Json<GoalResponse>, ApiError> {
    let service = GoalService::new(&state.db);
    let goal = service.get_goal_by_id(&id).await?;
    Ok(Json(GoalResponse::from(goal)))
}

/// Handler for PUT /goals/{id} - Renames a goal.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/goals/{id}",
    params(("id" = String, Path, description = "Goal identifier")),
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Invalid data", body = DetailsResponse),
        (status = 404, description = "Goal not found", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn update_goal_handler(
    State(state): State<Arc<GoalState>>,
    Path(id): Path<String>,
    payload: Result<ValidJson<GoalRequest>, ApiError>,
) -> Result<Json<GoalResponse>, ApiError> {
    let service = GoalService::new(&state.db);
    service.get_goal_by_id(&id).await?;
    let ValidJson(payload) = payload?;
    let goal = service.update_goal_by_id(&id, payload.title).await?;
    Ok(Json(GoalResponse::from(goal)))
}

/// Handler for DELETE /goals/{id} - Deletes a goal, unassigning its tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/goals/{id}",
    params(("id" = String, Path, description = "Goal identifier")),
    responses(
        (status = 200, description = "Goal deleted", body = DetailsResponse),
        (status = 404, description = "Goal not found", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn delete_goal_handler(
    State(state): State<Arc<GoalState>>,
    Path(id): Path<String>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let service = GoalService::new(&state.db);
    let goal = service.delete_goal_by_id(&id).await?;
    Ok(Json(DetailsResponse::new(format!(
        "Goal {} \"{}\" successfully deleted",
        goal.id(),
        goal.title()
    ))))
}

/// Handler for POST /goals/{id}/tasks - Assigns tasks to a goal.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/goals/{id}/tasks",
    params(("id" = String, Path, description = "Goal identifier")),
    request_body = AssignTasksRequest,
    responses(
        (status = 200, description = "Tasks assigned", body = GoalTaskIdsResponse),
        (status = 400, description = "Invalid data", body = DetailsResponse),
        (status = 404, description = "Goal or task not found", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn assign_tasks_handler(
    State(state): State<Arc<GoalState>>,
    Path(id): Path<String>,
    payload: Result<ValidJson<AssignTasksRequest>, ApiError>,
) -> Result<Json<GoalTaskIdsResponse>, ApiError> {
    let service = GoalService::new(&state.db);
    service.get_goal_by_id(&id).await?;
    let ValidJson(payload) = payload?;
    let task_ids: Vec<String> = payload.task_ids.iter().map(RecordKey::to_raw).collect();
    let goal_tasks = service.assign_tasks(&id, &task_ids).await?;
    Ok(Json(GoalTaskIdsResponse {
        id: goal_tasks.goal.id(),
        task_ids: goal_tasks.task_ids(),
    }))
}

/// Handler for GET /goals/{id}/tasks - Returns a goal with its tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/goals/{id}/tasks",
    params(("id" = String, Path, description = "Goal identifier")),
    responses(
        (status = 200, description = "Goal with its tasks", body = GoalTasksResponse),
        (status = 404, description = "Goal not found", body = DetailsResponse)
    ),
    tag = "Goals"
)]
pub async fn get_goal_tasks_handler(
    State(state): State<Arc<GoalState>>,
    Path(id): Path<String>,
) -> Result<Json<GoalTasksResponse>, ApiError> {
    let service = GoalService::new(&state.db);
    let goal_tasks = service.get_goal_tasks(&id).await?;
    Ok(Json(GoalTasksResponse {
        id: goal_tasks.goal.id(),
        title: goal_tasks.goal.title().to_string(),
        tasks: goal_tasks.tasks.into_iter().map(TaskJson::from).collect(),
    }))
}

/// Creates and returns the goals API router.
pub fn create_goal_router(state: Arc<GoalState>) -> Router {
    Router::new()
        .route("/goals", get(get_goals_handler).post(create_goal_handler))
        .route(
            "/goals/{id}",
            get(get_goal_handler)
                .put(update_goal_handler)
                .delete(delete_goal_handler),
        )
        .route(
            "/goals/{id}/tasks",
            get(get_goal_tasks_handler).post(assign_tasks_handler),
        )
        .with_state(state)
}
