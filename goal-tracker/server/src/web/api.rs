use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::goal::GoalServiceError;
use crate::task::TaskServiceError;

const INVALID_DATA_MESSAGE: &str = "Invalid data";
const SERVER_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your request. Please try again later.";

/// JSON body carrying a human readable message, used for confirmations and errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailsResponse {
    /// Message describing the outcome
    pub details: String,
}

impl DetailsResponse {
    pub fn new(details: String) -> Self {
        Self { details }
    }
}

/// Error type for JSON API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is missing, malformed or lacks a required field.
    #[error("Invalid data")]
    InvalidData,
    /// The addressed record does not exist or its identifier is malformed.
    #[error("{0}")]
    NotFound(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<GoalServiceError> for ApiError {
    fn from(err: GoalServiceError) -> Self {
        match err {
            GoalServiceError::GoalNotFound(_) | GoalServiceError::TaskNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            GoalServiceError::Database(db_err) => ApiError::Database(db_err),
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::TaskNotFound(_) => ApiError::NotFound(err.to_string()),
            TaskServiceError::UnknownGoal(goal_id) => {
                tracing::debug!("Rejected task referencing unknown goal {}", goal_id);
                ApiError::InvalidData
            }
            TaskServiceError::Database(db_err) => ApiError::Database(db_err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, details) = match self {
            ApiError::InvalidData => (StatusCode::BAD_REQUEST, INVALID_DATA_MESSAGE.to_string()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Database(err) => {
                tracing::error!("Database operation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status_code, Json(DetailsResponse::new(details))).into_response()
    }
}

/// JSON body extractor that reports every rejection as [`ApiError::InvalidData`].
///
/// Handlers addressing an existing record take it as `Result<ValidJson<T>, ApiError>`
/// and resolve the record first, so a missing record wins over an unreadable body.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection);
                Err(ApiError::InvalidData)
            }
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::goal::api::create_goal_handler,
        crate::goal::api::get_goals_handler,
        crate::goal::api::get_goal_handler,
        crate::goal::api::update_goal_handler,
        crate::goal::api::delete_goal_handler,
        crate::goal::api::assign_tasks_handler,
        crate::goal::api::get_goal_tasks_handler,
        crate::task::api::create_task_handler,
        crate::task::api::get_tasks_handler,
        crate::task::api::get_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
        crate::task::api::mark_complete_handler,
        crate::task::api::mark_incomplete_handler,
    ),
    tags(
        (name = "Goals", description = "Goals and their task assignments"),
        (name = "Tasks", description = "Tasks and their completion state")
    )
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json - Returns the OpenAPI document.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
