use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::task::{Task, TaskService, TaskServiceError};
use crate::web::{
    ApiError, ApiJson, AppState, ErrorResponse, OptionalApiJson, method_not_allowed_handler,
};

/// Request payload for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    subject: Option<String>,
    title: Option<String>,
}

/// Request payload for updating a task. Only the completion flag is updatable.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    is_completed: Option<bool>,
}

/// Handler for GET /api/tasks - Returns all tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = [Task])
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(State(state): State<AppState>) -> Json<Vec<Task>> {
    let service = TaskService::new(state.storage.as_ref());
    Json(service.get_all_tasks())
}

/// Handler for POST /api/tasks - Creates a new task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Subject or title missing", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let service = TaskService::new(state.storage.as_ref());
    let task = service.create_task(
        payload.subject.as_deref().unwrap_or_default(),
        payload.title.as_deref().unwrap_or_default(),
    )?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for PATCH /api/tasks/{id} - Updates the completion flag of a task.
///
/// The id is resolved before the body is read, so an unknown id is always a 404.
/// A missing body leaves the task unchanged.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task to update")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Body is not a valid update", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<OptionalApiJson<UpdateTaskRequest>, ApiError>,
) -> Result<Json<Task>, ApiError> {
    let service = TaskService::new(state.storage.as_ref());
    service
        .get_task_by_id(&id)
        .ok_or_else(|| TaskServiceError::TaskNotFound(id.clone()))?;
    let OptionalApiJson(payload) = body?;

    let task = service.update_task(&id, payload.and_then(|payload| payload.is_completed))?;
    Ok(Json(task))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(create_task_handler))
        .route("/tasks/{id}", patch(update_task_handler))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}
