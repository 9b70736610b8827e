use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::session::{DateFilter, Session, SessionService};
use crate::web::{
    ApiError, ApiJson, ApiQuery, AppState, ErrorResponse, method_not_allowed_handler,
};

/// Query parameters for listing sessions.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SessionsQuery {
    /// Set to `today` to only list sessions logged on the current day
    #[serde(default)]
    date: Option<String>,
}

/// Request payload for logging a session.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    task_id: Option<String>,
    /// Minutes spent; numeric strings are accepted
    #[schema(value_type = Option<u32>)]
    minutes: Option<Value>,
}

/// Handler for GET /api/sessions - Returns logged sessions.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/sessions",
    params(SessionsQuery),
    responses(
        (status = 200, description = "Successfully retrieved sessions", body = [Session]),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "Sessions"
)]
pub async fn get_sessions_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionsQuery>,
) -> Json<Vec<Session>> {
    let service = SessionService::new(state.storage.as_ref());
    let filter = query.date.as_deref().and_then(DateFilter::parse);
    Json(service.get_sessions(filter))
}

/// Handler for POST /api/sessions - Logs a new session.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session logged", body = Session),
        (status = 400, description = "Task ID or minutes missing or invalid", body = ErrorResponse)
    ),
    tag = "Sessions"
)]
pub async fn create_session_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let service = SessionService::new(state.storage.as_ref());
    let session = service.create_session(
        payload.task_id.as_deref().unwrap_or_default(),
        payload.minutes.as_ref(),
    )?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Creates and returns the sessions API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/sessions",
            get(get_sessions_handler).post(create_session_handler),
        )
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}
