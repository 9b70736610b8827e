use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config;
use crate::note::NoteServiceError;
use crate::session::SessionServiceError;
use crate::storage::{JsonFileStorage, Storage};
use crate::task::TaskServiceError;

pub mod api;

/// Shared state handed to every resource router.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

/// JSON body for every error response.
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable description of what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Error type for API handler operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ApiError {
    /// Represents a missing or invalid field in the request.
    #[error("{0}")]
    Validation(String),
    /// Represents an id lookup miss.
    #[error("{0}")]
    NotFound(String),
    /// Represents a known path requested with an unsupported method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        };
        (status_code, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::MissingFields => ApiError::Validation(err.to_string()),
            TaskServiceError::TaskNotFound(_) => ApiError::NotFound("Task not found".to_string()),
        }
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(err: SessionServiceError) -> Self {
        match err {
            SessionServiceError::MissingFields | SessionServiceError::InvalidMinutes => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl From<NoteServiceError> for ApiError {
    fn from(err: NoteServiceError) -> Self {
        match err {
            NoteServiceError::TitleRequired => ApiError::Validation(err.to_string()),
            NoteServiceError::NoteNotFound(_) => ApiError::NotFound("Note not found".to_string()),
        }
    }
}

/// JSON extractor whose rejections are rendered as [`ApiError`] bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections are rendered as [`ApiError`] bodies.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON extractor for update bodies, where an absent or blank body is allowed.
///
/// Yields `None` when the body is empty or only whitespace. A non-empty body
/// must carry a JSON content type and decode into `T`.
#[derive(Debug)]
pub struct OptionalApiJson<T>(pub Option<T>);

impl<T, S> FromRequest<S> for OptionalApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalApiJson(None));
        }
        if !is_json {
            return Err(ApiError::Validation(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(OptionalApiJson(Some(value)))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::get_tasks_handler,
        crate::task::api::create_task_handler,
        crate::task::api::update_task_handler,
        crate::session::api::get_sessions_handler,
        crate::session::api::create_session_handler,
        crate::note::api::get_notes_handler,
        crate::note::api::create_note_handler,
        crate::note::api::update_note_handler,
        crate::note::api::delete_note_handler,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "Tasks", description = "Study tasks"),
        (name = "Sessions", description = "Timed focus sessions"),
        (name = "Notes", description = "Freeform notes")
    )
)]
pub struct ApiDoc;

/// Builds the complete application router on top of the given storage.
pub fn create_app_router(storage: Arc<dyn Storage>) -> axum::Router {
    let state = AppState::new(storage);

    axum::Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let storage = JsonFileStorage::new(&config.data_dir);
    tracing::info!("Storing data in {}", storage.data_dir().display());

    let app = create_app_router(Arc::new(storage));

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

#[tracing::instrument]
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}
