use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
};

use crate::note::{Note, NoteDraft, NoteService};
use crate::web::{
    ApiError, ApiJson, AppState, ErrorResponse, OptionalApiJson, method_not_allowed_handler,
};

/// Handler for GET /api/notes - Returns all notes.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "Successfully retrieved notes", body = [Note])
    ),
    tag = "Notes"
)]
pub async fn get_notes_handler(State(state): State<AppState>) -> Json<Vec<Note>> {
    let service = NoteService::new(state.storage.as_ref());
    Json(service.get_all_notes())
}

/// Handler for POST /api/notes - Creates a new note.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = NoteDraft,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Title missing", body = ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn create_note_handler(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<NoteDraft>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let service = NoteService::new(state.storage.as_ref());
    let note = service.create_note(draft)?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Handler for PUT /api/notes/{id} - Replaces a note.
///
/// The id is resolved before the body is read, so an unknown id is always a 404.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "ID of the note to replace")
    ),
    request_body = NoteDraft,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 400, description = "Title missing", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn update_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<OptionalApiJson<NoteDraft>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    let service = NoteService::new(state.storage.as_ref());
    service.get_note_by_id(&id)?;
    let OptionalApiJson(draft) = body?;

    let note = service.update_note(&id, draft.unwrap_or_default())?;
    Ok(Json(note))
}

/// Handler for DELETE /api/notes/{id} - Deletes a note.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "ID of the note to delete")
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = NoteService::new(state.storage.as_ref());
    service.delete_note_by_id(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the notes API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(get_notes_handler).post(create_note_handler))
        .route(
            "/notes/{id}",
            put(update_note_handler).delete(delete_note_handler),
        )
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}
