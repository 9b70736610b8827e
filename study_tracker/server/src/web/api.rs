use axum::Router;

use crate::web::AppState;

/// Creates the API routes for the JSON endpoints of every resource.
pub fn create_api_router(state: AppState) -> Router {
    let tasks_router = crate::task::api::create_api_router(state.clone());
    let sessions_router = crate::session::api::create_api_router(state.clone());
    let notes_router = crate::note::api::create_api_router(state);

    Router::new().nest(
        "/api",
        tasks_router.merge(sessions_router).merge(notes_router),
    )
}
