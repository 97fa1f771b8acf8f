use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pagesnap_core::CatalogEntry;
use pagesnap_logging::snap_error;
use serde_json::json;

use crate::app::AppState;

/// `GET /api/cloned-pages`: every valid entry, newest capture first.
pub async fn listing_handler(State(state): State<AppState>) -> Response {
    let store = state.archiver.store().clone();
    match tokio::task::spawn_blocking(move || store.list()).await {
        Ok(mut entries) => {
            CatalogEntry::sort_newest_first(&mut entries);
            Json(entries).into_response()
        }
        Err(err) => {
            snap_error!("catalog listing task failed: {}", err);
            // The listing never fails as a whole.
            Json(Vec::<CatalogEntry>::new()).into_response()
        }
    }
}

/// `GET /api/cloned-pages/{key}`
pub async fn entry_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let store = state.archiver.store().clone();
    let lookup_key = key.clone();
    match tokio::task::spawn_blocking(move || store.get(&lookup_key)).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": format!("no archive entry {key}") })),
        )
            .into_response(),
        Err(err) => {
            snap_error!("catalog lookup task failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
