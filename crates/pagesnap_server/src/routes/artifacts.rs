use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use pagesnap_core::Artifact;
use pagesnap_logging::snap_error;

use crate::app::AppState;

/// `GET {public_prefix}/{key}/{file}`: archived artifact bytes, verbatim.
///
/// Only the three artifact names resolve; the store rejects malformed keys.
pub async fn serve_artifact(
    State(state): State<AppState>,
    Path((key, file)): Path<(String, String)>,
) -> Response {
    let Some(artifact) = Artifact::from_file_name(&file) else {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };

    let store = state.archiver.store().clone();
    let read = tokio::task::spawn_blocking(move || store.read_artifact(&key, artifact)).await;
    match read {
        Ok(Ok(Some(bytes))) => {
            let mime = mime_guess::from_path(artifact.file_name()).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response()
        }
        Ok(Ok(None)) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        Ok(Err(err)) => {
            snap_error!("failed to read artifact {}: {}", file, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            snap_error!("artifact read task failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
