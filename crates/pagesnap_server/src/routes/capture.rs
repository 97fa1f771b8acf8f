use axum::{extract::State, http::StatusCode, Json};
use pagesnap_core::{ArtifactLinks, UrlRejection};
use pagesnap_engine::{CaptureError, LoggingStageSink};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<ArtifactLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            title: None,
            save_dir: None,
            key: None,
            files: None,
            error: Some(error.to_string()),
        }
    }
}

/// `POST /api/clone`
///
/// A missing body, malformed JSON and an empty `url` are all rejected with 400
/// before any network activity.
pub async fn capture_handler(
    State(state): State<AppState>,
    payload: Option<Json<CaptureRequest>>,
) -> (StatusCode, Json<CaptureResponse>) {
    let url = payload
        .and_then(|Json(req)| req.url)
        .filter(|url| !url.trim().is_empty());
    let Some(url) = url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(CaptureResponse::failure(UrlRejection::Empty)),
        );
    };

    match state.archiver.capture(&url, &LoggingStageSink).await {
        Ok(stored) => (
            StatusCode::OK,
            Json(CaptureResponse {
                success: true,
                title: Some(stored.title),
                save_dir: Some(stored.save_dir.display().to_string()),
                key: Some(stored.key),
                files: Some(stored.files),
                error: None,
            }),
        ),
        Err(err) => (status_for(&err), Json(CaptureResponse::failure(&err))),
    }
}

fn status_for(err: &CaptureError) -> StatusCode {
    match err {
        CaptureError::Rejected(_) => StatusCode::BAD_REQUEST,
        CaptureError::Fetch(_) => StatusCode::BAD_GATEWAY,
        CaptureError::Persist(_) | CaptureError::Aborted { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
