//! Application setup and router construction.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use pagesnap_engine::{Archiver, FragmentExtractor, FsArchiveStore, ReqwestFetcher};
use pagesnap_logging::{snap_info, snap_warn};
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::routes::{
    capture_handler, entry_handler, index_handler, info_handler, listing_handler, serve_artifact,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub archiver: Archiver,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(archiver: Archiver, config: ServerConfig) -> Self {
        Self {
            archiver,
            config: Arc::new(config),
        }
    }

    /// Production wiring: reqwest fetcher, fragment extractor, filesystem store.
    pub fn from_config(config: ServerConfig) -> Self {
        Self::new(build_archiver(&config), config)
    }
}

pub fn build_archiver(config: &ServerConfig) -> Archiver {
    Archiver::new(
        Arc::new(ReqwestFetcher::new(config.fetch_settings())),
        Arc::new(FragmentExtractor),
        Arc::new(FsArchiveStore::new(
            config.archive_root.clone(),
            config.route_prefix(),
        )),
    )
}

/// Build the axum router
///
/// Routes:
/// - `GET /` capture form
/// - `POST /api/clone` capture a URL
/// - `GET /api/cloned-pages[/{key}]` catalog
/// - `GET /api/info` server status
/// - `GET {public_prefix}/{key}/{file}` archived artifacts
pub fn build_app(state: AppState) -> Router {
    let artifact_route = format!("{}/:key/:file", state.config.route_prefix());

    Router::new()
        .route("/", get(index_handler))
        .route("/api/clone", post(capture_handler))
        .route("/api/cloned-pages", get(listing_handler))
        .route("/api/cloned-pages/:key", get(entry_handler))
        .route("/api/info", get(info_handler))
        .route(&artifact_route, get(serve_artifact))
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        snap_warn!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed_ms);
    } else {
        snap_info!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed_ms);
    }
    response
}
