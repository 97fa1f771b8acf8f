//! Pagesnap HTTP front-end: capture, catalog and artifact serving.
mod app;
mod batch;
mod config;
pub mod routes;

pub use app::{build_app, build_archiver, AppState};
pub use batch::{capture_all, parse_url_list, BatchItem, BatchReport};
pub use config::{ConfigError, ServerConfig};
