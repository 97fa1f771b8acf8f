//! Pagesnap engine: fetch, extraction, archive storage and the capture pipeline.
mod archiver;
mod catalog;
mod decode;
mod document;
mod extract;
mod fetch;
mod persist;
mod store;
mod types;

pub use archiver::{Archiver, CaptureError, Clock, LoggingStageSink, StageSink};
pub use catalog::{list_entries, load_entry, CatalogSkip};
pub use decode::{decode_html, DecodedHtml};
pub use document::build_simplified_document;
pub use extract::{ExtractedPage, Extractor, FragmentExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use persist::{ensure_output_dir, is_work_dir, PersistError, StagingDir};
pub use store::{ArchiveStore, ArtifactPaths, FsArchiveStore, PendingEntry, StoredEntry};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
