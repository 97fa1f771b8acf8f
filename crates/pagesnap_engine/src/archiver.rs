use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagesnap_core::{validate_capture_url, ArchiveRecord, CaptureStage, UrlRejection};
use pagesnap_logging::{snap_debug, snap_info, snap_warn};

use crate::decode::decode_html;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::persist::PersistError;
use crate::store::{ArchiveStore, PendingEntry, StoredEntry};
use crate::FetchError;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Observer of a capture's stage transitions.
pub trait StageSink: Send + Sync {
    fn on_stage(&self, url: &str, stage: CaptureStage);
}

/// Reports every transition to the log.
#[derive(Debug, Default)]
pub struct LoggingStageSink;

impl StageSink for LoggingStageSink {
    fn on_stage(&self, url: &str, stage: CaptureStage) {
        match stage {
            CaptureStage::Failed => snap_warn!("capture {} -> {}", url, stage),
            CaptureStage::Done => snap_info!("capture {} -> {}", url, stage),
            _ => snap_debug!("capture {} -> {}", url, stage),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Rejected(#[from] UrlRejection),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),
    #[error("{stage} task aborted: {message}")]
    Aborted {
        stage: CaptureStage,
        message: String,
    },
}

impl CaptureError {
    /// Stage the capture was in when it failed.
    pub fn stage(&self) -> CaptureStage {
        match self {
            CaptureError::Rejected(_) => CaptureStage::Received,
            CaptureError::Fetch(_) => CaptureStage::Fetching,
            CaptureError::Persist(_) => CaptureStage::Persisting,
            CaptureError::Aborted { stage, .. } => *stage,
        }
    }
}

/// Runs Fetcher → Extractor → ArchiveStore for one URL at a time.
///
/// Cheap to clone; concurrent captures share nothing but the store.
#[derive(Clone)]
pub struct Archiver {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn ArchiveStore>,
    clock: Clock,
}

impl Archiver {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn ArchiveStore> {
        &self.store
    }

    pub async fn capture(&self, url: &str, sink: &dyn StageSink) -> Result<StoredEntry, CaptureError> {
        let source_url = url.trim().to_string();
        sink.on_stage(&source_url, CaptureStage::Received);
        let result = self.run(&source_url, sink).await;
        match &result {
            Ok(_) => sink.on_stage(&source_url, CaptureStage::Done),
            Err(err) => {
                snap_warn!("capture of {:?} failed while {}: {}", source_url, err.stage(), err);
                sink.on_stage(&source_url, CaptureStage::Failed);
            }
        }
        result
    }

    async fn run(&self, source_url: &str, sink: &dyn StageSink) -> Result<StoredEntry, CaptureError> {
        validate_capture_url(source_url)?;

        sink.on_stage(source_url, CaptureStage::Fetching);
        let fetched = self.fetcher.fetch(source_url).await?;

        sink.on_stage(source_url, CaptureStage::Extracting);
        let extractor = self.extractor.clone();
        let (page, raw_document) = tokio::task::spawn_blocking(move || {
            let decoded = decode_html(&fetched.bytes, fetched.metadata.content_type.as_deref());
            (extractor.extract(&decoded.html), fetched.bytes)
        })
        .await
        .map_err(|err| CaptureError::Aborted {
            stage: CaptureStage::Extracting,
            message: err.to_string(),
        })?;
        snap_debug!("extracted {:?} from {}", page.title, source_url);

        sink.on_stage(source_url, CaptureStage::Persisting);
        let pending = PendingEntry {
            record: ArchiveRecord {
                source_url: source_url.to_string(),
                title: page.title,
                captured_at: (self.clock)(),
                fragments: page.fragments,
            },
            raw_document,
        };
        let store = self.store.clone();
        let stored = tokio::task::spawn_blocking(move || store.put(&pending))
            .await
            .map_err(|err| CaptureError::Aborted {
                stage: CaptureStage::Persisting,
                message: err.to_string(),
            })??;
        Ok(stored)
    }
}
