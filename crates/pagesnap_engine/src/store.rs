use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use pagesnap_core::{archive_key, is_valid_key, ArchiveRecord, Artifact, ArtifactLinks, CatalogEntry};
use pagesnap_logging::{snap_debug, snap_info};

use crate::catalog::{list_entries, load_entry};
use crate::document::build_simplified_document;
use crate::persist::{PersistError, StagingDir};

/// Everything needed to write one archive entry.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub record: ArchiveRecord,
    pub raw_document: Vec<u8>,
}

/// On-disk locations of a stored entry's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub full: PathBuf,
    pub simple: PathBuf,
    pub info: PathBuf,
}

impl ArtifactPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            full: dir.join(Artifact::Full.file_name()),
            simple: dir.join(Artifact::Simple.file_name()),
            info: dir.join(Artifact::Info.file_name()),
        }
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: String,
    pub title: String,
    pub captured_at: DateTime<Utc>,
    pub save_dir: PathBuf,
    pub paths: ArtifactPaths,
    pub files: ArtifactLinks,
}

/// Repository of archive entries, keyed by [`archive_key`].
pub trait ArchiveStore: Send + Sync {
    /// Write or fully replace the entry for `entry.record.source_url`.
    fn put(&self, entry: &PendingEntry) -> Result<StoredEntry, PersistError>;

    /// All valid entries; invalid ones are skipped, never reported.
    fn list(&self) -> Vec<CatalogEntry>;

    fn get(&self, key: &str) -> Option<CatalogEntry>;

    /// Raw artifact bytes, `None` when the key or file does not exist.
    fn read_artifact(&self, key: &str, artifact: Artifact) -> Result<Option<Vec<u8>>, PersistError>;
}

/// Filesystem archive: one directory per key under `root`.
pub struct FsArchiveStore {
    root: PathBuf,
    public_prefix: String,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FsArchiveStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Keys with a write in flight.
    pub fn active_key_locks(&self) -> usize {
        self.key_locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Forget the lock for `key` once no other writer holds a handle to it.
    ///
    /// Handles are only cloned under the map lock, so the count is stable here.
    fn release_key_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }
}

impl ArchiveStore for FsArchiveStore {
    fn put(&self, entry: &PendingEntry) -> Result<StoredEntry, PersistError> {
        let record = &entry.record;
        let key = archive_key(&record.source_url);
        let simplified = build_simplified_document(&record.title, &record.fragments);
        let info = serde_json::to_vec_pretty(record)?;

        // Staging needs no lock; only the swap into place is serialized.
        let staging = StagingDir::new_in(&self.root)?;
        staging.write(Artifact::Full, &entry.raw_document)?;
        staging.write(Artifact::Simple, simplified.as_bytes())?;
        staging.write(Artifact::Info, &info)?;
        snap_debug!("staged {} in {:?}", key, staging.path());

        let lock = self.key_lock(&key);
        let committed = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            staging.commit(&key)
        };
        self.release_key_lock(&key, lock);
        let save_dir = committed?;
        snap_info!("archived {} as {:?}", record.source_url, save_dir);

        Ok(StoredEntry {
            key: key.clone(),
            title: record.title.clone(),
            captured_at: record.captured_at,
            paths: ArtifactPaths::in_dir(&save_dir),
            save_dir,
            files: ArtifactLinks::for_key(&self.public_prefix, &key),
        })
    }

    fn list(&self) -> Vec<CatalogEntry> {
        list_entries(&self.root, &self.public_prefix)
    }

    fn get(&self, key: &str) -> Option<CatalogEntry> {
        match load_entry(&self.root, key, &self.public_prefix) {
            Ok(entry) => Some(entry),
            Err(skip) => {
                snap_debug!("entry {:?} unavailable: {}", key, skip);
                None
            }
        }
    }

    fn read_artifact(&self, key: &str, artifact: Artifact) -> Result<Option<Vec<u8>>, PersistError> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        match fs::read(self.root.join(key).join(artifact.file_name())) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
