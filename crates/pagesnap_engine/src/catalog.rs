use std::fs;
use std::io;
use std::path::Path;

use pagesnap_core::{is_valid_key, ArchiveRecord, Artifact, ArtifactLinks, CatalogEntry};
use pagesnap_logging::{snap_debug, snap_warn};
use thiserror::Error;

use crate::persist::is_work_dir;

/// Why a directory under the archive root is not a valid entry.
#[derive(Debug, Error)]
pub enum CatalogSkip {
    #[error("not an archive key")]
    ForeignName,
    #[error("missing artifact {0}")]
    MissingArtifact(&'static str),
    #[error("unreadable metadata record: {0}")]
    Unreadable(#[from] io::Error),
    #[error("malformed metadata record: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CatalogSkip {
    /// True when the directory looks like an entry but is incomplete or
    /// corrupt, as opposed to something that was never an entry.
    pub fn is_damage(&self) -> bool {
        !matches!(self, CatalogSkip::ForeignName)
    }
}

/// Enumerate every valid entry under `root`, in directory order.
///
/// Invalid entries are logged and left out; a missing root is an empty archive.
pub fn list_entries(root: &Path, public_prefix: &str) -> Vec<CatalogEntry> {
    let dir = match fs::read_dir(root) {
        Ok(dir) => dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            snap_debug!("archive root {:?} does not exist yet", root);
            return Vec::new();
        }
        Err(err) => {
            snap_warn!("failed to list archive root {:?}: {}", root, err);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for dirent in dir.filter_map(|e| e.ok()) {
        if !dirent.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = dirent.file_name().to_string_lossy().into_owned();
        if is_work_dir(&name) {
            continue;
        }
        match load_entry(root, &name, public_prefix) {
            Ok(entry) => entries.push(entry),
            Err(skip) if skip.is_damage() => {
                snap_warn!("skipping archive entry {:?}: {}", name, skip)
            }
            Err(skip) => snap_debug!("ignoring {:?} under archive root: {}", name, skip),
        }
    }
    entries
}

/// Load one entry; every artifact must exist and the record must parse.
pub fn load_entry(root: &Path, key: &str, public_prefix: &str) -> Result<CatalogEntry, CatalogSkip> {
    if !is_valid_key(key) {
        return Err(CatalogSkip::ForeignName);
    }
    let dir = root.join(key);
    for artifact in Artifact::ALL {
        if !dir.join(artifact.file_name()).is_file() {
            return Err(CatalogSkip::MissingArtifact(artifact.file_name()));
        }
    }
    let content = fs::read_to_string(dir.join(Artifact::Info.file_name()))?;
    let record: ArchiveRecord = serde_json::from_str(&content)?;
    Ok(CatalogEntry {
        key: key.to_string(),
        record,
        files: ArtifactLinks::for_key(public_prefix, key),
    })
}
