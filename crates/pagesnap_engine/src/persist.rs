use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pagesnap_core::Artifact;
use pagesnap_logging::{snap_error, snap_warn};
use tempfile::TempDir;
use thiserror::Error;

const STAGING_PREFIX: &str = ".staging-";
const RETIRED_PREFIX: &str = ".retired-";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("archive directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("failed to encode metadata record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// A hidden directory under the archive root collecting one entry's artifacts
/// before they become visible. Dropping it without [`StagingDir::commit`]
/// removes everything written so far.
pub struct StagingDir {
    root: PathBuf,
    dir: TempDir,
}

impl StagingDir {
    pub fn new_in(root: &Path) -> Result<Self, PersistError> {
        ensure_output_dir(root)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(root)
            .map_err(|e| PersistError::OutputDir(e.to_string()))?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write and fsync one artifact inside the staging directory.
    pub fn write(&self, artifact: Artifact, content: &[u8]) -> Result<(), PersistError> {
        let mut file = File::create(self.dir.path().join(artifact.file_name()))?;
        file.write_all(content)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    /// Move the staged entry to `{root}/{name}`, replacing any previous entry.
    ///
    /// The old directory is renamed aside before the new one is renamed in, so a
    /// concurrent reader sees the old entry, no entry, or the new entry; never a mix.
    pub fn commit(self, name: &str) -> Result<PathBuf, PersistError> {
        let target = self.root.join(name);
        let retired = if target.exists() {
            let holder = tempfile::Builder::new()
                .prefix(RETIRED_PREFIX)
                .tempdir_in(&self.root)?;
            let parked = holder.path().join(name);
            fs::rename(&target, &parked)?;
            Some((holder, parked))
        } else {
            None
        };

        if let Err(err) = fs::rename(self.dir.path(), &target) {
            if let Some((holder, parked)) = retired {
                restore_retired(holder, &parked, &target);
            }
            return Err(err.into());
        }
        // `self.dir` now points at a moved path; its drop cleanup is a no-op.
        // The retired holder drops here and deletes the previous entry.
        Ok(target)
    }
}

/// Put a parked entry back after a failed commit. If that fails too, the
/// holder is kept on disk so the previous entry is never deleted silently.
fn restore_retired(holder: TempDir, parked: &Path, target: &Path) {
    match fs::rename(parked, target) {
        Ok(()) => snap_warn!("commit of {:?} failed, previous entry restored", target),
        Err(err) => {
            let kept = holder.keep();
            snap_error!(
                "commit of {:?} failed and the previous entry could not be restored ({}); it is kept in {:?}",
                target,
                err,
                kept
            );
        }
    }
}

/// True for the hidden working directories created by [`StagingDir`].
pub fn is_work_dir(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) || name.starts_with(RETIRED_PREFIX)
}
