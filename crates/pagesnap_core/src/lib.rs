//! Pagesnap core: archive data model, key derivation and the capture state machine.
mod artifact;
mod key;
mod record;
mod stage;
mod target;

pub use artifact::{Artifact, ArtifactLinks, DEFAULT_PUBLIC_PREFIX};
pub use key::{archive_key, is_valid_key, KEY_HASH_LEN, MAX_SANITIZED_LEN};
pub use record::{ArchiveRecord, CatalogEntry, Fragments, TITLE_FALLBACK};
pub use stage::CaptureStage;
pub use target::{validate_capture_url, UrlRejection};
