use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ArtifactLinks;

/// Title recorded when the captured document has none.
pub const TITLE_FALLBACK: &str = "Untitled";

/// Markup fragments pulled out of a captured document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragments {
    pub head: String,
    pub header: String,
    pub body: String,
}

/// The metadata record persisted as `info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    #[serde(rename = "url")]
    pub source_url: String,
    pub title: String,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fragments: Fragments,
}

/// A valid catalog entry: the metadata record plus its identity and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    #[serde(flatten)]
    pub record: ArchiveRecord,
    pub files: ArtifactLinks,
}

impl CatalogEntry {
    /// Orders entries newest capture first; ties keep key order.
    pub fn sort_newest_first(entries: &mut [CatalogEntry]) {
        entries.sort_by(|a, b| {
            b.record
                .captured_at
                .cmp(&a.record.captured_at)
                .then_with(|| a.key.cmp(&b.key))
        });
    }
}
