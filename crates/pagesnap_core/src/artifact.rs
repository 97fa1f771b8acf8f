use serde::{Deserialize, Serialize};

/// URL prefix under which archived artifacts are served.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/cloned";

/// The three files that make up one archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Raw response body, verbatim.
    Full,
    /// Document rebuilt from the extracted fragments.
    Simple,
    /// Metadata record; the source of truth for the entry.
    Info,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [Artifact::Full, Artifact::Simple, Artifact::Info];

    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Full => "full.html",
            Artifact::Simple => "simple.html",
            Artifact::Info => "info.json",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.file_name() == name)
    }
}

/// Caller-addressable locations of an entry's artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLinks {
    pub full: String,
    pub simple: String,
    pub info: String,
}

impl ArtifactLinks {
    /// Builds `{prefix}/{key}/{file}` links; a trailing `/` on `prefix` is ignored.
    pub fn for_key(prefix: &str, key: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let link = |artifact: Artifact| format!("{prefix}/{key}/{}", artifact.file_name());
        Self {
            full: link(Artifact::Full),
            simple: link(Artifact::Simple),
            info: link(Artifact::Info),
        }
    }
}
