use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pagesnap_core::DEFAULT_PUBLIC_PREFIX;
use pagesnap_engine::{FetchSettings, DEFAULT_USER_AGENT};
use pagesnap_logging::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Server settings. Every field is optional in the RON file; missing ones
/// take the [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub archive_root: PathBuf,
    /// URL prefix under which artifacts are served and linked.
    pub public_prefix: String,
    pub user_agent: String,
    pub accept_language: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            bind: "0.0.0.0:3000".to_string(),
            archive_root: PathBuf::from("cloned_pages"),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: fetch.accept_language,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid with the RON file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.public_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "public_prefix must be an absolute path below /, got {:?}",
                self.public_prefix
            )));
        }
        if prefix == "/api" || prefix.starts_with("/api/") {
            return Err(ConfigError::Invalid(
                "public_prefix must not overlap the /api routes".to_string(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid("max_bytes must be positive".to_string()));
        }
        Ok(())
    }

    /// Prefix without a trailing slash, as used for routing.
    pub fn route_prefix(&self) -> &str {
        self.public_prefix.trim_end_matches('/')
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
