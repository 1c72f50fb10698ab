//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventboard/config.toml` by default. Every section is optional;
//! missing values fall back to the defaults below. Command-line flags
//! override whatever the file says.

use std::path::{Path, PathBuf};

use eventboard_core::format::{
    DEFAULT_COMPACT_DESCRIPTION_LIMIT, DEFAULT_DESCRIPTION_LIMIT, DEFAULT_NO_EVENTS_TEXT,
};
use eventboard_core::{DEFAULT_PAGE_SIZE, TemporalMode};
use eventboard_providers::{DEFAULT_EVENTS_URL, HttpSourceConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Configuration for the eventboard client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Where events come from.
    pub source: SourceSettings,

    /// Default filter criteria.
    pub filters: FilterSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Event source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// List endpoint URL.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Local JSON file read instead of the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_EVENTS_URL.to_string(),
            timeout: HttpSourceConfig::DEFAULT_TIMEOUT_SECS,
            file: None,
        }
    }
}

/// Default filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Temporal mode: all, upcoming or past.
    pub when: TemporalMode,

    /// Country to restrict to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Events per page.
    pub page_size: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            when: TemporalMode::default(),
            country: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Description length on a card.
    pub description_limit: usize,

    /// Description length on a card with `--compact`.
    pub compact_description_limit: usize,

    /// Always use the compact layout.
    pub compact: bool,

    /// Text to show when no event matches.
    pub no_events_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            compact_description_limit: DEFAULT_COMPACT_DESCRIPTION_LIMIT,
            compact: false,
            no_events_text: DEFAULT_NO_EVENTS_TEXT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it does
    /// not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventboard")
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> ClientResult<()> {
        Url::parse(&self.source.url).map_err(|e| {
            ClientError::Config(format!("invalid source url {:?}: {}", self.source.url, e))
        })?;
        if self.source.timeout == 0 {
            return Err(ClientError::Config(
                "source timeout must be greater than 0".to_string(),
            ));
        }
        if self.filters.page_size == 0 {
            return Err(ClientError::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }
        if self.display.description_limit == 0 || self.display.compact_description_limit == 0 {
            return Err(ClientError::Config(
                "description limits must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
