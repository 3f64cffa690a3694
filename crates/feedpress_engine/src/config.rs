//! Run configuration: JSON by default, RON when the file ends in `.ron`.
use std::path::{Path, PathBuf};
use std::time::Duration;

use feedpress_core::{FeedSource, RunLimits, DEFAULT_SLUG_MAX_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{ExtractSettings, DEFAULT_CONTENT_SELECTORS};
use crate::fetch::{FetchSettings, BROWSER_USER_AGENT};
use crate::publish::{FirestoreSettings, DEFAULT_FIRESTORE_API_BASE};
use crate::rewrite::{GeminiSettings, RetryPolicy, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODELS};

/// Value shipped in sample configs; treated as "no key".
const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY_HERE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sources: Vec<FeedSource>,
    pub settings: Settings,
    pub extract: ExtractConfig,
    pub rewrite: RewriteConfig,
    pub store: Option<StoreConfig>,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub check_interval_minutes: u64,
    pub max_articles_per_run: usize,
    pub max_articles_per_source: usize,
    pub auto_publish: bool,
    pub continuous_mode: bool,
    pub entry_delay_secs: u64,
    pub error_cooldown_secs: u64,
    pub slug_max_len: usize,
    pub author: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval_minutes: 15,
            max_articles_per_run: 10,
            max_articles_per_source: 3,
            auto_publish: true,
            continuous_mode: false,
            entry_delay_secs: 5,
            error_cooldown_secs: 300,
            slug_max_len: DEFAULT_SLUG_MAX_LEN,
            author: "Editorial Desk".to_string(),
        }
    }
}

impl Settings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    pub fn entry_delay(&self) -> Duration {
        Duration::from_secs(self.entry_delay_secs)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_secs)
    }

    pub fn run_limits(&self) -> RunLimits {
        RunLimits {
            per_source: self.max_articles_per_source,
            per_run: self.max_articles_per_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_text_chars: usize,
    pub max_images: usize,
    pub trusted_image_hosts: Vec<String>,
    pub content_selectors: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_secs: 10,
            min_text_chars: 200,
            max_images: 5,
            trusted_image_hosts: Vec::new(),
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExtractConfig {
    pub fn page_fetch(&self) -> FetchSettings {
        FetchSettings::for_pages()
            .with_user_agent(self.user_agent.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn feed_fetch(&self) -> FetchSettings {
        FetchSettings::for_feeds()
            .with_user_agent(self.user_agent.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn extractor(&self) -> ExtractSettings {
        ExtractSettings {
            content_selectors: self.content_selectors.clone(),
            min_text_chars: self.min_text_chars,
            max_images: self.max_images,
            trusted_image_hosts: self.trusted_image_hosts.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub api_key: String,
    pub api_base: String,
    /// Priority order; the first model is tried first in every sweep.
    pub models: Vec<String>,
    pub rate_limit_delay_secs: u64,
    pub sweep_backoff_secs: u64,
    pub max_sweeps: usize,
    pub max_source_chars: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            models: DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
            rate_limit_delay_secs: 5,
            sweep_backoff_secs: 60,
            max_sweeps: 3,
            max_source_chars: 3000,
        }
    }
}

impl RewriteConfig {
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            rate_limit_delay: Duration::from_secs(self.rate_limit_delay_secs),
            sweep_backoff: Duration::from_secs(self.sweep_backoff_secs),
            max_sweeps: self.max_sweeps,
        }
    }

    /// One backend per configured model, in priority order.
    pub fn gemini_backends(&self) -> Vec<GeminiSettings> {
        self.models
            .iter()
            .map(|model| GeminiSettings {
                api_base: self.api_base.clone(),
                max_source_chars: self.max_source_chars,
                ..GeminiSettings::new(self.api_key.trim(), model.clone())
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub project_id: String,
    pub access_token: String,
    pub collection: String,
    pub api_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            access_token: String::new(),
            collection: "articles".to_string(),
            api_base: DEFAULT_FIRESTORE_API_BASE.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn firestore(&self) -> FirestoreSettings {
        FirestoreSettings {
            api_base: self.api_base.clone(),
            collection: self.collection.clone(),
            ..FirestoreSettings::new(self.project_id.clone(), self.access_token.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub ledger: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ledger: PathBuf::from("processed.json"),
            output: PathBuf::from("articles_to_import.json"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        let parsed = if is_ron {
            ron::from_str::<Config>(&text).map_err(|err| err.to_string())
        } else {
            serde_json::from_str::<Config>(&text).map_err(|err| err.to_string())
        };
        let config = parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(source) = self.sources.iter().find(|s| s.feed_url.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "source {:?} has no feed url",
                source.name
            )));
        }
        if self.settings.max_articles_per_source == 0 || self.settings.max_articles_per_run == 0 {
            return Err(ConfigError::Invalid(
                "article caps must be at least 1".to_string(),
            ));
        }
        if let Some(store) = &self.store {
            if store.project_id.trim().is_empty() {
                return Err(ConfigError::Invalid("store.project_id is empty".to_string()));
            }
        }
        Ok(())
    }
}
