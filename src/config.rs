//! Process-wide configuration.
//!
//! Loaded once by the binary and threaded explicitly into
//! [`HttpSources`](crate::source::HttpSources) and the logging setup. Nothing
//! in the pipeline reads configuration from global state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::PluginKind;

const CONFIG_FILE_NAME: &str = "lifestreams.toml";
const ENV_TWITTER_CONSUMER_KEY: &str = "LIFESTREAMS_TWITTER_CONSUMER_KEY";
const ENV_TWITTER_CONSUMER_SECRET: &str = "LIFESTREAMS_TWITTER_CONSUMER_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twitter: TwitterConfig,
    pub instagram: InstagramConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
    /// Plugin selector → display label.
    pub plugins: BTreeMap<String, String>,
}

/// App-level Twitter registration: one per deployment, shared by every
/// Twitter feed. User-level tokens live in each feed's credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub api_base: String,
    /// Tweets requested per poll.
    pub page_size: u32,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            api_base: "https://api.twitter.com/1.1".into(),
            page_size: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    pub api_base: String,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.instagram.com/v1".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Upper bound for one request, connect through body.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("lifestreams/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// `compact` or `json`.
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "compact".into(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `lifestreams.toml` in the
    /// user's config directory is used when present, otherwise defaults.
    /// Twitter consumer credentials may be overridden from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(key) = std::env::var(ENV_TWITTER_CONSUMER_KEY) {
            config.twitter.consumer_key = key;
        }
        if let Ok(secret) = std::env::var(ENV_TWITTER_CONSUMER_SECRET) {
            config.twitter.consumer_secret = secret;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Display label for a plugin, falling back to its built-in name.
    pub fn plugin_label(&self, kind: PluginKind) -> &str {
        self.plugins
            .get(kind.selector())
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_label())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lifestreams").join(CONFIG_FILE_NAME))
}
