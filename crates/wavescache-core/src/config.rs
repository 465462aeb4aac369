//! Application configuration management.
//!
//! Configuration is stored at `~/.config/wavescache/config.json`. Every field
//! has a default, so a missing file or a partial document is fine. Score
//! weights are validated while parsing; an invalid table fails the load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreWeights;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "wavescache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub server_id: String,
    pub overseas_server_id: String,
    pub request_timeout_secs: u64,
    /// Cached data older than this is considered stale.
    pub cache_expire_minutes: i64,
    /// Pause after the server-side refresh trigger.
    pub settle_delay_ms: u64,
    /// Pause between consecutive entity detail fetches.
    pub pacing_delay_ms: u64,
    pub top_n: usize,
    pub weights: ScoreWeights,
    pub cache_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.kurobbs.com".to_string(),
            server_id: "76402e5b20be2c39f095a152090afddc".to_string(),
            overseas_server_id: "919752ae5ea09c1ced910dd668a63ffb".to_string(),
            request_timeout_secs: 30,
            cache_expire_minutes: 60,
            settle_delay_ms: 1000,
            pacing_delay_ms: 500,
            top_n: 10,
            weights: ScoreWeights::default(),
            cache_dir: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn cache_max_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_expire_minutes)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}
