//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use latchview_core::StreamOptions;

/// Monitor URL used when neither flag nor config provides one.
pub const DEFAULT_URL: &str = "http://localhost:8099";

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the lock monitor
    #[serde(default)]
    pub url: Option<String>,

    /// Delay between reconnect attempts, in seconds
    #[serde(default)]
    pub reconnect_delay_secs: Option<u64>,

    /// Maximum number of timeline events retained
    #[serde(default)]
    pub timeline_capacity: Option<usize>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("latchview")
            .join("config.toml")
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => {
                    eprintln!("Warning: {e:#}");
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Stream options derived from the config, defaults where unset.
    pub fn stream_options(&self) -> StreamOptions {
        let mut options = StreamOptions::default();
        if let Some(secs) = self.reconnect_delay_secs {
            options = options.with_reconnect_delay(Duration::from_secs(secs));
        }
        if let Some(capacity) = self.timeline_capacity {
            options = options.with_timeline_capacity(capacity);
        }
        options
    }
}

/// Resolve the monitor URL from flag, config, or default, in that order.
pub fn resolve_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.url.clone())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}
