//! Server configuration.

use agentwatch_core::{NarrativeThresholds, PresenceConfig, RegistryConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cadence of the presence re-evaluation ticker.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub narrative: NarrativeThresholds,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_max_workers() -> usize {
    RegistryConfig::default().max_workers
}

fn default_max_log_entries() -> usize {
    RegistryConfig::default().max_log_entries
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tick_interval_ms: default_tick_interval_ms(),
            max_workers: default_max_workers(),
            max_log_entries: default_max_log_entries(),
            presence: PresenceConfig::default(),
            narrative: NarrativeThresholds::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load config from `config/default.toml`, then the user config dir, or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/default.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    pub fn tick_interval(&self) -> Duration {
        // A zero period would panic in tokio::time::interval.
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_workers: self.max_workers,
            max_log_entries: self.max_log_entries.max(1),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agentwatch").join("config.toml"))
}
