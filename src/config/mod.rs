
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::engine::client::{
    COMMAND_TIMEOUT, ClientSettings, DEFAULT_ENGINE_URL, PendingPolicy, RECONNECT_INTERVAL,
};

/// Environment variable overriding the configured engine endpoint
pub const ENGINE_URL_ENV: &str = "ARRANGER_ENGINE_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no config directory on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine_url: String,
    pub reconnect_interval_ms: u64,
    pub command_timeout_ms: u64,
    pub pending_policy: PendingPolicy,
    /// Default `env_logger` filter, `RUST_LOG` still wins
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            reconnect_interval_ms: RECONNECT_INTERVAL.as_millis() as u64,
            command_timeout_ms: COMMAND_TIMEOUT.as_millis() as u64,
            pending_policy: PendingPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from its default location, then apply the environment override.
    /// An unreadable file gives the defaults along with the error, so the
    /// caller can report it once logging is set up.
    pub fn load() -> (Self, Option<ConfigError>) {
        let (mut config, error) = Self::load_or_default(get_config_path().as_deref());
        config.apply_env_override(std::env::var(ENGINE_URL_ENV).ok());
        (config, error)
    }

    /// Defaults when `path` is absent or missing on disk
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        match path {
            Some(path) if path.exists() => match Self::load_from(path) {
                Ok(config) => (config, None),
                Err(err) => (Config::default(), Some(err)),
            },
            _ => (Config::default(), None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save config to its default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = get_config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Replace the engine endpoint with a non empty override
    pub fn apply_env_override(&mut self, url: Option<String>) {
        if let Some(url) = url.map(|u| u.trim().to_string())
            && !url.is_empty()
        {
            self.engine_url = url;
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            url: self.engine_url.clone(),
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            pending_policy: self.pending_policy,
        }
    }
}

/// Returns the configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "Arranger", "Arranger")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
}
