use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::DEFAULT_MATCH_THRESHOLD;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9999/graphql";
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const PER_KIND_FETCH_CAP: u32 = 10;
pub const MAX_DISPLAYED: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub debounce_ms: u64,
    pub per_kind_fetch_cap: u32,
    pub max_displayed: usize,
    pub match_threshold: f64,
    pub request_timeout_ms: u64,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            per_kind_fetch_cap: PER_KIND_FETCH_CAP,
            max_displayed: MAX_DISPLAYED,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            request_timeout_ms: 5_000,
            config_path: stable_app_data_dir().join("config.toml"),
        }
    }
}

/// Per-user data directory for config and logs.
pub fn stable_app_data_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share")))
    };
    base.unwrap_or_else(std::env::temp_dir).join("omnisearch")
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let endpoint = cfg.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::Invalid("endpoint is required".into()));
    }
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "endpoint must be an http(s) url, got '{endpoint}'"
        )));
    }
    if !(1..=100).contains(&cfg.per_kind_fetch_cap) {
        return Err(ConfigError::Invalid("per_kind_fetch_cap out of range".into()));
    }
    if !(1..=100).contains(&cfg.max_displayed) {
        return Err(ConfigError::Invalid("max_displayed out of range".into()));
    }
    if !(cfg.match_threshold > 0.0 && cfg.match_threshold <= 1.0) {
        return Err(ConfigError::Invalid("match_threshold must be in (0, 1]".into()));
    }
    if cfg.debounce_ms > 5_000 {
        return Err(ConfigError::Invalid("debounce_ms must be at most 5000".into()));
    }
    if cfg.request_timeout_ms < 100 {
        return Err(ConfigError::Invalid("request_timeout_ms must be at least 100".into()));
    }
    Ok(())
}

/// Reads the config at `path` (or the default location). A missing file
/// yields defaults; missing keys fall back to their defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut cfg = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw)?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_path,
                source,
            })
        }
    };
    cfg.config_path = config_path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let io_error = |source: std::io::Error| ConfigError::Io {
        path: cfg.config_path.clone(),
        source,
    };
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded).map_err(io_error)?;
    Ok(())
}
