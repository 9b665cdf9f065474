//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables. Command-line flags are applied last by `cli`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB: &str = "CLASSWORK_DB";
pub const ENV_REPORTS_DIR: &str = "CLASSWORK_REPORTS_DIR";
pub const ENV_YANDEX_KEY: &str = "YANDEX_DICT_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// English definitions endpoint; the word is appended as a path segment.
    pub dictionary_url: String,
    /// Yandex Dictionary lookup endpoint used for Russian words.
    pub yandex_url: String,
    pub yandex_key: Option<String>,
    pub weather_url: String,
    pub rates_url: String,
    #[serde(with = "humantime_serde")]
    pub http_timeout: Duration,
    pub database: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary_url: "https://api.dictionaryapi.dev/api/v2/entries/en".into(),
            yandex_url: "https://dictionary.yandex.net/api/v1/dicservice.json/lookup".into(),
            yandex_key: None,
            weather_url: "https://api.open-meteo.com".into(),
            rates_url: "https://api.exchangerate-api.com/v4".into(),
            http_timeout: Duration::from_secs(10),
            database: data_dir().join("proposals.db"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("classwork")
}

/// Default location of the optional config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("classwork").join("config.toml"))
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default path is only read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: AppConfig =
            toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
            self.database = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_REPORTS_DIR).filter(|v| !v.trim().is_empty()) {
            self.reports_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(ENV_YANDEX_KEY).filter(|v| !v.trim().is_empty()) {
            self.yandex_key = Some(key);
        }
    }
}
