use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub sources: SourcesConfig,
    /// Human labels for group keys, used only to order groups for display
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Deadline for each individual HTTP request
    #[serde(with = "duration_serde::duration")]
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Records older than this are discarded on read
    #[serde(with = "duration_serde::duration")]
    pub ttl: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root for per-run scratch directories; the OS temp dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub genre_url: String,
    pub language_url: String,
    pub country_url: String,
    /// Metadata endpoint listing the per-country stream files
    pub streams_listing_url: String,
    /// Base URL the listed file names are fetched from
    pub streams_raw_url: String,
    pub playlist_extension: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_CACHE_ENABLED,
            path: std::env::temp_dir().join(DEFAULT_CACHE_FILE_NAME),
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            genre_url: DEFAULT_GENRE_URL.to_string(),
            language_url: DEFAULT_LANGUAGE_URL.to_string(),
            country_url: DEFAULT_COUNTRY_URL.to_string(),
            streams_listing_url: DEFAULT_STREAMS_LISTING_URL.to_string(),
            streams_raw_url: DEFAULT_STREAMS_RAW_URL.to_string(),
            playlist_extension: DEFAULT_PLAYLIST_EXTENSION.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl StorageConfig {
    pub fn scratch_root(&self) -> PathBuf {
        self.temp_path.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    /// Defaults, then the TOML file, then `IPTV_PLAYLISTS_*` environment variables.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref();
        if !config_file.exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
        }

        let config: Self = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.fetch.timeout.is_zero() {
            return Err(AppError::configuration("fetch.timeout must be greater than zero"));
        }
        if self.cache.ttl.is_zero() {
            return Err(AppError::configuration("cache.ttl must be greater than zero"));
        }
        if self.sources.playlist_extension.is_empty() {
            return Err(AppError::configuration(
                "sources.playlist_extension must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout, Duration::from_millis(2500));
        assert_eq!(config.cache.ttl, Duration::from_secs(86_400));
        assert_eq!(config.sources.playlist_extension, ".m3u");
        assert!(config.fetch.user_agent.starts_with("iptv-playlists/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.cache.ttl, DEFAULT_CACHE_TTL);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[fetch]"));
        assert!(written.contains("2s 500ms"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[fetch]
timeout = "10s"

[cache]
ttl = "1h"
enabled = false

[sources]
genre_url = "http://localhost/genre.m3u"

[labels]
us = "United States"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert!(!config.cache.enabled);
        assert_eq!(config.sources.genre_url, "http://localhost/genre.m3u");
        // untouched keys keep their defaults
        assert_eq!(config.sources.country_url, DEFAULT_COUNTRY_URL);
        assert_eq!(config.labels.get("us").map(String::as_str), Some("United States"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\ntimeout = 0\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }
}
