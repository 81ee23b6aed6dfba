use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub cache: CacheConfig,

    pub export: ExportConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Overridden by the `DB_URL` environment variable.
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// Connection attempts at start-up before giving up.
    pub connect_retries: u32,

    pub connect_retry_delay_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/milaniume.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            connect_retries: constants::database::DEFAULT_CONNECT_RETRIES,
            connect_retry_delay_seconds: constants::database::DEFAULT_CONNECT_RETRY_DELAY_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Overridden by the `PORT` environment variable.
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "https://milaniume-property.vercel.app".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,

    /// Store the listing on a cache miss. When false the cache is only ever
    /// cleared, never filled, and every listing reads the store.
    pub populate_on_read: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: constants::cache::DEFAULT_TTL_SECONDS,
            populate_on_read: true,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Fixed UTC offset, in minutes, used to decide which calendar day a
    /// submission falls on.
    pub utc_offset_minutes: i32,
}

impl ExportConfig {
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "milaniume".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// `DB_URL` and `PORT` take precedence over the file.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("DB_URL").filter(|v| !v.trim().is_empty()) {
            self.general.database_url = url;
        }

        if let Some(port) = var("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("milaniume").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".milaniume").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.cache.ttl_seconds == 0 {
            anyhow::bail!("Cache TTL must be > 0");
        }

        // FixedOffset accepts strictly less than a day either way.
        if self.export.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            anyhow::bail!(
                "Export UTC offset must be within ±1439 minutes, got {}",
                self.export.utc_offset_minutes
            );
        }

        Ok(())
    }
}
