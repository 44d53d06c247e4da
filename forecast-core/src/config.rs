use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::service::FETCH_TIMEOUT;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// service_key = "..."
/// districts_path = "/var/lib/forecast/korea_districts.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Open-data portal service key (발급받은 서비스 키).
    pub service_key: Option<String>,

    /// Override for the forecast endpoint; the published URL when unset.
    pub base_url: Option<String>,

    /// Path to the district dataset asset.
    pub districts_path: Option<PathBuf>,

    /// Fetch deadline in seconds; 8 when unset.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// The service key, or an actionable error when none is configured.
    pub fn require_service_key(&self) -> Result<&str> {
        self.service_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No service key configured.\n\
                 Hint: set `service_key` in {} (a key is issued at data.go.kr).",
                Self::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            )
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.timeout_secs.map_or(FETCH_TIMEOUT, Duration::from_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-core", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
