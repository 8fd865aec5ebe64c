//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use movie_api::movies::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Backend API configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g. `http://127.0.0.1:8000/api/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Resolves the effective base URL.
    ///
    /// Precedence: `cli_override`, then `[api] base_url`, then the built-in default.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen value is not a valid URL.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<Url> {
        let raw = cli_override
            .or(self.api.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).with_context(|| format!("invalid base URL: {raw}"))
    }
}
