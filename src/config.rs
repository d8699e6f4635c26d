use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SweepError};
use crate::models::{Category, UNLIMITED_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Categories cleaned when the command line does not name any
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
    /// Per-category cap; 0 means effectively unlimited
    #[serde(default = "default_max_per_category")]
    pub max_per_category: u64,
    /// Pause between Gmail API calls, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            default_categories: default_categories(),
            max_per_category: default_max_per_category(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_token_cache_path")]
    pub token_cache_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_cache_path: default_token_cache_path(),
        }
    }
}

fn default_categories() -> Vec<String> {
    vec![
        "social".to_string(),
        "forums".to_string(),
        "promotions".to_string(),
        "updates".to_string(),
    ]
}

fn default_max_per_category() -> u64 {
    100
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_cache_path() -> PathBuf {
    PathBuf::from(".mailsweep/token.json")
}

impl CleanupConfig {
    /// Parse the configured default categories
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.default_categories
            .iter()
            .map(|name| name.parse())
            .collect()
    }

    /// Pause applied between Gmail API calls
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SweepError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| SweepError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SweepError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SweepError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| SweepError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.cleanup.default_categories.is_empty() {
            return Err(SweepError::ConfigError(
                "cleanup.default_categories cannot be empty".to_string(),
            ));
        }

        for name in &self.cleanup.default_categories {
            name.parse::<Category>().map_err(|_| {
                SweepError::ConfigError(format!(
                    "Invalid category '{}' in cleanup.default_categories",
                    name
                ))
            })?;
        }

        if self.cleanup.max_per_category > UNLIMITED_MAX {
            return Err(SweepError::ConfigError(format!(
                "cleanup.max_per_category cannot exceed {}",
                UNLIMITED_MAX
            )));
        }

        // More than 10s between calls makes large mailboxes take hours
        if self.cleanup.page_delay_ms > 10_000 {
            return Err(SweepError::ConfigError(
                "cleanup.page_delay_ms cannot exceed 10000".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
