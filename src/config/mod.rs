//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::calculate::AggregateOptions;
use crate::models::DensityThresholds;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Backend row-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Base URL of the hosted store
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, if the backend requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Table holding comp rows
    #[serde(default = "default_table")]
    pub table: String,

    /// Rows per page request
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Safety cap on total rows per mode
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_table() -> String {
    "comps".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_max_rows() -> usize {
    20_000
}

fn default_timeout() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            table: default_table(),
            page_size: default_page_size(),
            max_rows: default_max_rows(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Aggregation and recommendation tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Reject a record when unknown slots (of 6) reach this count
    #[serde(default = "default_unknown_limit")]
    pub unknown_limit: u32,

    /// Largest sample count classified low density
    #[serde(default = "default_density_low_max")]
    pub density_low_max: u32,

    /// Largest sample count classified medium density
    #[serde(default = "default_density_medium_max")]
    pub density_medium_max: u32,

    /// Minimum sample count for recommendation eligibility
    #[serde(default = "default_min_samples")]
    pub min_samples: u32,

    /// How long cached row snapshots stay fresh, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

fn default_unknown_limit() -> u32 {
    6
}

fn default_density_low_max() -> u32 {
    2
}

fn default_density_medium_max() -> u32 {
    6
}

fn default_min_samples() -> u32 {
    3
}

fn default_cache_ttl() -> u64 {
    900
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            unknown_limit: default_unknown_limit(),
            density_low_max: default_density_low_max(),
            density_medium_max: default_density_medium_max(),
            min_samples: default_min_samples(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

impl PipelineSettings {
    pub fn density_thresholds(&self) -> DensityThresholds {
        DensityThresholds {
            low_max: self.density_low_max,
            medium_max: self.density_medium_max,
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            unknown_limit: self.unknown_limit,
            density: self.density_thresholds(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate settings that serde defaults cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.source.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("source.base_url is not a URL: {e}"))
        })?;

        if self.source.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "source.page_size must be positive".to_string(),
            ));
        }
        if self.source.max_rows < self.source.page_size {
            return Err(ConfigError::ValidationError(
                "source.max_rows must be at least source.page_size".to_string(),
            ));
        }
        if self.pipeline.unknown_limit == 0 || self.pipeline.unknown_limit > 6 {
            return Err(ConfigError::ValidationError(
                "pipeline.unknown_limit must be within 1..=6".to_string(),
            ));
        }
        if self.pipeline.density_low_max >= self.pipeline.density_medium_max {
            return Err(ConfigError::ValidationError(
                "pipeline.density_low_max must be below density_medium_max".to_string(),
            ));
        }
        Ok(())
    }

    /// Source connection settings in the form the fetch layer wants.
    pub fn source_config(&self) -> Result<crate::fetch::SourceConfig, ConfigError> {
        let base_url = Url::parse(&self.source.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("source.base_url is not a URL: {e}"))
        })?;

        let mut config = crate::fetch::SourceConfig::new(base_url);
        config.table = self.source.table.clone();
        config.page_size = self.source.page_size;
        config.max_rows = self.source.max_rows;
        config.timeout = Duration::from_secs(self.source.timeout_seconds);
        if let Some(key) = &self.source.api_key {
            config = config.with_api_key(key.clone());
        }
        Ok(config)
    }
}
