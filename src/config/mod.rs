//! Configuration management for trendlens
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Provider credentials are only ever read from
//! here; nothing in the pipeline carries a literal key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::{Region, TimeRange};

/// Default provider endpoint (SerpApi-compatible Google Trends engine)
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Trends provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,

    /// API key; the live source cannot run without it
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retry attempts for transient failures
    pub max_retries: u32,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,

    /// User agent string
    pub user_agent: String,
}

/// Which data source the orchestrator is composed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Live provider with synthetic fallback
    #[default]
    Live,
    /// Synthetic data only, no network
    Synthetic,
}

impl SourceMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" | "real" => Some(Self::Live),
            "synthetic" | "mock" => Some(Self::Synthetic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Pipeline defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Data source strategy
    pub source: SourceMode,

    /// Time range used when none is given
    pub default_time_range: String,

    /// Region used when none is given
    pub default_region: String,

    /// Seed for reproducible synthetic data
    pub synthetic_seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: None,
            request_timeout_secs: 30,
            max_retries: 2,
            requests_per_second: 2,
            user_agent: format!("trendlens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ProviderConfig {
    /// Request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceMode::Live,
            default_time_range: String::from("past-3-months"),
            default_region: String::from("worldwide"),
            synthetic_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Without `TRENDLENS_API_KEY` the source defaults to synthetic unless
    /// `TRENDLENS_SOURCE` says otherwise.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = std::env::var("TRENDLENS_API_BASE_URL")
            .unwrap_or_else(|_| defaults.provider.base_url.clone());

        let api_key = std::env::var("TRENDLENS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let request_timeout_secs = std::env::var("TRENDLENS_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.provider.request_timeout_secs);

        let max_retries = std::env::var("TRENDLENS_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.provider.max_retries);

        let requests_per_second = std::env::var("TRENDLENS_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.provider.requests_per_second);

        let user_agent = std::env::var("TRENDLENS_USER_AGENT")
            .unwrap_or_else(|_| defaults.provider.user_agent.clone());

        let source = match std::env::var("TRENDLENS_SOURCE") {
            Ok(value) => SourceMode::parse(&value)
                .with_context(|| format!("Invalid TRENDLENS_SOURCE: {value}"))?,
            Err(_) if api_key.is_some() => SourceMode::Live,
            Err(_) => SourceMode::Synthetic,
        };

        let default_time_range = std::env::var("TRENDLENS_TIME_RANGE")
            .unwrap_or_else(|_| defaults.pipeline.default_time_range.clone());

        let default_region = std::env::var("TRENDLENS_REGION")
            .unwrap_or_else(|_| defaults.pipeline.default_region.clone());

        let synthetic_seed = std::env::var("TRENDLENS_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        let log_level =
            std::env::var("TRENDLENS_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("TRENDLENS_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            provider: ProviderConfig {
                base_url,
                api_key,
                request_timeout_secs,
                max_retries,
                requests_per_second,
                user_agent,
            },
            pipeline: PipelineConfig {
                source,
                default_time_range,
                default_region,
                synthetic_seed,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.provider.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.provider.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.provider.base_url)
            .with_context(|| format!("Invalid provider base_url: {}", self.provider.base_url))?;

        if TimeRange::parse(&self.pipeline.default_time_range).is_none() {
            anyhow::bail!(
                "Unknown default_time_range: {}",
                self.pipeline.default_time_range
            );
        }

        if Region::parse(&self.pipeline.default_region).is_none() {
            anyhow::bail!("Unknown default_region: {}", self.pipeline.default_region);
        }

        Ok(())
    }

    /// Parsed default time range
    #[must_use]
    pub fn default_time_range(&self) -> TimeRange {
        TimeRange::parse(&self.pipeline.default_time_range).unwrap_or_default()
    }

    /// Parsed default region
    #[must_use]
    pub fn default_region(&self) -> Region {
        Region::parse(&self.pipeline.default_region).unwrap_or_default()
    }
}
