//! Error reporting for the trendlens crate
//!
//! - [`TrendlensErrorTrait`] - user-facing message and category for log fields
//! - [`ErrorCategory`] - Classification of errors
//! - [`Error`] - errors of the export layer
//!
//! ```rust,ignore
//! use trendlens::error::TrendlensErrorTrait;
//!
//! warn!(error = %e, category = %e.category(), "Series fetch failed");
//! eprintln!("{}", e.user_message());
//! ```

use thiserror::Error;

pub use crate::utils::error::{FetchError, PipelineError};

/// Common interface of the crate's error types
pub trait TrendlensErrorTrait: std::error::Error {
    /// Short user-facing description
    fn user_message(&self) -> String;

    /// Error category, logged next to fallbacks
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// HTTP, timeout, rate limit, provider status
    Network,
    /// Provider payloads or JSON that could not be read
    Parsing,
    /// Normalization and aggregation errors
    Pipeline,
    /// Missing key or bad endpoint
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Pipeline => "pipeline",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TrendlensErrorTrait for FetchError {
    fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the trends provider".to_string(),
            Self::RateLimit => "Trends provider rate limit reached".to_string(),
            Self::ServerError(status) => format!("Trends provider answered with status {status}"),
            Self::Timeout => "Trends provider timed out".to_string(),
            Self::Provider(msg) => format!("Trends provider rejected the request: {msg}"),
            Self::MissingApiKey => "Set TRENDLENS_API_KEY to use live data".to_string(),
            Self::InvalidUrl(url) => format!("Invalid provider URL: {url}"),
            Self::Pipeline(e) => e.user_message(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingApiKey | Self::InvalidUrl(_) => ErrorCategory::Config,
            Self::Pipeline(e) => e.category(),
            _ => ErrorCategory::Network,
        }
    }
}

impl TrendlensErrorTrait for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::MalformedPayload(msg) => format!("Unreadable provider data: {msg}"),
            Self::EmptyDataset => "No data to summarize".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedPayload(_) => ErrorCategory::Parsing,
            Self::EmptyDataset => ErrorCategory::Pipeline,
        }
    }
}

/// Export failure
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrendlensErrorTrait for Error {
    fn user_message(&self) -> String {
        match self {
            Self::Pipeline(PipelineError::EmptyDataset) => {
                "The search produced no dataset to export".to_string()
            }
            Self::Pipeline(e) => e.user_message(),
            Self::Json(e) => format!("Could not encode the snapshot: {e}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Pipeline(e) => e.category(),
            Self::Json(_) => ErrorCategory::Parsing,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
