//! Error types for the trends pipeline
//!
//! This module defines the domain error types raised by the provider client
//! and the pipeline stages.

use thiserror::Error;

/// Errors that can occur while talking to the trends provider
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429 after all retries)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Provider reported an error in an otherwise successful response
    #[error("Provider error: {0}")]
    Provider(String),

    /// No API key configured for the live provider
    #[error("No API key configured for the trends provider")]
    MissingApiKey,

    /// Invalid provider URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The provider answered but the body was unusable
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl FetchError {
    /// Transient failures worth another attempt
    ///
    /// Retry on transport errors, timeouts, 429 and 500/502/503/504.
    /// Client errors (400, 401, 403, 404) and bad bodies are final.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Errors raised by the normalization and aggregation stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Provider payload is missing its top-level sequence
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Aggregation was handed a dataset without any values
    #[error("Dataset has no series or no data points")]
    EmptyDataset,
}
