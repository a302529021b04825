//! Live trends provider client
//!
//! HTTP client for a SerpApi-compatible Google Trends endpoint with:
//! - Rate limiting with governor
//! - Retry with exponential backoff on 429 and transient 5xx
//! - Credentials injected from configuration
//!
//! Response bodies go through the [`SeriesNormalizer`] and
//! [`parse_regional`] before leaving this module.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;
use std::num::NonZeroU32;
use tracing::{debug, info};
use url::Url;

use super::{SeriesQuery, TrendsSource};
use crate::config::ProviderConfig;
use crate::metrics;
use crate::models::{DataProvenance, RegionalInterestSet, TrendDataset};
use crate::pipeline::normalizer::SeriesNormalizer;
use crate::pipeline::regional::parse_regional;
use crate::utils::error::{FetchError, PipelineError};
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Provider engine name
const ENGINE: &str = "google_trends";

/// Fixed window for the regional breakdown
const REGIONAL_WINDOW: &str = "today 12-m";

/// Live provider client
pub struct ProviderClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Backoff policy for transient failures
    retry: RetryConfig,

    /// Base URL without trailing slash
    base_url: String,

    /// API key; requests are refused locally without one
    api_key: Option<String>,

    normalizer: SeriesNormalizer,
}

impl ProviderClient {
    /// Create a client from provider configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        Self::with_retry_config(config, RetryConfig::new(config.max_retries))
    }

    /// Create a client with an explicit retry policy
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_retry_config(
        config: &ProviderConfig,
        retry: RetryConfig,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            normalizer: SeriesNormalizer,
        })
    }

    /// Create a client against a custom base URL (mock servers in tests)
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, api_key: Option<&str>) -> Result<Self, FetchError> {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            requests_per_second: 100,
            ..Default::default()
        };
        Self::with_retry_config(&config, RetryConfig::with_delays(2, 10, 50))
    }

    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key.as_deref().ok_or(FetchError::MissingApiKey)
    }

    fn endpoint(&self, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let endpoint = format!("{}/search", self.base_url);
        Url::parse_with_params(&endpoint, params)
            .map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))
    }

    /// URL of the interest-over-time request
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MissingApiKey` or `FetchError::InvalidUrl`
    pub fn series_url(&self, query: &SeriesQuery) -> Result<Url, FetchError> {
        let api_key = self.api_key()?;
        let keywords = query.keywords.joined(",");
        let date = query.time_range.provider_token();
        self.endpoint(&[
            ("engine", ENGINE),
            ("q", &keywords),
            ("date", &date),
            ("geo", query.region.geo_code()),
            ("data_type", "TIMESERIES"),
            ("api_key", api_key),
        ])
    }

    /// URL of the interest-by-region request
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MissingApiKey` or `FetchError::InvalidUrl`
    pub fn regional_url(&self, keyword: &str) -> Result<Url, FetchError> {
        let api_key = self.api_key()?;
        self.endpoint(&[
            ("engine", ENGINE),
            ("q", keyword),
            ("date", REGIONAL_WINDOW),
            ("data_type", "GEO_MAP_0"),
            ("api_key", api_key),
        ])
    }

    /// GET a JSON body with rate limiting and retry
    async fn get_json(&self, url: &Url, endpoint: &'static str) -> Result<Value, FetchError> {
        let _timer = metrics::start_provider_timer(endpoint);
        let client = self;
        with_retry_if(
            &self.retry,
            move || client.send_once(url),
            FetchError::is_recoverable,
        )
        .await
    }

    async fn send_once(&self, url: &Url) -> Result<Value, FetchError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimit);
        }
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::from(PipelineError::MalformedPayload(format!(
                    "response is not JSON: {e}"
                )))
            } else {
                map_transport_error(e)
            }
        })?;

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(FetchError::Provider(message.to_string()));
        }

        Ok(body)
    }
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}

#[async_trait]
impl TrendsSource for ProviderClient {
    fn name(&self) -> &'static str {
        "provider"
    }

    fn provenance(&self) -> DataProvenance {
        DataProvenance::Live
    }

    async fn fetch_series(&self, query: &SeriesQuery) -> Result<TrendDataset, FetchError> {
        let url = self.series_url(query)?;
        info!(
            keywords = %query.keywords.joined(","),
            range = %query.time_range,
            region = %query.region,
            "Fetching interest over time"
        );

        let body = self.get_json(&url, "series").await?;
        let dataset = self.normalizer.normalize(&query.keywords, &body)?;
        debug!(buckets = dataset.len(), "Provider series normalized");
        Ok(dataset)
    }

    async fn fetch_regional(&self, keyword: &str) -> Result<RegionalInterestSet, FetchError> {
        let url = self.regional_url(keyword)?;
        info!(keyword, "Fetching interest by region");

        let body = self.get_json(&url, "regional").await?;
        Ok(parse_regional(&body)?)
    }
}
