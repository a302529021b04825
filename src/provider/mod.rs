//! Trends data sources
//!
//! The orchestrator is generic over [`TrendsSource`], the capability to fetch
//! a keyword time series and a regional breakdown. Two implementations are
//! provided:
//!
//! - [`ProviderClient`] - live HTTP provider
//! - [`SyntheticSource`] - synthetic data only, no network
//!
//! The concrete source is picked once at composition time with
//! [`build_source`].

pub mod client;
pub mod synthetic;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, SourceMode};
use crate::models::{DataProvenance, KeywordList, Region, RegionalInterestSet, TimeRange, TrendDataset};
use crate::pipeline::synthetic::SyntheticSeriesGenerator;
use crate::utils::error::FetchError;

pub use client::ProviderClient;
pub use synthetic::SyntheticSource;

/// Parameters of one time-series request
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub keywords: KeywordList,
    pub time_range: TimeRange,
    pub region: Region,
}

impl SeriesQuery {
    pub fn new(keywords: KeywordList, time_range: TimeRange, region: Region) -> Self {
        Self {
            keywords,
            time_range,
            region,
        }
    }
}

/// Capability to retrieve trends data
#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Provenance attached to data this source returns successfully
    fn provenance(&self) -> DataProvenance;

    /// Interest over time for every keyword of `query`
    async fn fetch_series(&self, query: &SeriesQuery) -> Result<TrendDataset, FetchError>;

    /// Interest by country for a single keyword over the past 12 months
    async fn fetch_regional(&self, keyword: &str) -> Result<RegionalInterestSet, FetchError>;
}

/// Build the data source selected by `config.pipeline.source`
///
/// # Errors
///
/// Returns `FetchError::Http` if the live HTTP client cannot be created.
pub fn build_source(config: &Config) -> Result<Arc<dyn TrendsSource>, FetchError> {
    match config.pipeline.source {
        SourceMode::Live => Ok(Arc::new(ProviderClient::new(&config.provider)?)),
        SourceMode::Synthetic => Ok(Arc::new(SyntheticSource::new(
            SyntheticSeriesGenerator::from_seed(config.pipeline.synthetic_seed),
        ))),
    }
}
