//! Synthetic-only data source

use async_trait::async_trait;

use super::{SeriesQuery, TrendsSource};
use crate::models::{DataProvenance, RegionalInterestSet, TrendDataset};
use crate::pipeline::synthetic::SyntheticSeriesGenerator;
use crate::utils::error::FetchError;

/// Source that never touches the network
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    generator: SyntheticSeriesGenerator,
}

impl SyntheticSource {
    pub fn new(generator: SyntheticSeriesGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl TrendsSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn provenance(&self) -> DataProvenance {
        DataProvenance::Synthetic
    }

    async fn fetch_series(&self, query: &SeriesQuery) -> Result<TrendDataset, FetchError> {
        Ok(self.generator.generate(&query.keywords, query.time_range))
    }

    async fn fetch_regional(&self, _keyword: &str) -> Result<RegionalInterestSet, FetchError> {
        Ok(self.generator.regional())
    }
}
