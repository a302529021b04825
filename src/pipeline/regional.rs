//! Regional interest retrieval
//!
//! Asks the data source for per-country scores of one keyword. Any failure,
//! including a single unreadable entry or an empty answer, replaces the whole
//! result with synthetic scores for [`FALLBACK_COUNTRIES`]; live and
//! synthetic entries are never mixed.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::normalizer::parse_score;
use super::synthetic::{SyntheticSeriesGenerator, FALLBACK_COUNTRIES};
use crate::error::TrendlensErrorTrait;
use crate::metrics;
use crate::models::{RegionalInterestSet, Sourced};
use crate::provider::TrendsSource;
use crate::utils::error::PipelineError;

/// Parse the provider's `interest_by_region` array
///
/// The country code comes from `geo`, falling back to `location`. Values are
/// clamped into `[0, 100]`, a missing value scores 0 and repeated countries
/// keep their first score.
///
/// # Errors
///
/// Returns `PipelineError::MalformedPayload` when the array is missing or any
/// entry lacks a country.
pub fn parse_regional(payload: &Value) -> Result<RegionalInterestSet, PipelineError> {
    let entries = payload
        .get("interest_by_region")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PipelineError::MalformedPayload("interest_by_region missing".to_string())
        })?;

    let mut set = RegionalInterestSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let code = entry
            .get("geo")
            .and_then(Value::as_str)
            .or_else(|| entry.get("location").and_then(Value::as_str))
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                PipelineError::MalformedPayload(format!("region entry {index} has no country"))
            })?;

        let value = entry
            .get("extracted_value")
            .and_then(parse_score)
            .or_else(|| entry.get("value").and_then(parse_score))
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        if !set.insert(code, value) {
            debug!(country = code, "Duplicate region entry ignored");
        }
    }

    Ok(set)
}

/// Retrieves or synthesizes the regional snapshot for one keyword
pub struct RegionalInterestFetcher {
    source: Arc<dyn TrendsSource>,
    generator: SyntheticSeriesGenerator,
}

impl RegionalInterestFetcher {
    pub fn new(source: Arc<dyn TrendsSource>, generator: SyntheticSeriesGenerator) -> Self {
        Self { source, generator }
    }

    /// Always returns a fully populated set
    pub async fn fetch(&self, keyword: &str) -> Sourced<RegionalInterestSet> {
        match self.source.fetch_regional(keyword).await {
            Ok(set) if !set.is_empty() => {
                debug!(keyword, countries = set.len(), source = self.source.name(), "Regional interest fetched");
                Sourced {
                    data: set,
                    provenance: self.source.provenance(),
                }
            }
            Ok(_) => {
                warn!(keyword, "Provider returned no regions, using synthetic scores");
                self.fallback()
            }
            Err(e) => {
                warn!(
                    keyword,
                    error = %e,
                    category = %e.category(),
                    "Regional fetch failed, using synthetic scores"
                );
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> Sourced<RegionalInterestSet> {
        metrics::record_fallback("regional");
        let set = self.generator.regional();
        debug_assert_eq!(set.len(), FALLBACK_COUNTRIES.len());
        Sourced::synthetic(set)
    }
}
