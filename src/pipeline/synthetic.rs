//! Synthetic stand-in data
//!
//! Produces datasets and regional snapshots with the same shape as the
//! live ones when the provider cannot be used. Values are filler: a
//! per-keyword baseline plus bounded jitter, never negative.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::models::{
    Granularity, KeywordList, KeywordSeries, RegionalInterestSet, TimeRange, TrendDataset,
};

/// Country codes used when live regional data is unavailable
pub const FALLBACK_COUNTRIES: &[&str] = &["US", "GB", "CA", "DE", "FR", "JP", "IN", "BR", "AU", "IT"];

/// Baseline interest lies in `[BASELINE_MIN, BASELINE_MIN + BASELINE_SPAN)`
const BASELINE_MIN: f64 = 30.0;
const BASELINE_SPAN: f64 = 40.0;

/// Jitter lies in `[-JITTER_SPAN / 2, JITTER_SPAN / 2)`
const JITTER_SPAN: f64 = 30.0;

/// Generator for synthetic series and regional scores
#[derive(Debug, Clone, Default)]
pub struct SyntheticSeriesGenerator {
    /// Fixed seed for reproducible output; entropy when `None`
    seed: Option<u64>,
}

impl SyntheticSeriesGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose every call yields the same values
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Seeded when `seed` is set, entropy otherwise
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Generate a dataset ending today (local time)
    pub fn generate(&self, keywords: &KeywordList, range: TimeRange) -> TrendDataset {
        self.generate_at(keywords, range, Local::now().date_naive())
    }

    /// Generate a dataset whose last bucket is `anchor`
    pub fn generate_at(
        &self,
        keywords: &KeywordList,
        range: TimeRange,
        anchor: NaiveDate,
    ) -> TrendDataset {
        let labels = bucket_labels(range, anchor);
        let mut rng = self.rng();

        let series = keywords
            .iter()
            .map(|keyword| {
                let baseline = BASELINE_MIN + rng.gen::<f64>() * BASELINE_SPAN;
                let values = labels
                    .iter()
                    .map(|_| (baseline + (rng.gen::<f64>() - 0.5) * JITTER_SPAN).max(0.0))
                    .collect();
                KeywordSeries::new(keyword.clone(), values)
            })
            .collect();

        TrendDataset { labels, series }
    }

    /// Scores in `[0, 100)` for every fallback country
    pub fn regional(&self) -> RegionalInterestSet {
        let mut rng = self.rng();
        let mut set = RegionalInterestSet::new();
        for code in FALLBACK_COUNTRIES {
            set.insert(*code, f64::from(rng.gen_range(0u32..100)));
        }
        set
    }
}

/// Labels for `range`, oldest first, the last one at `anchor`
pub fn bucket_labels(range: TimeRange, anchor: NaiveDate) -> Vec<String> {
    let count = range.bucket_count();
    (0..count)
        .rev()
        .map(|offset| {
            let offset = offset as u32;
            match (range.granularity(), range) {
                (Granularity::Daily, TimeRange::Past7Days) => {
                    step_days(anchor, offset).format("%a, %b %-d").to_string()
                }
                (Granularity::Daily, _) => step_days(anchor, offset).format("%b %-d").to_string(),
                (Granularity::Monthly, _) => {
                    step_months(anchor, offset).format("%b %Y").to_string()
                }
            }
        })
        .collect()
}

fn step_days(anchor: NaiveDate, days: u32) -> NaiveDate {
    anchor
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(anchor)
}

fn step_months(anchor: NaiveDate, months: u32) -> NaiveDate {
    // Pin to the first of the month so short months never skip a label
    let first = anchor.with_day(1).unwrap_or(anchor);
    first
        .checked_sub_months(Months::new(months))
        .unwrap_or(first)
}
