//! Data-shaping stages of the trends pipeline
//!
//! - [`normalizer`] - provider payload to [`TrendDataset`](crate::models::TrendDataset)
//! - [`synthetic`] - stand-in datasets and regional scores
//! - [`regional`] - per-country interest with synthetic fallback

pub mod normalizer;
pub mod regional;
pub mod synthetic;

pub use normalizer::SeriesNormalizer;
pub use regional::{parse_regional, RegionalInterestFetcher};
pub use synthetic::{bucket_labels, SyntheticSeriesGenerator, FALLBACK_COUNTRIES};
