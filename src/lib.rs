//! trendlens - Keyword interest trends pipeline
//!
//! Fetches "interest over time" series and per-country interest for a set of
//! search keywords, falls back to synthetic data whenever the provider cannot
//! deliver, and derives summary insights from the resulting dataset.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`provider`] - Data sources: live HTTP provider and synthetic source
//! - [`pipeline`] - Payload normalization, synthetic data, regional interest
//! - [`analytics`] - Insights aggregation and keyword momentum
//! - [`orchestrator`] - Search state machine and snapshot publication
//! - [`export`] - CSV and JSON rendering of snapshots
//! - [`models`] - Core data structures and types
//! - [`metrics`] - Prometheus counters for searches and fallbacks
//! - [`utils`] - Common utilities, retry and domain errors
//!
//! # Example
//!
//! ```no_run
//! use trendlens::config::Config;
//! use trendlens::models::{KeywordList, Region, TimeRange};
//! use trendlens::orchestrator::TrendsQueryOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let orchestrator = TrendsQueryOrchestrator::from_config(&config)?;
//!     let snapshot = orchestrator
//!         .search(KeywordList::parse("rust,go"), TimeRange::Past30Days, Region::Worldwide)
//!         .await;
//!     println!("{:?}", snapshot.insights);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod provider;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, TrendlensErrorTrait};
    pub use crate::models::{
        InsightsSummary, KeywordList, QuerySnapshot, QueryStatus, Region, TimeRange,
        TrendDataset,
    };
    pub use crate::orchestrator::TrendsQueryOrchestrator;
    pub use crate::provider::{SeriesQuery, TrendsSource};
}

// Direct re-exports for convenience
pub use models::{KeywordList, QuerySnapshot, QueryStatus, Region, TimeRange, TrendDataset};
pub use orchestrator::TrendsQueryOrchestrator;
