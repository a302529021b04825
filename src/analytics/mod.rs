//! Analytics over normalized datasets

pub mod insights;
pub mod momentum;

pub use insights::InsightsAggregator;
pub use momentum::{momentum, KeywordMomentum, TrendDirection};
