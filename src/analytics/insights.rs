//! Dataset insights: peak point, average interest and trending keyword

use tracing::debug;

use crate::models::{InsightsSummary, TrendDataset};
use crate::utils::error::PipelineError;

/// Computes an [`InsightsSummary`] from a dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightsAggregator;

impl InsightsAggregator {
    /// Aggregate a dataset in a single pass
    ///
    /// - the peak is the largest value over every series; ties keep the
    ///   first series, then the first index
    /// - the average is the mean of every value, flattened
    /// - the trending keyword has the largest per-series mean; ties keep the
    ///   first keyword
    ///
    /// An all-zero dataset is not an error: its peak is the first label.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::EmptyDataset` when there are no series or no
    /// series carries any value.
    pub fn aggregate(&self, dataset: &TrendDataset) -> Result<InsightsSummary, PipelineError> {
        let mut peak: Option<(f64, usize)> = None;
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut trending: Option<(f64, &str)> = None;

        for series in &dataset.series {
            if series.values.is_empty() {
                continue;
            }

            let mut series_sum = 0.0;
            for (index, &value) in series.values.iter().enumerate() {
                if peak.map_or(true, |(best, _)| value > best) {
                    peak = Some((value, index));
                }
                series_sum += value;
            }

            sum += series_sum;
            count += series.values.len();

            let series_mean = series_sum / series.values.len() as f64;
            if trending.map_or(true, |(best, _)| series_mean > best) {
                trending = Some((series_mean, series.name.as_str()));
            }
        }

        let ((peak_value, peak_index), (_, trending_keyword)) =
            peak.zip(trending).ok_or(PipelineError::EmptyDataset)?;

        let summary = InsightsSummary {
            peak_label: dataset.labels.get(peak_index).cloned().unwrap_or_default(),
            peak_value,
            average_interest: sum / count as f64,
            trending_keyword: trending_keyword.to_string(),
            total_points: dataset.labels.len(),
        };

        debug!(
            peak = %summary.peak_label,
            average = summary.average_interest,
            trending = %summary.trending_keyword,
            "Insights aggregated"
        );

        Ok(summary)
    }
}
