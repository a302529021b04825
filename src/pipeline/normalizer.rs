//! Provider payload normalization
//!
//! Turns the provider's `interest_over_time.timeline_data` array into a
//! [`TrendDataset`] with one series per requested keyword. Labels are taken
//! verbatim and in payload order; a keyword missing from a bucket scores 0.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{KeywordList, KeywordSeries, TrendDataset};
use crate::utils::error::PipelineError;

/// One time bucket as sent by the provider
#[derive(Debug, Default, Deserialize)]
struct TimelineBucket {
    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    values: Vec<TimelineValue>,
}

/// One `{query, value}` pair inside a bucket
#[derive(Debug, Default, Deserialize)]
struct TimelineValue {
    #[serde(default)]
    query: Option<String>,

    #[serde(default)]
    value: Option<Value>,

    #[serde(default)]
    extracted_value: Option<Value>,
}

impl TimelineValue {
    fn score(&self) -> Option<f64> {
        self.extracted_value
            .as_ref()
            .and_then(parse_score)
            .or_else(|| self.value.as_ref().and_then(parse_score))
    }
}

/// Parse a provider score: numbers, numeric strings and the `"<1"` marker
pub(crate) fn parse_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s == "<1" {
                0.5
            } else {
                s.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };
    score.is_finite().then_some(score.max(0.0))
}

/// Converts raw provider payloads into datasets
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    /// Normalize a full provider response body
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MalformedPayload` if the timeline array is
    /// missing or is not an array.
    pub fn normalize(
        &self,
        keywords: &KeywordList,
        payload: &Value,
    ) -> Result<TrendDataset, PipelineError> {
        let timeline = payload
            .get("interest_over_time")
            .and_then(|section| section.get("timeline_data"));
        self.normalize_timeline(keywords, timeline)
    }

    /// Normalize the bare timeline array
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MalformedPayload` if `timeline` is absent or
    /// not an array.
    pub fn normalize_timeline(
        &self,
        keywords: &KeywordList,
        timeline: Option<&Value>,
    ) -> Result<TrendDataset, PipelineError> {
        let buckets = match timeline {
            Some(Value::Array(buckets)) => buckets,
            Some(other) => {
                return Err(PipelineError::MalformedPayload(format!(
                    "timeline is {}, expected an array",
                    json_kind(other)
                )))
            }
            None => {
                return Err(PipelineError::MalformedPayload(
                    "timeline data missing".to_string(),
                ))
            }
        };

        let buckets: Vec<TimelineBucket> = buckets
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                TimelineBucket::deserialize(raw).unwrap_or_else(|e| {
                    debug!(index, error = %e, "Unreadable timeline bucket, scoring as empty");
                    TimelineBucket {
                        date: raw.get("date").and_then(Value::as_str).map(str::to_string),
                        values: Vec::new(),
                    }
                })
            })
            .collect();

        let labels = buckets
            .iter()
            .map(|bucket| bucket.date.clone().unwrap_or_default())
            .collect();
        let mut dataset = TrendDataset::with_labels(labels);

        for keyword in keywords {
            let values = buckets
                .iter()
                .map(|bucket| {
                    bucket
                        .values
                        .iter()
                        .find(|v| v.query.as_deref() == Some(keyword.as_str()))
                        .and_then(TimelineValue::score)
                        .unwrap_or(0.0)
                })
                .collect();
            dataset.push_series(KeywordSeries::new(keyword.clone(), values))?;
        }

        debug!(
            buckets = dataset.len(),
            series = dataset.series.len(),
            "Normalized provider timeline"
        );
        Ok(dataset)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
