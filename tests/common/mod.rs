//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use trendlens::models::{
    DataProvenance, KeywordSeries, RegionalInterestSet, TrendDataset,
};
use trendlens::provider::{SeriesQuery, TrendsSource};
use trendlens::utils::error::{FetchError, PipelineError};

/// Provider timeline payload with one bucket per `(date, values)` entry
pub fn timeline_payload(keywords: &[&str], buckets: &[(&str, &[f64])]) -> Value {
    let timeline: Vec<Value> = buckets
        .iter()
        .map(|(date, values)| {
            let values: Vec<Value> = keywords
                .iter()
                .zip(values.iter())
                .map(|(query, value)| json!({ "query": query, "extracted_value": value }))
                .collect();
            json!({ "date": date, "values": values })
        })
        .collect();
    json!({ "interest_over_time": { "timeline_data": timeline } })
}

/// Provider regional payload
pub fn regional_payload(entries: &[(&str, f64)]) -> Value {
    let regions: Vec<Value> = entries
        .iter()
        .map(|(geo, value)| json!({ "geo": geo, "location": geo, "extracted_value": value }))
        .collect();
    json!({ "interest_by_region": regions })
}

/// Build a dataset from labels and named series
pub fn dataset(labels: &[&str], series: &[(&str, &[f64])]) -> TrendDataset {
    let mut dataset = TrendDataset::with_labels(labels.iter().map(|l| (*l).to_string()).collect());
    for (name, values) in series {
        dataset
            .push_series(KeywordSeries::new(*name, values.to_vec()))
            .unwrap();
    }
    dataset
}

fn echo_dataset(query: &SeriesQuery, values: &[f64]) -> TrendDataset {
    let labels = (1..=values.len()).map(|i| format!("d{i}")).collect();
    let mut dataset = TrendDataset::with_labels(labels);
    for keyword in &query.keywords {
        dataset
            .push_series(KeywordSeries::new(keyword.as_str(), values.to_vec()))
            .unwrap();
    }
    dataset
}

/// What a [`ScriptedSource`] answers
#[derive(Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Series named after the query keywords, all with these values
    Echo(Vec<f64>),
    Malformed,
    ServerError(u16),
}

impl<T: Clone> Reply<T> {
    fn resolve(&self) -> Result<T, FetchError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Echo(_) => Err(FetchError::Provider("echo is for series only".into())),
            Self::Malformed => Err(PipelineError::MalformedPayload("scripted".into()).into()),
            Self::ServerError(status) => Err(FetchError::ServerError(*status)),
        }
    }
}

/// Live-looking source with fixed answers and an optional per-keyword delay
pub struct ScriptedSource {
    pub series: Reply<TrendDataset>,
    pub regional: Reply<RegionalInterestSet>,
    /// Delay applied when the first keyword matches
    pub slow_keyword: Option<(String, Duration)>,
    pub series_calls: AtomicUsize,
    pub regional_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(series: Reply<TrendDataset>, regional: Reply<RegionalInterestSet>) -> Self {
        Self {
            series,
            regional,
            slow_keyword: None,
            series_calls: AtomicUsize::new(0),
            regional_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_slow_keyword(mut self, keyword: &str, delay: Duration) -> Self {
        self.slow_keyword = Some((keyword.to_string(), delay));
        self
    }

    async fn maybe_delay(&self, keyword: Option<&str>) {
        if let (Some((slow, delay)), Some(keyword)) = (&self.slow_keyword, keyword) {
            if slow == keyword {
                tokio::time::sleep(*delay).await;
            }
        }
    }
}

#[async_trait]
impl TrendsSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn provenance(&self) -> DataProvenance {
        DataProvenance::Live
    }

    async fn fetch_series(&self, query: &SeriesQuery) -> Result<TrendDataset, FetchError> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay(query.keywords.first()).await;
        match &self.series {
            Reply::Echo(values) => Ok(echo_dataset(query, values)),
            reply => reply.resolve(),
        }
    }

    async fn fetch_regional(&self, keyword: &str) -> Result<RegionalInterestSet, FetchError> {
        self.regional_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay(Some(keyword)).await;
        self.regional.resolve()
    }
}
