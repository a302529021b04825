// Core data structures for the trends pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::PipelineError;
use crate::utils::normalize_whitespace;

/// Ordered, de-duplicated list of search keywords
///
/// Entries are trimmed, comma-separated input is split, blanks are dropped
/// and duplicates keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordList(Vec<String>);

impl KeywordList {
    /// Build from raw user entries
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::new();
        for entry in raw {
            for part in entry.as_ref().split(',') {
                let keyword = normalize_whitespace(part);
                if !keyword.is_empty() && !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
        }
        Self(keywords)
    }

    /// Parse a single comma-separated string
    pub fn parse(input: &str) -> Self {
        Self::new([input])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// The keyword that drives the regional map
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Join keywords with a separator (provider query, export file names)
    pub fn joined(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl From<Vec<String>> for KeywordList {
    fn from(raw: Vec<String>) -> Self {
        Self::new(raw)
    }
}

impl From<KeywordList> for Vec<String> {
    fn from(keywords: KeywordList) -> Self {
        keywords.0
    }
}

impl<'a> IntoIterator for &'a KeywordList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Bucket granularity of a time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Monthly,
}

/// Time window requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Past7Days,
    Past30Days,
    Past3Months,
    Past12Months,
    Past5Years,
    /// Explicit bounds are forwarded to the live provider when both are set
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Past3Months
    }
}

impl TimeRange {
    /// Parse a human token (`past-7-days`), a provider token (`now 7-d`)
    /// or an explicit `YYYY-MM-DD YYYY-MM-DD` window
    pub fn parse(s: &str) -> Option<Self> {
        let token = s.trim().to_lowercase();
        match token.as_str() {
            "past-7-days" | "7d" | "now 7-d" => Some(Self::Past7Days),
            "past-30-days" | "30d" | "now 1-m" | "today 1-m" => Some(Self::Past30Days),
            "past-3-months" | "3m" | "now 3-m" | "today 3-m" => Some(Self::Past3Months),
            "past-12-months" | "12m" | "now 12-m" | "today 12-m" => Some(Self::Past12Months),
            "past-5-years" | "5y" | "today 5-y" => Some(Self::Past5Years),
            "custom" => Some(Self::Custom {
                start: None,
                end: None,
            }),
            other => {
                let (start, end) = other.split_once(' ')?;
                let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
                let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
                (start <= end).then_some(Self::Custom {
                    start: Some(start),
                    end: Some(end),
                })
            }
        }
    }

    /// Human token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past7Days => "past-7-days",
            Self::Past30Days => "past-30-days",
            Self::Past3Months => "past-3-months",
            Self::Past12Months => "past-12-months",
            Self::Past5Years => "past-5-years",
            Self::Custom { .. } => "custom",
        }
    }

    /// Date token sent to the trends provider
    pub fn provider_token(&self) -> String {
        match self {
            Self::Past7Days => "now 7-d".to_string(),
            Self::Past30Days => "today 1-m".to_string(),
            Self::Past3Months => "today 3-m".to_string(),
            Self::Past12Months => "today 12-m".to_string(),
            Self::Past5Years => "today 5-y".to_string(),
            Self::Custom {
                start: Some(start),
                end: Some(end),
            } => format!("{} {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
            Self::Custom { .. } => "today 3-m".to_string(),
        }
    }

    /// Granularity used for synthetic buckets
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Past7Days | Self::Past30Days => Granularity::Daily,
            _ => Granularity::Monthly,
        }
    }

    /// Number of synthetic buckets
    pub fn bucket_count(&self) -> usize {
        match self {
            Self::Past7Days => 7,
            Self::Past30Days => 30,
            _ => 12,
        }
    }

    /// Get all fixed ranges
    pub fn all() -> Vec<Self> {
        vec![
            Self::Past7Days,
            Self::Past30Days,
            Self::Past3Months,
            Self::Past12Months,
            Self::Past5Years,
            Self::Custom {
                start: None,
                end: None,
            },
        ]
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Region filter for the time-series request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Worldwide,
    /// Two-letter country code, upper case
    Country(String),
}

impl Region {
    /// Parse `worldwide` (or empty) or a two-letter country code
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("worldwide") {
            return Some(Self::Worldwide);
        }
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(Self::Country(trimmed.to_ascii_uppercase()));
        }
        None
    }

    /// Value of the provider `geo` parameter (empty for worldwide)
    pub fn geo_code(&self) -> &str {
        match self {
            Self::Worldwide => "",
            Self::Country(code) => code,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Worldwide => write!(f, "worldwide"),
            Self::Country(code) => write!(f, "{code}"),
        }
    }
}

/// One keyword's interest values, aligned with the dataset labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl KeywordSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Uniform multi-series dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendDataset {
    pub labels: Vec<String>,
    pub series: Vec<KeywordSeries>,
}

impl TrendDataset {
    /// Create a dataset with labels and no series yet
    pub fn with_labels(labels: Vec<String>) -> Self {
        Self {
            labels,
            series: Vec::new(),
        }
    }

    /// Append a series, rejecting one whose length differs from the labels
    pub fn push_series(&mut self, series: KeywordSeries) -> Result<(), PipelineError> {
        if series.values.len() != self.labels.len() {
            return Err(PipelineError::MalformedPayload(format!(
                "series '{}' has {} values for {} labels",
                series.name,
                series.values.len(),
                self.labels.len()
            )));
        }
        self.series.push(series);
        Ok(())
    }

    /// Number of time buckets
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }

    /// Check the length invariant for every series
    pub fn is_consistent(&self) -> bool {
        self.series
            .iter()
            .all(|s| s.values.len() == self.labels.len())
    }

    /// Series names in order
    pub fn keywords(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Derived analytical summary of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub peak_label: String,
    pub peak_value: f64,
    pub average_interest: f64,
    pub trending_keyword: String,
    /// Number of labels, not number of values
    pub total_points: usize,
}

/// Interest score of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalInterest {
    pub country_code: String,
    pub value: f64,
}

/// Regional scores keyed by country code, first occurrence wins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalInterestSet(Vec<RegionalInterest>);

impl RegionalInterestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score; returns `false` if the country is already present
    pub fn insert(&mut self, country_code: impl Into<String>, value: f64) -> bool {
        let country_code = country_code.into();
        if self.0.iter().any(|r| r.country_code == country_code) {
            return false;
        }
        self.0.push(RegionalInterest {
            country_code,
            value,
        });
        true
    }

    pub fn get(&self, country_code: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|r| r.country_code == country_code)
            .map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionalInterest> {
        self.0.iter()
    }

    pub fn country_codes(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.country_code.as_str()).collect()
    }
}

/// Where a snapshot half came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvenance {
    Live,
    Synthetic,
}

impl std::fmt::Display for DataProvenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// A value tagged with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub data: T,
    pub provenance: DataProvenance,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            provenance: DataProvenance::Live,
        }
    }

    pub fn synthetic(data: T) -> Self {
        Self {
            data,
            provenance: DataProvenance::Synthetic,
        }
    }
}

/// Lifecycle state of the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complete result of one search cycle
///
/// Snapshots are immutable once built; the orchestrator replaces the whole
/// value on every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySnapshot {
    /// Sequence number of the search that produced this snapshot (0 = none)
    pub request_id: u64,
    pub keywords: KeywordList,
    pub status: QueryStatus,
    pub dataset: Option<TrendDataset>,
    pub insights: Option<InsightsSummary>,
    pub regional: Option<RegionalInterestSet>,
    pub series_source: Option<DataProvenance>,
    pub regional_source: Option<DataProvenance>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuerySnapshot {
    /// Initial snapshot before any search
    pub fn idle() -> Self {
        Self::default()
    }

    /// Snapshot published while a search is in flight
    pub fn loading(request_id: u64, keywords: KeywordList) -> Self {
        Self {
            request_id,
            keywords,
            status: QueryStatus::Loading,
            ..Default::default()
        }
    }

    /// Completed snapshot; dataset and insights always travel together
    pub fn ready(
        request_id: u64,
        keywords: KeywordList,
        dataset: Sourced<TrendDataset>,
        insights: InsightsSummary,
        regional: Sourced<RegionalInterestSet>,
    ) -> Self {
        Self {
            request_id,
            keywords,
            status: QueryStatus::Ready,
            dataset: Some(dataset.data),
            insights: Some(insights),
            regional: Some(regional.data),
            series_source: Some(dataset.provenance),
            regional_source: Some(regional.provenance),
            error: None,
            completed_at: Some(Utc::now()),
        }
    }

    /// Snapshot for a search whose series path could not be aggregated
    pub fn failed(
        request_id: u64,
        keywords: KeywordList,
        regional: Sourced<RegionalInterestSet>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            keywords,
            status: QueryStatus::Failed,
            regional: Some(regional.data),
            regional_source: Some(regional.provenance),
            error: Some(error.into()),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == QueryStatus::Ready
    }
}
