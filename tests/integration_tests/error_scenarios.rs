//! Error scenario integration tests
//!
//! Tests the fallback-first policy:
//! 1. Malformed live series
//! 2. Provider status errors
//! 3. Empty live answers
//! 4. Live series that do not fit the search
//! 5. Regional failures that must not block the series
//! 6. A real client against a failing mock provider

use std::sync::Arc;

use trendlens::models::{
    DataProvenance, KeywordList, KeywordSeries, QueryStatus, Region, RegionalInterestSet,
    TimeRange, TrendDataset,
};
use trendlens::pipeline::{SyntheticSeriesGenerator, FALLBACK_COUNTRIES};
use trendlens::provider::ProviderClient;
use trendlens::TrendsQueryOrchestrator;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{dataset, regional_payload, Reply, ScriptedSource};

fn orchestrator(source: ScriptedSource) -> TrendsQueryOrchestrator {
    TrendsQueryOrchestrator::new(Arc::new(source), SyntheticSeriesGenerator::new())
}

fn some_regions() -> RegionalInterestSet {
    let mut set = RegionalInterestSet::new();
    set.insert("JP", 88.0);
    set
}

#[tokio::test]
async fn test_malformed_series_falls_back_to_synthetic() {
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Malformed,
        Reply::Ok(some_regions()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust,go"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Live));

    let dataset = snapshot.dataset.as_ref().unwrap();
    assert_eq!(dataset.len(), 7);
    assert_eq!(dataset.keywords(), vec!["rust", "go"]);
    assert!(dataset.is_consistent());
    assert!(dataset
        .series
        .iter()
        .all(|s| s.values.iter().all(|v| *v >= 0.0)));
    assert_eq!(snapshot.insights.as_ref().unwrap().total_points, 7);
}

#[tokio::test]
async fn test_server_error_falls_back_for_both_halves() {
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::ServerError(500),
        Reply::ServerError(500),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust"), TimeRange::Past12Months, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.dataset.as_ref().unwrap().len(), 12);

    let regional = snapshot.regional.as_ref().unwrap();
    assert_eq!(regional.country_codes(), FALLBACK_COUNTRIES.to_vec());
    assert!(regional.iter().all(|r| (0.0..100.0).contains(&r.value)));
}

#[tokio::test]
async fn test_empty_live_timeline_falls_back() {
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(TrendDataset::default()),
        Reply::Ok(RegionalInterestSet::new()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust"), TimeRange::Past30Days, Region::Worldwide)
        .await;

    assert!(snapshot.is_ready());
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.dataset.as_ref().unwrap().len(), 30);
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.regional.as_ref().unwrap().len(), FALLBACK_COUNTRIES.len());
}

#[tokio::test]
async fn test_mismatched_series_names_fall_back() {
    let live = dataset(&["d1", "d2"], &[("other", &[1.0, 2.0]), ("extra", &[3.0, 4.0])]);
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(live),
        Reply::Ok(some_regions()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("x"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    let dataset = snapshot.dataset.as_ref().unwrap();
    assert_eq!(dataset.keywords(), vec!["x"]);
    assert_eq!(dataset.len(), 7);
}

#[tokio::test]
async fn test_reordered_series_fall_back() {
    let live = dataset(&["d1"], &[("go", &[5.0]), ("rust", &[9.0])]);
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(live),
        Reply::Ok(some_regions()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust,go"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.dataset.as_ref().unwrap().keywords(), vec!["rust", "go"]);
}

#[tokio::test]
async fn test_ragged_series_fall_back() {
    let ragged = TrendDataset {
        labels: vec!["d1".into(), "d2".into(), "d3".into()],
        series: vec![KeywordSeries::new("x", vec![5.0])],
    };
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(ragged),
        Reply::Ok(some_regions()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("x"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    let dataset = snapshot.dataset.as_ref().unwrap();
    assert!(dataset.is_consistent());
    assert_eq!(dataset.len(), 7);
    assert_eq!(snapshot.insights.as_ref().unwrap().total_points, 7);
}

#[tokio::test]
async fn test_series_without_points_fall_back() {
    let hollow = TrendDataset {
        labels: vec!["d1".into()],
        series: vec![KeywordSeries::new("x", Vec::new())],
    };
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(hollow),
        Reply::Ok(some_regions()),
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("x"), TimeRange::Past30Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.dataset.as_ref().unwrap().len(), 30);
    assert_eq!(snapshot.insights.as_ref().unwrap().total_points, 30);
}

#[tokio::test]
async fn test_regional_failure_does_not_block_series() {
    let live = dataset(&["d1", "d2"], &[("rust", &[10.0, 90.0])]);
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::Ok(live.clone()),
        Reply::Malformed,
    ));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Live));
    assert_eq!(snapshot.dataset.as_ref(), Some(&live));
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Synthetic));
    assert_eq!(
        snapshot.regional.as_ref().unwrap().country_codes(),
        FALLBACK_COUNTRIES.to_vec()
    );
}

#[tokio::test]
async fn test_custom_range_falls_back_to_monthly_buckets() {
    let orchestrator = orchestrator(ScriptedSource::new(
        Reply::ServerError(502),
        Reply::Ok(some_regions()),
    ));

    let range = TimeRange::parse("2024-01-01 2024-06-30").unwrap();
    let snapshot = orchestrator
        .search(KeywordList::parse("rust"), range, Region::Worldwide)
        .await;

    assert_eq!(snapshot.dataset.as_ref().unwrap().len(), 12);
}

#[tokio::test]
async fn test_failing_provider_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::with_base_url(&mock_server.uri(), Some("k")).unwrap();
    let orchestrator =
        TrendsQueryOrchestrator::new(Arc::new(client), SyntheticSeriesGenerator::with_seed(3));

    let snapshot = orchestrator
        .search(KeywordList::parse("rust, python"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Synthetic));
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Synthetic));
    assert_eq!(
        snapshot.dataset.as_ref().unwrap().keywords(),
        vec!["rust", "python"]
    );
}

#[tokio::test]
async fn test_partial_regional_payload_is_not_merged() {
    let mock_server = MockServer::start().await;

    let mut payload = regional_payload(&[("US", 100.0), ("GB", 50.0)]);
    payload["interest_by_region"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::json!({ "value": 12 }));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::with_base_url(&mock_server.uri(), Some("k")).unwrap();
    let fetcher = trendlens::pipeline::RegionalInterestFetcher::new(
        Arc::new(client),
        SyntheticSeriesGenerator::new(),
    );

    let result = fetcher.fetch("rust").await;
    assert_eq!(result.provenance, DataProvenance::Synthetic);
    assert_eq!(result.data.country_codes(), FALLBACK_COUNTRIES.to_vec());
}
