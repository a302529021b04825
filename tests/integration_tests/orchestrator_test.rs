//! Orchestrator lifecycle tests
//!
//! Tests the search state machine end to end:
//! 1. Idle start and empty-keyword no-op
//! 2. Live results committed with their provenance
//! 3. Snapshot publication through the watch channel
//! 4. Last-result-wins for overlapping searches

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use trendlens::models::{
    DataProvenance, KeywordList, QueryStatus, Region, RegionalInterestSet, TimeRange,
};
use trendlens::pipeline::SyntheticSeriesGenerator;
use trendlens::TrendsQueryOrchestrator;

use crate::common::{dataset, Reply, ScriptedSource};

fn live_regional() -> RegionalInterestSet {
    let mut set = RegionalInterestSet::new();
    set.insert("US", 100.0);
    set.insert("KR", 61.0);
    set
}

fn live_source() -> ScriptedSource {
    ScriptedSource::new(
        Reply::Ok(dataset(
            &["d1", "d2", "d3"],
            &[("rust", &[10.0, 20.0, 30.0]), ("go", &[5.0, 50.0, 5.0])],
        )),
        Reply::Ok(live_regional()),
    )
}

/// Live series named after whatever was searched
fn echo_source() -> ScriptedSource {
    ScriptedSource::new(Reply::Echo(vec![10.0, 40.0, 25.0]), Reply::Ok(live_regional()))
}

fn orchestrator(source: ScriptedSource) -> (Arc<ScriptedSource>, TrendsQueryOrchestrator) {
    let source = Arc::new(source);
    let orchestrator = TrendsQueryOrchestrator::new(
        source.clone(),
        SyntheticSeriesGenerator::with_seed(42),
    );
    (source, orchestrator)
}

#[tokio::test]
async fn test_live_search_is_ready() {
    let (source, orchestrator) = orchestrator(live_source());

    let snapshot = orchestrator
        .search(KeywordList::parse("rust,go"), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Ready);
    assert_eq!(snapshot.series_source, Some(DataProvenance::Live));
    assert_eq!(snapshot.regional_source, Some(DataProvenance::Live));

    let insights = snapshot.insights.as_ref().unwrap();
    assert_eq!(insights.peak_value, 50.0);
    assert_eq!(insights.peak_label, "d2");
    assert_eq!(insights.trending_keyword, "rust");
    assert_eq!(insights.total_points, 3);

    assert_eq!(snapshot.regional.as_ref().unwrap(), &live_regional());
    assert_eq!(source.series_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.regional_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_keywords_do_not_reach_source() {
    let (source, orchestrator) = orchestrator(live_source());

    let snapshot = orchestrator
        .search(KeywordList::new(Vec::<String>::new()), TimeRange::Past7Days, Region::Worldwide)
        .await;

    assert_eq!(snapshot.status, QueryStatus::Idle);
    assert_eq!(orchestrator.status(), QueryStatus::Idle);
    assert_eq!(source.series_calls.load(Ordering::SeqCst), 0);
    assert_eq!(source.regional_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_subscribers_see_loading_then_ready() {
    let source = echo_source().with_slow_keyword("rust", Duration::from_millis(200));
    let (_, orchestrator) = orchestrator(source);
    let orchestrator = Arc::new(orchestrator);
    let mut rx = orchestrator.subscribe();

    let task = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .search(KeywordList::parse("rust"), TimeRange::Past7Days, Region::Worldwide)
                .await
        })
    };

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().status, QueryStatus::Loading);

    rx.changed().await.unwrap();
    let ready = rx.borrow_and_update().clone();
    assert_eq!(ready.status, QueryStatus::Ready);
    assert!(ready.dataset.is_some() && ready.insights.is_some());
    assert_eq!(ready.series_source, Some(DataProvenance::Live));

    let returned = task.await.unwrap();
    assert_eq!(returned, ready);
}

#[tokio::test]
async fn test_superseded_search_is_discarded() {
    let source = echo_source().with_slow_keyword("slow", Duration::from_millis(300));
    let (_, orchestrator) = orchestrator(source);
    let orchestrator = Arc::new(orchestrator);

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .search(KeywordList::parse("slow"), TimeRange::Past7Days, Region::Worldwide)
                .await
        })
    };

    // Let the first search publish Loading before the second starts
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = orchestrator
        .search(KeywordList::parse("fast"), TimeRange::Past7Days, Region::Worldwide)
        .await;
    assert_eq!(second.request_id, 2);
    assert_eq!(orchestrator.snapshot().request_id, 2);

    let first = first.await.unwrap();
    assert_eq!(first.request_id, 1);
    assert!(first.is_ready());
    assert_eq!(first.series_source, Some(DataProvenance::Live));
    assert_eq!(first.dataset.as_ref().unwrap().keywords(), vec!["slow"]);

    // The late result of the first search never replaces the second
    let current = orchestrator.snapshot();
    assert_eq!(current.request_id, 2);
    assert_eq!(current.status, QueryStatus::Ready);
    assert_eq!(current.keywords.as_slice(), &["fast"]);
    assert_eq!(current.series_source, Some(DataProvenance::Live));
    assert_eq!(current.dataset.as_ref().unwrap().keywords(), vec!["fast"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_searches_settle_on_latest() {
    let (_, orchestrator) = orchestrator(echo_source());
    let orchestrator = Arc::new(orchestrator);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .search(
                        KeywordList::parse(&format!("kw{i}")),
                        TimeRange::Past7Days,
                        Region::Worldwide,
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    // Whatever the interleaving, the latest id ends committed, never Loading
    let current = orchestrator.snapshot();
    assert_eq!(current.request_id, 16);
    assert_eq!(current.status, QueryStatus::Ready);
    let dataset = current.dataset.as_ref().unwrap();
    let expected: Vec<&str> = current.keywords.iter().map(String::as_str).collect();
    assert_eq!(dataset.keywords(), expected);
}

#[tokio::test]
async fn test_consecutive_searches_replace_snapshot() {
    let (_, orchestrator) = orchestrator(echo_source());

    orchestrator
        .search(KeywordList::parse("rust"), TimeRange::Past7Days, Region::Worldwide)
        .await;
    let first = orchestrator.snapshot();

    orchestrator
        .search(KeywordList::parse("go"), TimeRange::Past30Days, Region::Country("DE".into()))
        .await;
    let second = orchestrator.snapshot();

    assert_eq!(first.request_id, 1);
    assert_eq!(second.request_id, 2);
    assert_eq!(second.keywords.as_slice(), &["go"]);
    assert_eq!(second.dataset.as_ref().unwrap().keywords(), vec!["go"]);
    assert_eq!(second.series_source, Some(DataProvenance::Live));
    // Earlier snapshots stay intact for whoever still holds them
    assert_eq!(first.keywords.as_slice(), &["rust"]);
}
