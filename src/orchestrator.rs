//! Search orchestration
//!
//! [`TrendsQueryOrchestrator`] drives one search through the pipeline:
//!
//! ```text
//! search(keywords) -> Loading -> (series || regional) -> aggregate -> Ready | Failed
//! ```
//!
//! Each search takes a sequence number. A finished search is committed only
//! while its number is still the latest one issued; results of superseded
//! searches are dropped. Snapshots are published through a
//! [`tokio::sync::watch`] channel and always replaced whole.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::analytics::InsightsAggregator;
use crate::config::Config;
use crate::error::TrendlensErrorTrait;
use crate::metrics;
use crate::models::{
    InsightsSummary, KeywordList, QuerySnapshot, QueryStatus, Region, Sourced, TimeRange,
    TrendDataset,
};
use crate::pipeline::{RegionalInterestFetcher, SyntheticSeriesGenerator};
use crate::provider::{build_source, SeriesQuery, TrendsSource};
use crate::utils::error::{FetchError, PipelineError};

/// Coordinates series retrieval, regional retrieval and aggregation
pub struct TrendsQueryOrchestrator {
    source: Arc<dyn TrendsSource>,
    generator: SyntheticSeriesGenerator,
    regional: RegionalInterestFetcher,
    aggregator: InsightsAggregator,

    /// Last issued request id
    sequence: AtomicU64,

    snapshot: watch::Sender<Arc<QuerySnapshot>>,
}

impl TrendsQueryOrchestrator {
    /// Create an orchestrator over `source`, falling back to `generator`
    pub fn new(source: Arc<dyn TrendsSource>, generator: SyntheticSeriesGenerator) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(QuerySnapshot::idle()));
        Self {
            regional: RegionalInterestFetcher::new(Arc::clone(&source), generator.clone()),
            source,
            generator,
            aggregator: InsightsAggregator,
            sequence: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Create an orchestrator with the source selected by `config`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the live HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let source = build_source(config)?;
        let generator = SyntheticSeriesGenerator::from_seed(config.pipeline.synthetic_seed);
        Ok(Self::new(source, generator))
    }

    /// Receiver notified on every snapshot transition
    pub fn subscribe(&self) -> watch::Receiver<Arc<QuerySnapshot>> {
        self.snapshot.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<QuerySnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub fn status(&self) -> QueryStatus {
        self.snapshot.borrow().status
    }

    /// Name of the configured data source
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Run one search and return the snapshot it produced
    ///
    /// An empty keyword list is a no-op: nothing is published and the
    /// current snapshot is returned. The returned snapshot is published only
    /// if no newer search was started in the meantime.
    pub async fn search(
        &self,
        keywords: KeywordList,
        time_range: TimeRange,
        region: Region,
    ) -> Arc<QuerySnapshot> {
        let Some(driver) = keywords.first().map(str::to_string) else {
            debug!("Search ignored: no keywords");
            return self.snapshot();
        };

        let request_id = self.begin(&keywords);
        metrics::record_search_started();
        info!(
            request_id,
            keywords = %keywords.joined(","),
            range = %time_range,
            region = %region,
            source = self.source.name(),
            "Search started"
        );

        let query = SeriesQuery::new(keywords.clone(), time_range, region);
        let (series, regional) = tokio::join!(self.load_series(&query), self.regional.fetch(&driver));

        let snapshot = match series {
            Ok((series, insights)) => {
                QuerySnapshot::ready(request_id, keywords, series, insights, regional)
            }
            Err(e) => {
                warn!(
                    request_id,
                    error = %e,
                    category = %e.category(),
                    "Aggregation rejected the synthetic dataset"
                );
                QuerySnapshot::failed(request_id, keywords, regional, e.to_string())
            }
        };
        let snapshot = Arc::new(snapshot);

        if self.commit(request_id, &snapshot) {
            metrics::record_search_completed(snapshot.status.as_str());
            info!(
                request_id,
                status = %snapshot.status,
                series_source = ?snapshot.series_source,
                regional_source = ?snapshot.regional_source,
                "Search completed"
            );
        } else {
            metrics::record_stale_discard();
            info!(
                request_id,
                latest = self.sequence.load(Ordering::SeqCst),
                "Discarding result of superseded search"
            );
        }

        snapshot
    }

    /// Take the next request id and publish its Loading snapshot
    fn begin(&self, keywords: &KeywordList) -> u64 {
        // Id and Loading are set under the same channel lock as `commit`, so
        // the published snapshot always belongs to the latest id.
        let mut request_id = 0;
        self.snapshot.send_modify(|current| {
            request_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            *current = Arc::new(QuerySnapshot::loading(request_id, keywords.clone()));
        });
        request_id
    }

    /// Publish `snapshot` if `request_id` is still the latest search
    fn commit(&self, request_id: u64, snapshot: &Arc<QuerySnapshot>) -> bool {
        self.snapshot.send_if_modified(|current| {
            if self.sequence.load(Ordering::SeqCst) != request_id {
                return false;
            }
            *current = Arc::clone(snapshot);
            true
        })
    }

    /// Series and their insights, synthetic whenever the live answer is unusable
    ///
    /// A live dataset is kept only if its series match the query keywords in
    /// order, every series spans all labels, and it aggregates. An error is
    /// returned only when the synthetic dataset cannot be aggregated.
    async fn load_series(
        &self,
        query: &SeriesQuery,
    ) -> Result<(Sourced<TrendDataset>, InsightsSummary), PipelineError> {
        match self.source.fetch_series(query).await {
            Ok(dataset) if dataset.is_empty() => {
                warn!("Provider returned an empty timeline, using synthetic series");
            }
            Ok(dataset) if dataset.keywords() != query.keywords.as_slice() => {
                warn!(
                    expected = %query.keywords.joined(","),
                    received = %dataset.keywords().join(","),
                    "Provider series do not match the keywords, using synthetic series"
                );
            }
            Ok(dataset) if !dataset.is_consistent() => {
                warn!(
                    buckets = dataset.len(),
                    "Provider series have uneven lengths, using synthetic series"
                );
            }
            Ok(dataset) => match self.aggregator.aggregate(&dataset) {
                Ok(insights) => {
                    debug!(
                        buckets = dataset.len(),
                        series = dataset.series.len(),
                        source = self.source.name(),
                        "Series fetched"
                    );
                    let series = Sourced {
                        data: dataset,
                        provenance: self.source.provenance(),
                    };
                    return Ok((series, insights));
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        category = %e.category(),
                        "Provider series cannot be aggregated, using synthetic series"
                    );
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    category = %e.category(),
                    "Series fetch failed, using synthetic series"
                );
            }
        }

        metrics::record_fallback("series");
        let dataset = self.generator.generate(&query.keywords, query.time_range);
        let insights = self.aggregator.aggregate(&dataset)?;
        Ok((Sourced::synthetic(dataset), insights))
    }
}
