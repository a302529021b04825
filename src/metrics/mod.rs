//! Prometheus metrics for the trends pipeline
//!
//! This module tracks:
//! - Searches started and completed (by final status)
//! - Fallbacks to synthetic data, per stage (`series`, `regional`)
//! - Results discarded because a newer search superseded them
//! - Provider request duration
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all pipeline metrics
struct PipelineMetrics {
    searches_started: Counter,
    searches_completed: CounterVec,
    fallbacks: CounterVec,
    stale_discarded: Counter,
    provider_duration: HistogramVec,
}

/// Global storage for pipeline metrics
static PIPELINE_METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, subsequent metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = trendlens::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = PipelineMetrics {
        searches_started: register_counter!(
            "trendlens_searches_started_total",
            "Total number of searches started"
        )?,
        searches_completed: register_counter_vec!(
            "trendlens_searches_completed_total",
            "Total number of searches committed, by final status",
            &["status"]
        )?,
        fallbacks: register_counter_vec!(
            "trendlens_synthetic_fallbacks_total",
            "Total number of times synthetic data replaced live data",
            &["stage"]
        )?,
        stale_discarded: register_counter!(
            "trendlens_stale_results_discarded_total",
            "Total number of results dropped because a newer search was issued"
        )?,
        provider_duration: register_histogram_vec!(
            "trendlens_provider_request_duration_seconds",
            "Provider request duration in seconds",
            &["endpoint"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
        )?,
    };

    PIPELINE_METRICS
        .set(metrics)
        .map_err(|_| "Pipeline metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    PIPELINE_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a search leaving `idle` or a previous snapshot
pub fn record_search_started() {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.searches_started.inc();
    }
}

/// Record a committed snapshot
pub fn record_search_completed(status: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.searches_completed.with_label_values(&[status]).inc();
    }
}

/// Record a fallback to synthetic data
pub fn record_fallback(stage: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.fallbacks.with_label_values(&[stage]).inc();
    }
}

/// Record a superseded result being dropped
pub fn record_stale_discard() {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.stale_discarded.inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a provider request timer
pub fn start_provider_timer(endpoint: &str) -> MetricsTimer {
    match PIPELINE_METRICS.get() {
        Some(m) => MetricsTimer::new(
            m.provider_duration
                .with_label_values(&[endpoint])
                .start_timer(),
        ),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
