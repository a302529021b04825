use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;

use trendlens::analytics::momentum;
use trendlens::config::{Config, SourceMode};
use trendlens::error::TrendlensErrorTrait;
use trendlens::export::{self, ExportFormat};
use trendlens::models::{
    DataProvenance, KeywordList, QuerySnapshot, QueryStatus, Region, TimeRange,
};
use trendlens::orchestrator::TrendsQueryOrchestrator;
use trendlens::utils::{mean, round_to, truncate_text};

/// Rows of the regional table in the text report
const TOP_REGIONS: usize = 5;

pub struct SearchParams {
    pub keywords: Vec<String>,
    pub range: Option<String>,
    pub region: Option<String>,
    pub synthetic: bool,
    pub format: String,
    pub output: Option<PathBuf>,
}

pub async fn search(mut config: Config, params: SearchParams) -> Result<()> {
    let keywords = KeywordList::new(&params.keywords);
    if keywords.is_empty() {
        bail!("No keywords given");
    }

    let time_range = match params.range.as_deref() {
        Some(raw) => {
            TimeRange::parse(raw).with_context(|| format!("Unknown time range: {raw}"))?
        }
        None => config.default_time_range(),
    };

    let region = match params.region.as_deref() {
        Some(raw) => Region::parse(raw).with_context(|| format!("Unknown region: {raw}"))?,
        None => config.default_region(),
    };

    let format = ExportFormat::parse(&params.format)
        .with_context(|| format!("Unknown output format: {}", params.format))?;

    if params.synthetic {
        config.pipeline.source = SourceMode::Synthetic;
    }

    let orchestrator = TrendsQueryOrchestrator::from_config(&config)
        .map_err(|e| anyhow!("Failed to create trends source: {}", e.user_message()))?;

    let snapshot = orchestrator.search(keywords, time_range, region).await;
    if snapshot.status == QueryStatus::Failed {
        bail!(
            "Search failed: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        );
    }

    let rendered = match format {
        ExportFormat::Text => render_report(&snapshot, time_range),
        ExportFormat::Json => {
            export::to_json(&snapshot).map_err(|e| anyhow!(e.user_message()))?
        }
        ExportFormat::Csv => {
            export::to_csv(&snapshot).map_err(|e| anyhow!(e.user_message()))?
        }
    };

    match params.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} export to {}", format.as_str(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn render_report(snapshot: &QuerySnapshot, time_range: TimeRange) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("Trends for: {}", snapshot.keywords.joined(", ")));
    line("================================".to_string());
    line(format!(
        "Range: {time_range} | Series: {} | Regions: {}",
        source_label(snapshot.series_source),
        source_label(snapshot.regional_source)
    ));

    if let Some(insights) = &snapshot.insights {
        line(String::new());
        line("Key insights:".to_string());
        line(format!(
            "  Peak interest:    {} (score {})",
            insights.peak_label,
            round_to(insights.peak_value, 1)
        ));
        line(format!(
            "  Average interest: {:.1}",
            insights.average_interest
        ));
        line(format!("  Top trending:     {}", insights.trending_keyword));
        line(format!("  Data points:      {}", insights.total_points));
    }

    if let Some(dataset) = &snapshot.dataset {
        line(String::new());
        line("Momentum:".to_string());
        for (entry, series) in momentum(dataset, None).iter().zip(&dataset.series) {
            let average = mean(&series.values).unwrap_or(0.0);
            let change = entry
                .change_percent
                .map(|c| format!("{c:+.1}%"))
                .unwrap_or_else(|| "n/a".to_string());
            line(format!(
                "  {:<24} avg {:>5.1}  {:<16} {change}",
                truncate_text(&entry.keyword, 24),
                average,
                entry.direction.as_str(),
            ));
        }
    }

    if let Some(regional) = &snapshot.regional {
        let mut entries: Vec<_> = regional.iter().collect();
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));

        line(String::new());
        line(format!(
            "Top regions for \"{}\":",
            snapshot.keywords.first().unwrap_or_default()
        ));
        for entry in entries.iter().take(TOP_REGIONS) {
            line(format!("  {}  {:>5.1}", entry.country_code, entry.value));
        }
    }

    out
}

fn source_label(provenance: Option<DataProvenance>) -> String {
    provenance.map_or_else(|| "-".to_string(), |p| p.to_string())
}
