use anyhow::{anyhow, bail, Result};

use trendlens::config::{Config, SourceMode};
use trendlens::error::TrendlensErrorTrait;
use trendlens::pipeline::{RegionalInterestFetcher, SyntheticSeriesGenerator};
use trendlens::provider::build_source;
use trendlens::utils::normalize_whitespace;

pub struct RegionsParams {
    pub keyword: String,
    pub synthetic: bool,
    pub limit: usize,
}

pub async fn regions(mut config: Config, params: RegionsParams) -> Result<()> {
    let keyword = normalize_whitespace(&params.keyword);
    if keyword.is_empty() {
        bail!("No keyword given");
    }

    if params.synthetic {
        config.pipeline.source = SourceMode::Synthetic;
    }

    let source = build_source(&config)
        .map_err(|e| anyhow!("Failed to create trends source: {}", e.user_message()))?;
    let fetcher = RegionalInterestFetcher::new(
        source,
        SyntheticSeriesGenerator::from_seed(config.pipeline.synthetic_seed),
    );

    let result = fetcher.fetch(&keyword).await;

    let mut entries: Vec<_> = result.data.iter().collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));

    println!("Interest by region for \"{keyword}\" ({})", result.provenance);
    println!("================================");
    for (rank, entry) in entries.iter().take(params.limit).enumerate() {
        println!("{:>3}. {}  {:>5.1}", rank + 1, entry.country_code, entry.value);
    }

    Ok(())
}
