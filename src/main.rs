use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendlens::config::Config;
use trendlens::metrics;

mod commands;

#[derive(Parser)]
#[command(
    name = "trendlens",
    version,
    about = "Keyword interest trends with synthetic fallback and insights",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch interest over time and derived insights
    Search {
        /// Keywords to compare (comma-separated or repeated)
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Time range (past-7-days, past-30-days, past-3-months,
        /// past-12-months, past-5-years, or "YYYY-MM-DD YYYY-MM-DD")
        #[arg(short, long)]
        range: Option<String>,

        /// Two-letter country code or "worldwide"
        #[arg(long)]
        region: Option<String>,

        /// Use synthetic data only
        #[arg(long, default_value = "false")]
        synthetic: bool,

        /// Output format (text, json, csv)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show interest by region for one keyword
    Regions {
        /// Keyword to look up
        keyword: String,

        /// Use synthetic data only
        #[arg(long, default_value = "false")]
        synthetic: bool,

        /// Number of regions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed");
    }

    tracing::info!(source = config.pipeline.source.as_str(), "trendlens starting");

    match cli.command {
        Commands::Search {
            keywords,
            range,
            region,
            synthetic,
            format,
            output,
        } => {
            tracing::info!(
                keywords = ?keywords,
                range = ?range,
                region = ?region,
                synthetic = %synthetic,
                format = %format,
                "Starting search command"
            );
            commands::search(
                config,
                commands::SearchParams {
                    keywords,
                    range,
                    region,
                    synthetic,
                    format,
                    output,
                },
            )
            .await?;
        }

        Commands::Regions {
            keyword,
            synthetic,
            limit,
        } => {
            tracing::info!(
                keyword = %keyword,
                synthetic = %synthetic,
                limit = %limit,
                "Starting regions command"
            );
            commands::regions(
                config,
                commands::RegionsParams {
                    keyword,
                    synthetic,
                    limit,
                },
            )
            .await?;
        }
    }

    if cli.verbose {
        match metrics::encode_metrics() {
            Ok(text) => tracing::debug!(metrics = %text, "Pipeline metrics"),
            Err(e) => tracing::debug!(error = %e, "Could not encode metrics"),
        }
    }

    tracing::info!("trendlens completed successfully");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendlens=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("trendlens={level},warn"))?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
