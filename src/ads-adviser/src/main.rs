//! Ads Adviser — batch job turning impression and click logs into segment
//! metrics and advertiser recommendations.

use adviser_core::config::AppConfig;
use adviser_reporting::BatchJob;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ads-adviser")]
#[command(about = "Aggregate ad impressions and clicks into segment metrics and advertiser recommendations")]
#[command(version)]
struct Cli {
    /// Impression events (JSON array or newline-delimited JSON)
    impressions: PathBuf,

    /// Click events (JSON array or newline-delimited JSON)
    clicks: PathBuf,

    /// Directory for metrics.json and recommendations.json (overrides config)
    #[arg(long, env = "ADS_ADVISER__OUTPUT__DIR")]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the start/finish banner.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ads_adviser=info,adviser_reporting=info,adviser_core=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    println!("Process started. {}", Local::now());

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    info!(
        impressions = %cli.impressions.display(),
        clicks = %cli.clicks.display(),
        output_dir = %config.output.dir.display(),
        "Configuration loaded"
    );

    let summary = BatchJob::new(config)
        .run(&cli.impressions, &cli.clicks)
        .with_context(|| {
            format!(
                "batch over {} and {} failed",
                cli.impressions.display(),
                cli.clicks.display()
            )
        })?;

    info!(
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "Ads Adviser finished"
    );
    println!("Process finished. {}", Local::now());
    Ok(())
}
