mod cli;
mod config;
mod downloader;
mod error;
mod filter;
mod integrity;
mod listing;
mod parser;
mod retry;
mod stats;
mod transfer;
mod types;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use config::Config;
use downloader::{Downloader, DownloaderOptions};
use log::{error, info};
use retry::RetryPolicy;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    info!(
        "{} v{}, {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION")
    );

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(dir) = cli.download_dir {
        config.download_dir = dir;
        config.resolve_download_dir()?;
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("{}", "Invalid configuration".red());
        return Err(e.into());
    }

    info!("{}", config.overview());
    if cli.write_config {
        config
            .write(&cli.config)
            .with_context(|| format!("Failed to write config to {}", cli.config.display()))?;
    }
    if cli.print_config {
        return Ok(());
    }

    let options = DownloaderOptions {
        timeout: Duration::from_secs(cli.timeout),
        retry: RetryPolicy {
            max_attempts: cli.retries,
            delay: Duration::from_secs(cli.retry_delay),
        },
        show_progress: true,
    };
    let downloader = Downloader::new(config, options)?;

    let stats = match downloader.download_all().await {
        Ok(stats) => stats,
        Err(e) => {
            error!("Download process failed: {}", e);
            eprintln!("{}", "Download process failed".red());
            return Err(e.into());
        }
    };

    let summary = stats.summary();
    println!("\n{}", "Download Summary:".bold());
    println!("Skipped: {} files", summary.skipped.to_string().yellow());
    println!("Downloaded: {} files", summary.downloaded.to_string().green());
    println!("Failed: {} files", summary.failed.to_string().red());

    if let Some(path) = cli.stats_csv {
        stats
            .write_csv(&path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(())
}
