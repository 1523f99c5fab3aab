use crate::config::Config;
use crate::error::DownloaderError;
use crate::filter::FilterSet;
use crate::integrity;
use crate::listing::{build_client, ListingFetcher};
use crate::retry::{Attempted, RetryPolicy};
use crate::stats::StatsCollector;
use crate::transfer::{sweep_part_files, FileTransfer};
use crate::types::{CatalogEntry, DownloadOutcome, DownloadReport, DownloadTarget, IntegrityStatus};
use colored::*;
use log::{debug, error, info, warn};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct DownloaderOptions {
    /// Connect timeout, and the longest wait for any single read.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub show_progress: bool,
}

impl Default for DownloaderOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            show_progress: true,
        }
    }
}

pub struct Downloader {
    config: Config,
    listing: ListingFetcher,
    transfer: FileTransfer,
    retry: RetryPolicy,
}

impl Downloader {
    pub fn new(config: Config, options: DownloaderOptions) -> Result<Self, DownloaderError> {
        let client = build_client(options.timeout)?;
        Ok(Self {
            config,
            listing: ListingFetcher::new(client.clone(), options.timeout),
            transfer: FileTransfer::new(client, options.timeout, options.show_progress),
            retry: options.retry,
        })
    }

    /// Processes every system of every catalog entry in order.
    ///
    /// Per-file and per-listing failures are logged and counted; only
    /// configuration errors and unexpected local I/O errors end the run.
    pub async fn download_all(&self) -> Result<StatsCollector, DownloaderError> {
        self.config.validate()?;

        info!("Starting download from Myrient...");
        let mut stats = StatsCollector::new();

        for entry in &self.config.myrient_downloader {
            let system_filter = FilterSet::new(&entry.system_allow_list, &entry.system_disallow_list);
            let game_filter = FilterSet::new(&entry.game_allow_list, &entry.game_disallow_list);

            for system in &entry.systems {
                if !system_filter.matches(system) {
                    info!("Skipping {} - excluded by system filters", system);
                    continue;
                }
                self.download_system(entry, system, &game_filter, &mut stats).await?;
            }
        }

        stats.print_stats();
        info!("{}", "Download complete!".green());
        Ok(stats)
    }

    async fn download_system(
        &self,
        entry: &CatalogEntry,
        system: &str,
        game_filter: &FilterSet,
        stats: &mut StatsCollector,
    ) -> Result<(), DownloaderError> {
        let download_dir = self.config.system_dir(&entry.myrient_path, system)?;
        if !download_dir.exists() {
            warn!("Creating directory {}", download_dir.display());
            tokio::fs::create_dir_all(&download_dir).await?;
        }
        sweep_part_files(&download_dir).await?;

        let system_url = entry.system_url(system);
        let files = match self.listing.fetch(&system_url).await {
            Ok(files) => files,
            Err(e) => {
                error!("Error getting file list for {}: {}", system, e);
                Vec::new()
            }
        };

        let filtered = game_filter.apply(&files);
        if filtered.is_empty() {
            info!("No matching files found for {}", system);
            return Ok(());
        }
        info!("Found {} matching files for {}", filtered.len(), system);

        let total = filtered.len();
        for (n, file_name) in filtered.into_iter().enumerate() {
            let target = DownloadTarget {
                system: system.to_string(),
                url: format!("{}{}", system_url, file_name),
                output_path: download_dir.join(&file_name),
                file_name,
            };
            self.process_target(entry, target, n + 1, total, stats).await?;
        }

        stats.flush_skip_streak();
        Ok(())
    }

    async fn process_target(
        &self,
        entry: &CatalogEntry,
        target: DownloadTarget,
        position: usize,
        total: usize,
        stats: &mut StatsCollector,
    ) -> Result<(), DownloaderError> {
        if entry.verify_existing_zips {
            remove_if_corrupt(&target.output_path).await?;
        }

        if entry.skip_existing && target.output_path.exists() {
            debug!("Skipping {} - already exists", target.file_name);
            stats.record_report(DownloadReport {
                target,
                outcome: DownloadOutcome::Skipped,
                bytes_downloaded: 0,
                attempts: 0,
            });
            return Ok(());
        }

        stats.flush_skip_streak();
        info!(
            "{} {}{}/{} {} {}",
            target.system,
            "@".magenta(),
            position,
            total,
            "»".magenta(),
            target.file_name
        );
        debug!("Downloading {} to: {}", target.url, target.output_path.display());

        let attempted = self
            .retry
            .run(&target.file_name, || {
                self.transfer.transfer(&target.url, &target.output_path)
            })
            .await?;

        let report = match attempted {
            Attempted::Succeeded { value, attempts } => DownloadReport {
                target,
                outcome: DownloadOutcome::Downloaded,
                bytes_downloaded: value,
                attempts,
            },
            Attempted::Exhausted {
                attempts,
                last_error,
            } => {
                error!(
                    "Giving up on {} after {} attempts: {}",
                    target.file_name, attempts, last_error
                );
                DownloadReport {
                    target,
                    outcome: DownloadOutcome::Failed,
                    bytes_downloaded: 0,
                    attempts,
                }
            }
        };
        stats.record_report(report);
        Ok(())
    }
}

async fn remove_if_corrupt(path: &Path) -> Result<(), DownloaderError> {
    if integrity::verify(path, true)? == IntegrityStatus::Corrupt {
        warn!("Deleting broken zip file: {}", path.display());
        tokio::fs::remove_file(path).await?;
    }
    Ok(())
}
