use crate::error::DownloaderError;
use crate::types::{DownloadOutcome, DownloadReport};
use log::{debug, info};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
}

/// Counts outcomes for one run and coalesces runs of skips into one log line.
#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: RunStats,
    skip_streak: usize,
    reports: Vec<DownloadReport>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: DownloadOutcome) {
        debug!("Status: {}", outcome.as_str());
        match outcome {
            DownloadOutcome::Skipped => {
                self.stats.skipped += 1;
                self.skip_streak += 1;
            }
            DownloadOutcome::Downloaded => {
                self.flush_skip_streak();
                self.stats.downloaded += 1;
            }
            DownloadOutcome::Failed => {
                self.flush_skip_streak();
                self.stats.failed += 1;
            }
        }
    }

    pub fn record_report(&mut self, report: DownloadReport) {
        self.record(report.outcome);
        self.reports.push(report);
    }

    /// Logs and resets a pending skip streak. Returns its length if there was one.
    pub fn flush_skip_streak(&mut self) -> Option<usize> {
        if self.skip_streak == 0 {
            return None;
        }
        let streak = std::mem::take(&mut self.skip_streak);
        info!("Skipped {} existing files", streak);
        Some(streak)
    }

    pub fn summary(&self) -> RunStats {
        self.stats
    }

    pub fn reports(&self) -> &[DownloadReport] {
        &self.reports
    }

    pub fn print_stats(&self) {
        info!(
            "\nDownload statistics:\n  Skipped: {}\n  Downloaded: {}\n  Failed: {}",
            self.stats.skipped, self.stats.downloaded, self.stats.failed
        );
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DownloaderError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut wtr = csv::WriterBuilder::new().from_path(path)?;

        wtr.write_record([
            "System",
            "Filename",
            "Outcome",
            "Bytes",
            "Attempts",
            "Destination",
        ])?;

        for report in self.reports() {
            wtr.write_record([
                report.target.system.clone(),
                report.target.file_name.clone(),
                report.outcome.as_str().to_string(),
                report.bytes_downloaded.to_string(),
                report.attempts.to_string(),
                report.target.output_path.display().to_string(),
            ])?;
        }

        wtr.flush()?;
        info!("Wrote run report to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DownloadTarget;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn skips_coalesce_until_a_non_skip() {
        let mut stats = StatsCollector::new();
        stats.record(DownloadOutcome::Skipped);
        stats.record(DownloadOutcome::Skipped);
        stats.record(DownloadOutcome::Skipped);
        assert_eq!(stats.skip_streak, 3);

        stats.record(DownloadOutcome::Downloaded);
        assert_eq!(stats.skip_streak, 0);
        assert_eq!(stats.flush_skip_streak(), None);

        stats.record(DownloadOutcome::Skipped);
        assert_eq!(stats.flush_skip_streak(), Some(1));

        assert_eq!(
            stats.summary(),
            RunStats {
                skipped: 4,
                downloaded: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn failures_are_counted() {
        let mut stats = StatsCollector::new();
        stats.record(DownloadOutcome::Failed);
        stats.record(DownloadOutcome::Failed);
        assert_eq!(stats.summary().failed, 2);
    }

    #[test]
    fn csv_report_has_one_row_per_target() {
        let dir = TempDir::new().unwrap();
        let mut stats = StatsCollector::new();
        stats.record_report(DownloadReport {
            target: DownloadTarget {
                system: "NES".to_string(),
                file_name: "Game, The (USA).zip".to_string(),
                url: "http://x/NES/Game, The (USA).zip".to_string(),
                output_path: PathBuf::from("/roms/NES/Game, The (USA).zip"),
            },
            outcome: DownloadOutcome::Downloaded,
            bytes_downloaded: 42,
            attempts: 2,
        });

        let path = dir.path().join("report.csv");
        stats.write_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Game, The (USA).zip");
        assert_eq!(&rows[0][2], "downloaded");
        assert_eq!(&rows[0][3], "42");
    }
}
