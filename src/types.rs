use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One remote collection: `<myrient_url>/<myrient_path>/<system>/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub myrient_url: String,
    /// Database name on the server, e.g. `No-Intro` or `Redump`.
    pub myrient_path: String,
    pub skip_existing: bool,
    pub verify_existing_zips: bool,
    pub systems: Vec<String>,
    pub system_allow_list: Vec<String>,
    pub system_disallow_list: Vec<String>,
    pub game_allow_list: Vec<String>,
    pub game_disallow_list: Vec<String>,
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self {
            myrient_url: "https://myrient.erista.me/files".to_string(),
            myrient_path: "No-Intro".to_string(),
            skip_existing: true,
            verify_existing_zips: false,
            systems: vec![
                "Nintendo - Nintendo Entertainment System (Headered)".to_string(),
                "Nintendo - Super Nintendo Entertainment System".to_string(),
            ],
            system_allow_list: Vec::new(),
            system_disallow_list: Vec::new(),
            game_allow_list: vec!["(USA)".to_string()],
            game_disallow_list: ["Demo", "BIOS", "(Proto)", "(Beta)", "(Program)"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CatalogEntry {
    /// Listing URL for a system, always with a trailing slash.
    pub fn system_url(&self, system: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.myrient_url.trim_end_matches('/'),
            self.myrient_path.trim_matches('/'),
            system
        )
    }
}

#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub system: String,
    pub file_name: String,
    pub url: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Skipped,
    Downloaded,
    Failed,
}

impl DownloadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadOutcome::Skipped => "skipped",
            DownloadOutcome::Downloaded => "downloaded",
            DownloadOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    Valid,
    Corrupt,
    NotApplicable,
}

#[derive(Debug)]
pub struct DownloadReport {
    pub target: DownloadTarget,
    pub outcome: DownloadOutcome,
    pub bytes_downloaded: u64,
    pub attempts: u32,
}
