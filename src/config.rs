use crate::error::DownloaderError;
use crate::types::CatalogEntry;
use colored::*;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub download_dir: PathBuf,
    /// `<download_dir>/<system>/`
    pub create_and_use_system_directories: bool,
    /// `<download_dir>/<myrient_path>/<system>/`, requires system directories
    pub create_and_use_database_directories: bool,
    pub myrient_downloader: Vec<CatalogEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("output"),
            create_and_use_system_directories: true,
            create_and_use_database_directories: false,
            myrient_downloader: vec![CatalogEntry::default()],
        }
    }
}

impl Config {
    /// Reads the config at `path`, falling back to defaults when it does not exist.
    /// A relative `download_dir` is resolved against the working directory.
    pub fn load(path: &Path) -> Result<Self, DownloaderError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.resolve_download_dir()?;
        Ok(config)
    }

    pub fn resolve_download_dir(&mut self) -> Result<(), DownloaderError> {
        if self.download_dir.is_relative() {
            self.download_dir = std::env::current_dir()?.join(&self.download_dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DownloaderError> {
        if self.create_and_use_database_directories && !self.create_and_use_system_directories {
            return Err(DownloaderError::Config(
                "Cannot create database directories without system directories, \
                 please set create_and_use_system_directories to true"
                    .to_string(),
            ));
        }

        let total_systems: usize = self.myrient_downloader.iter().map(|d| d.systems.len()).sum();
        if !self.create_and_use_system_directories && total_systems > 1 {
            return Err(DownloaderError::Config(
                "create_and_use_system_directories must be true when multiple systems are specified"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Local directory a system's files land in. Does not touch the filesystem.
    pub fn system_dir(&self, myrient_path: &str, system: &str) -> Result<PathBuf, DownloaderError> {
        self.validate()?;
        let dir = match (
            self.create_and_use_system_directories,
            self.create_and_use_database_directories,
        ) {
            (true, true) => self.download_dir.join(myrient_path).join(system),
            (true, false) => self.download_dir.join(system),
            _ => self.download_dir.clone(),
        };
        Ok(dir)
    }

    pub fn overview(&self) -> String {
        fn will(condition: bool, thing: &str) -> String {
            if condition {
                format!("Will {}", thing).green().to_string()
            } else {
                format!("Will NOT {}", thing).red().to_string()
            }
        }
        fn terms(list: &[String], empty: &str) -> String {
            if list.is_empty() {
                empty.magenta().to_string()
            } else {
                list.join(", ").magenta().to_string()
            }
        }

        let mut msg = format!(
            "\nGlobal Settings:\n  Download Directory: {}\n  {}\n  {}\n",
            self.download_dir.display().to_string().magenta(),
            will(self.create_and_use_system_directories, "create system directories"),
            will(self.create_and_use_database_directories, "create database directories"),
        );

        for (n, entry) in self.myrient_downloader.iter().enumerate() {
            msg.push_str(&format!(
                "\nMyrient Downloader {}:\n  Resolved URL: {}\n  {}\n  {}\n  Systems:\n    {}\n  \
                 System Allow List: {}\n  System Disallow List: {}\n  \
                 Game Allow List: {}\n  Game Disallow List: {}\n",
                n + 1,
                format!("{}/{}", entry.myrient_url, entry.myrient_path).magenta(),
                will(entry.skip_existing, "skip existing files"),
                will(entry.verify_existing_zips, "verify existing zips"),
                entry.systems.join("\n    "),
                terms(&entry.system_allow_list, "<All>"),
                terms(&entry.system_disallow_list, "<None>"),
                terms(&entry.game_allow_list, "<All>"),
                terms(&entry.game_disallow_list, "<None>"),
            ));
        }
        msg
    }

    /// Writes the config to `path`, backing up an existing file whose content differs.
    pub fn write(&self, path: &Path) -> Result<(), DownloaderError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if path.exists() {
            let existing = std::fs::read_to_string(path)?;
            let unchanged = toml::from_str::<Config>(&existing)
                .map(|old| &old == self)
                .unwrap_or(false);
            if !unchanged {
                let backup = backup_path(path);
                warn!(
                    "Config content has changed, backing up the old one to {}",
                    backup.display()
                );
                std::fs::write(&backup, existing)?;
            }
        } else {
            warn!("Config file does not exist, creating it at {}", path.display());
        }

        info!("Writing config to {}", path.display());
        let body = toml::to_string(self)?;
        let contents = format!(
            "# Configuration file for {} v{}\n{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            body
        );
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("config");
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let time = chrono::Local::now().format("%Y-%m-%d_%H%M%S");
    path.with_file_name(format!("{}_{}{}.bak", stem, time, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(
            config.download_dir,
            std::env::current_dir().unwrap().join("output")
        );
        assert!(config.download_dir.is_absolute());
        assert_eq!(config.myrient_downloader, Config::default().myrient_downloader);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
download_dir = "/srv/roms"
unknown_key = 1

[[myrient_downloader]]
myrient_path = "Redump"
systems = ["Sony - PlayStation"]
game_allow_list = []
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/srv/roms"));
        assert!(config.create_and_use_system_directories);
        let entry = &config.myrient_downloader[0];
        assert_eq!(entry.myrient_path, "Redump");
        assert_eq!(entry.myrient_url, "https://myrient.erista.me/files");
        assert!(entry.game_allow_list.is_empty());
        assert!(entry.skip_existing);
    }

    #[test]
    fn relative_download_dir_becomes_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "download_dir = \"roms\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.download_dir, std::env::current_dir().unwrap().join("roms"));
    }

    #[test]
    fn database_dirs_without_system_dirs_is_rejected() {
        let config = Config {
            create_and_use_system_directories: false,
            create_and_use_database_directories: true,
            myrient_downloader: vec![CatalogEntry {
                systems: vec!["One".to_string()],
                ..CatalogEntry::default()
            }],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(DownloaderError::Config(_))));
        assert!(config.system_dir("No-Intro", "One").is_err());
    }

    #[test]
    fn flat_layout_with_many_systems_is_rejected() {
        let config = Config {
            create_and_use_system_directories: false,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn system_dir_follows_nesting_flags() {
        let mut config = Config {
            download_dir: PathBuf::from("/data"),
            ..Config::default()
        };
        assert_eq!(
            config.system_dir("No-Intro", "NES").unwrap(),
            PathBuf::from("/data/NES")
        );

        config.create_and_use_database_directories = true;
        assert_eq!(
            config.system_dir("No-Intro", "NES").unwrap(),
            PathBuf::from("/data/No-Intro/NES")
        );

        config.create_and_use_database_directories = false;
        config.create_and_use_system_directories = false;
        config.myrient_downloader[0].systems.truncate(1);
        assert_eq!(
            config.system_dir("No-Intro", "NES").unwrap(),
            PathBuf::from("/data")
        );
    }

    #[test]
    fn write_then_load_and_backup_on_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            download_dir: dir.path().join("output"),
            ..Config::default()
        };
        config.write(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Configuration file for"));
        assert_eq!(Config::load(&path).unwrap(), config);

        // Same content again: no backup.
        config.write(&path).unwrap();
        let count_baks = || {
            std::fs::read_dir(dir.path())
                .unwrap()
                .filter(|e| {
                    e.as_ref()
                        .unwrap()
                        .file_name()
                        .to_string_lossy()
                        .ends_with(".bak")
                })
                .count()
        };
        assert_eq!(count_baks(), 0);

        let changed = Config {
            download_dir: dir.path().join("elsewhere"),
            ..Config::default()
        };
        changed.write(&path).unwrap();
        assert_eq!(count_baks(), 1);
        assert_eq!(Config::load(&path).unwrap(), changed);
    }

    #[test]
    fn overview_marks_empty_lists() {
        let mut config = Config::default();
        config.myrient_downloader[0].game_allow_list.clear();
        let overview = config.overview();
        assert!(overview.contains("<All>"));
        assert!(overview.contains("<None>"));
        assert!(overview.contains("No-Intro"));
    }
}
