use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,

    /// Override the configured download directory
    #[arg(short, long)]
    pub download_dir: Option<PathBuf>,

    /// Network timeout in seconds for connecting and for each read
    #[arg(long, default_value = "15")]
    pub timeout: u64,

    /// Total attempts per file
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value = "5")]
    pub retry_delay: u64,

    /// Write a per-file CSV report of the run
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,

    /// Save the effective configuration back to the config path
    #[arg(long)]
    pub write_config: bool,

    /// Print the configuration overview and exit
    #[arg(long)]
    pub print_config: bool,
}
