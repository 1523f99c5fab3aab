use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Failed to parse listing: {0}")]
    Listing(String),

    #[error("HTTP error: {status} for URL: {url}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Timed out after {secs}s reading from {url}")]
    ReadTimeout { url: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DownloaderError {
    /// Whether a transfer attempt that failed with this error may be retried.
    ///
    /// Network trouble and bad statuses are transient; local I/O and anything
    /// else is treated as fatal for the run.
    pub fn is_transient(&self) -> bool {
        match self {
            DownloaderError::Http { .. } | DownloaderError::ReadTimeout { .. } => true,
            DownloaderError::Request(e) => {
                e.is_timeout() || e.is_connect() || e.is_body() || e.is_request() || e.is_status()
            }
            _ => false,
        }
    }
}
