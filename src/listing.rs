use crate::error::DownloaderError;
use crate::parser::parse_listing;
use log::info;
use std::time::Duration;

pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Shared client for listing and file requests. `timeout` bounds connecting;
/// reads are bounded per request by the callers.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, DownloaderError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .build()?;
    Ok(client)
}

/// Percent-encodes everything except unreserved characters, `:` and `/`.
pub fn encode_url(url: &str) -> String {
    url.split('/')
        .map(|segment| {
            segment
                .split(':')
                .map(|part| urlencoding::encode(part).into_owned())
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub struct ListingFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ListingFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches the page at `url` and returns the `.zip` names it lists.
    pub async fn fetch(&self, url: &str) -> Result<Vec<String>, DownloaderError> {
        info!("Getting file list from: {}", url);
        let encoded = encode_url(url);

        let resp = self
            .client
            .get(&encoded)
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DownloaderError::Http {
                url: encoded,
                status: resp.status(),
            });
        }

        let body = resp.text().await?;
        parse_listing(&body)
    }
}
