use crate::error::DownloaderError;
use crate::listing::encode_url;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub const PART_SUFFIX: &str = ".part";

/// Temporary sibling a download is written to before it is renamed into place.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    destination.with_file_name(name)
}

/// Deletes leftover `.part` files in `dir`, returning how many were removed.
pub async fn sweep_part_files(dir: &Path) -> Result<usize, DownloaderError> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_part = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.ends_with(PART_SUFFIX));
        if is_part && entry.file_type().await?.is_file() {
            warn!("Deleting incomplete file: {}", entry.path().display());
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub struct FileTransfer {
    client: reqwest::Client,
    read_timeout: Duration,
    show_progress: bool,
}

impl FileTransfer {
    pub fn new(client: reqwest::Client, read_timeout: Duration, show_progress: bool) -> Self {
        Self {
            client,
            read_timeout,
            show_progress,
        }
    }

    /// Streams `url` into `destination`'s `.part` file and renames it into
    /// place once the body is complete. Returns the number of bytes written.
    ///
    /// On error the destination is untouched; a partial `.part` may remain.
    pub async fn transfer(&self, url: &str, destination: &Path) -> Result<u64, DownloaderError> {
        let encoded = encode_url(url);
        let resp = tokio::time::timeout(self.read_timeout, self.client.get(&encoded).send())
            .await
            .map_err(|_| self.timed_out(&encoded))??;

        if !resp.status().is_success() {
            return Err(DownloaderError::Http {
                url: encoded,
                status: resp.status(),
            });
        }

        let pb = self.create_progress_bar(destination, resp.content_length().unwrap_or(0));
        match self.write_body(resp, &encoded, destination, &pb).await {
            Ok(downloaded) => {
                pb.finish_and_clear();
                debug!("Wrote {} bytes to {}", downloaded, destination.display());
                Ok(downloaded)
            }
            Err(e) => {
                pb.abandon();
                Err(e)
            }
        }
    }

    async fn write_body(
        &self,
        resp: reqwest::Response,
        url: &str,
        destination: &Path,
        pb: &ProgressBar,
    ) -> Result<u64, DownloaderError> {
        let temp = part_path(destination);
        let mut file = File::create(&temp).await?;
        let mut stream = resp.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let next = tokio::time::timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| self.timed_out(url))?;
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await?;
        drop(file);
        tokio::fs::rename(&temp, destination).await?;
        Ok(downloaded)
    }

    fn timed_out(&self, url: &str) -> DownloaderError {
        DownloaderError::ReadTimeout {
            url: url.to_string(),
            secs: self.read_timeout.as_secs(),
        }
    }

    fn create_progress_bar(&self, destination: &Path, total_size: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total_size);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(
            destination
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
        );
        pb
    }
}

/// Local server whose `.zip` responses promise 100000 bytes and hang up early.
/// Any other path gets `listing` as a complete HTML page. Returns the base URL
/// and a count of `.zip` requests served.
#[cfg(test)]
pub(crate) async fn truncated_body_server(
    listing: String,
) -> (
    String,
    std::sync::Arc<std::sync::atomic::AtomicUsize>,
    tokio::task::JoinHandle<()>,
) {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let zip_hits = Arc::new(AtomicUsize::new(0));
    let hits = zip_hits.clone();

    let handle = tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let wants_zip = request
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .is_some_and(|p| p.ends_with(".zip"));

            let response = if wants_zip {
                hits.fetch_add(1, Ordering::SeqCst);
                "HTTP/1.1 200 OK\r\ncontent-length: 100000\r\n\r\nonly a few bytes".to_string()
            } else {
                format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    listing.len(),
                    listing
                )
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{}", addr), zip_hits, handle)
}
