use crate::error::DownloaderError;
use log::{error, warn};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay, bounded-attempt retry for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug)]
pub enum Attempted<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: DownloaderError },
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or the attempts run out.
    ///
    /// Only transient errors are retried; anything else is returned as `Err`
    /// straight away.
    pub async fn run<T, F, Fut>(&self, name: &str, mut op: F) -> Result<Attempted<T>, DownloaderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownloaderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    return Ok(Attempted::Succeeded {
                        value,
                        attempts: attempt,
                    })
                }
                Err(e) if e.is_transient() => {
                    error!("{}", e);
                    if attempt >= max_attempts {
                        return Ok(Attempted::Exhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    tokio::time::sleep(self.delay).await;
                    warn!("Retrying download for {} ({}/{})", name, attempt + 1, max_attempts);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
