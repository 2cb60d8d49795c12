//! Attachment downloading with bounded retry.
//!
//! Downloads are independently awaited, sequenced by the collection
//! controller. Network failures are treated as transient and retried with
//! exponential backoff up to a bounded attempt count; HTTP status
//! failures are terminal for that document. Either way a failed download
//! never fails the item — the file is logged and recorded as absent.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{DownloadError, DownloadResult};

/// Download capability, kept behind a trait so tests and alternative
/// transports can stand in for HTTP.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the bytes at `url`.
    async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>>;

    /// Downloader name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Retry pacing for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    /// Exponential backoff delay before the given retry (1-based attempt
    /// that just failed).
    fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(1 << (attempt - 1).min(16)))
    }
}

/// Fetch with retry: transient errors back off and retry, terminal errors
/// return immediately.
pub async fn fetch_with_retry<D>(
    downloader: &D,
    url: &str,
    policy: &RetryPolicy,
) -> DownloadResult<Vec<u8>>
where
    D: Downloader + ?Sized,
{
    let mut attempt = 1;
    loop {
        match downloader.fetch(url).await {
            Ok(bytes) => {
                debug!(url = %url, bytes = bytes.len(), attempt = attempt, "download succeeded");
                return Ok(bytes);
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    url = %url,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient download failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP downloader over a shared reqwest client.
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> DownloadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DownloadError::Transport(Box::new(e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::Transport(Box::new(e)))?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first N fetches with a transient error, then succeeds.
    struct FlakyDownloader {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyDownloader {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Downloader for FlakyDownloader {
        async fn fetch(&self, _url: &str) -> DownloadResult<Vec<u8>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(DownloadError::Transport("connection reset".into()))
            } else {
                Ok(b"content".to_vec())
            }
        }
    }

    /// Always answers with an HTTP status error.
    struct GoneDownloader {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Downloader for GoneDownloader {
        async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DownloadError::Status {
                status: 404,
                url: url.to_string(),
            })
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, 1)
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let downloader = FlakyDownloader::new(2);
        let bytes = fetch_with_retry(&downloader, "https://x.test/a.pdf", &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(bytes, b"content");
        assert_eq!(downloader.call_count(), 3);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let downloader = FlakyDownloader::new(10);
        let err = fetch_with_retry(&downloader, "https://x.test/a.pdf", &fast_policy(3))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(downloader.call_count(), 3);
    }

    #[tokio::test]
    async fn test_status_failure_is_terminal() {
        let downloader = GoneDownloader {
            calls: AtomicU32::new(0),
        };
        let err = fetch_with_retry(&downloader, "https://x.test/a.pdf", &fast_policy(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Status { status: 404, .. }));
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(5, 100);
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
    }
}
