//! Artifact Fetcher
//!
//! Retrying download primitives shared by the manifest client and the
//! orchestrator, plus artifact checksum computation. Timeouts are retried
//! with linear backoff; every other failure aborts immediately. Binary
//! downloads stream to disk and never leave a partial file behind.

use crate::core::retry::{retry_async, RetryPolicy};
use crate::update::error::{FetchError, UpdateError, UpdateResult};
use sha2::{Digest, Sha512};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Connection establishment timeout per request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Overall per-request timeout covering the response read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

const BUFFER_SIZE: usize = 8192;
const USER_AGENT: &str = concat!("plugdepot/", env!("CARGO_PKG_VERSION"));

/// HTTP download client with a shared retry policy.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl ArtifactFetcher {
    pub fn new() -> UpdateResult<Self> {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> UpdateResult<Self> {
        Self::with_timeouts(policy, CONNECT_TIMEOUT, READ_TIMEOUT)
    }

    /// Fully parameterised constructor; tests shrink the timeouts to keep
    /// timeout scenarios fast.
    pub fn with_timeouts(
        policy: RetryPolicy,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> UpdateResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpdateError::Network {
                cause: e.to_string(),
            })?;

        Ok(Self { client, policy })
    }

    /// Download a text resource (the manifest), retrying timeouts.
    pub async fn download_text(&self, url: &str) -> UpdateResult<String> {
        self.retrying(url, || self.fetch_text(url)).await
    }

    /// Download a binary resource to `dest`, retrying timeouts.
    ///
    /// On any failure the partially-written file is removed before the error
    /// propagates, so `dest` either holds the complete payload or nothing.
    pub async fn download_file(&self, url: &str, dest: &Path) -> UpdateResult<()> {
        self.retrying(url, || self.fetch_file(url, dest)).await
    }

    async fn retrying<T, Fut>(
        &self,
        url: &str,
        operation: impl FnMut() -> Fut,
    ) -> UpdateResult<T>
    where
        Fut: std::future::Future<Output = Result<T, FetchError>>,
    {
        retry_async(url, &self.policy, FetchError::is_retryable, operation)
            .await
            .map_err(|source| UpdateError::DownloadFailed {
                url: url.to_string(),
                source,
            })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        response.text().await.map_err(|e| classify(url, e))
    }

    async fn fetch_file(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let mut response = self.send(url).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut total: u64 = 0;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = file.write_all(&chunk).await {
                        drop(file);
                        remove_partial(dest).await;
                        return Err(e.into());
                    }
                    total += chunk.len() as u64;
                }
                Ok(None) => break,
                Err(e) => {
                    drop(file);
                    remove_partial(dest).await;
                    return Err(classify(url, e));
                }
            }
        }

        if let Err(e) = file.flush().await {
            drop(file);
            remove_partial(dest).await;
            return Err(e.into());
        }

        log::debug!("Downloaded {} bytes from {}", total, url);
        Ok(())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(response)
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            cause: error.to_string(),
        }
    }
}

async fn remove_partial(dest: &Path) {
    if let Err(e) = tokio::fs::remove_file(dest).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!(
                "Failed to remove partial download {}: {}",
                dest.display(),
                e
            );
        }
    }
}

/// SHA-512 of a file, streamed in fixed-size chunks, as lowercase hex.
pub async fn sha512_file(path: &Path) -> UpdateResult<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha512::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
