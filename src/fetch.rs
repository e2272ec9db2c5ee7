//! Page retrieval with exponential backoff.
//!
//! Extraction itself never performs I/O; this module is how the binary turns
//! an `--input` (a URL or a saved page on disk) into markup.
//!
//! - [`FetchAsync`]: the async retrieval seam
//! - [`HttpFetch`] / [`FileFetch`]: the two concrete sources
//! - [`RetryFetch`]: decorator adding backoff with jitter to any fetcher
//! - [`SourceFetch`]: picks HTTP or file by the shape of the input
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), 30s) + random_jitter(0..250ms)
//! ```

use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Async retrieval of one page's markup.
pub trait FetchAsync {
    async fn fetch(&self, source: &str) -> Result<String, Box<dyn Error>>;
}

/// Whether `source` is an http(s) URL rather than a path.
pub fn is_url(source: &str) -> bool {
    Url::parse(source).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetch {
    #[instrument(level = "info", skip_all, fields(url = %source))]
    async fn fetch(&self, source: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(source)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        info!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched page");
        Ok(body)
    }
}

/// Reads a saved page from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetch;

impl FetchAsync for FileFetch {
    #[instrument(level = "info", skip_all, fields(path = %source))]
    async fn fetch(&self, source: &str) -> Result<String, Box<dyn Error>> {
        let body = fs::read_to_string(source).await?;
        debug!(bytes = body.len(), "Read page from disk");
        Ok(body)
    }
}

/// Adds exponential backoff with jitter to any [`FetchAsync`].
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: FetchAsync> RetryFetch<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: FetchAsync> FetchAsync for RetryFetch<T> {
    #[instrument(level = "info", skip_all, fields(%source))]
    async fn fetch(&self, source: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(source).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis(),
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// HTTP for URLs, the filesystem for everything else. Only network fetches
/// are retried.
#[derive(Debug)]
pub struct SourceFetch {
    http: RetryFetch<HttpFetch>,
    file: FileFetch,
}

impl SourceFetch {
    pub fn new(max_retries: usize, base_delay: Duration, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            http: RetryFetch::new(HttpFetch::new(timeout)?, max_retries, base_delay),
            file: FileFetch,
        })
    }
}

impl FetchAsync for SourceFetch {
    async fn fetch(&self, source: &str) -> Result<String, Box<dyn Error>> {
        if is_url(source) {
            self.http.fetch(source).await
        } else {
            self.file.fetch(source).await
        }
    }
}
