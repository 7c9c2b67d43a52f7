//! HTTP fetcher for downloading remote hosts lists.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

use crate::error::FetchError;
use crate::utils::format_bytes;

const TIMEOUT_SECS: u64 = 30;

/// Maximum concurrent HTTP requests to list servers
const MAX_CONCURRENT_REQUESTS: usize = 6;

/// Maximum size per list (20 MB)
/// Large aggregated hosts lists run around 5 MB
const MAX_LIST_SIZE: usize = 20 * 1024 * 1024;

/// Maximum total size for all downloads combined (100 MB)
const MAX_TOTAL_SIZE: usize = 100 * 1024 * 1024;

/// Outcome of fetching one source
#[derive(Debug)]
pub struct SourceFetch {
    pub source: String,
    pub result: Result<String, FetchError>,
}

impl SourceFetch {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Retrieves the body behind a URL.
///
/// Split out from [`Fetcher`] so ordering and failure isolation can be
/// exercised without a network.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`, refusing bodies larger than `max_size` bytes.
    async fn get(&self, url: &str, max_size: usize) -> Result<String, FetchError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("shadowhosts/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, max_size: usize) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Network(format!("timed out after {}s", TIMEOUT_SECS))
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_size {
                return Err(FetchError::TooLarge {
                    size: content_length as usize,
                    max: max_size,
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        // Content-Length can be absent or wrong
        if body.len() > max_size {
            return Err(FetchError::TooLarge {
                size: body.len(),
                max: max_size,
            });
        }

        Ok(body)
    }
}

/// Fetches remote lists concurrently
pub struct Fetcher<T: Transport = HttpTransport> {
    transport: T,
    /// Cumulative download size tracker (shared by concurrent fetches)
    total_downloaded: AtomicUsize,
}

impl Fetcher<HttpTransport> {
    /// Create a new fetcher with default settings
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }
}

// Note: Default is intentionally not implemented for Fetcher
// because new() can fail and we want explicit error handling.

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            total_downloaded: AtomicUsize::new(0),
        }
    }

    /// Get the total bytes downloaded so far
    pub fn total_downloaded(&self) -> usize {
        self.total_downloaded.load(Ordering::Relaxed)
    }

    /// Fetch a single source
    pub async fn fetch_source(&self, url: &str) -> SourceFetch {
        debug!("Fetching {}", url);

        let result = match self.transport.get(url, MAX_LIST_SIZE).await {
            Ok(body) => {
                let new_total = self
                    .total_downloaded
                    .fetch_add(body.len(), Ordering::Relaxed)
                    + body.len();
                if new_total > MAX_TOTAL_SIZE {
                    Err(FetchError::CumulativeLimit {
                        total: new_total,
                        max: MAX_TOTAL_SIZE,
                    })
                } else {
                    info!("Fetched {} ({})", url, format_bytes(body.len() as u64));
                    Ok(body)
                }
            }
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            warn!("Failed to fetch {}: {}", url, e);
        }

        SourceFetch {
            source: url.to_string(),
            result,
        }
    }

    /// Fetch all sources concurrently with limited parallelism.
    ///
    /// Results come back in the order of `sources`, whatever order the
    /// downloads finish in.
    pub async fn fetch_all(&self, sources: &[String]) -> Vec<SourceFetch> {
        use futures::stream::{self, StreamExt};

        stream::iter(sources.iter().map(|url| self.fetch_source(url)))
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await
    }
}
