//! Resource fetcher.
//!
//! Opens any DTS document by canonical locator: local paths are read from
//! disk, remote URLs are fetched over HTTP with retry and backoff. EDINET
//! taxonomy URLs are rewritten to a local cache directory when the cached
//! file exists, so a fully mirrored taxonomy never touches the network.
//!
//! The fetcher performs no caching of its own; memoization of decoded
//! schemas lives in the loader.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, Response};
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{Result, XbrlError};
use crate::href::is_remote;

/// Remote prefix that is served from the local EDINET taxonomy cache.
pub const EDINET_TAXONOMY_PREFIX: &str = "http://disclosure.edinet-fsa.go.jp/taxonomy/";

/// Default cache root when `EDINET_TAXONOMY_DIR` is unset.
pub const DEFAULT_TAXONOMY_DIR: &str = "/app/taxonomy/all/taxonomy/";

/// Configuration for the resource fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Remote URL prefix eligible for the local-cache rewrite
    pub remote_prefix: String,
    /// Local directory the prefix is rewritten to
    pub cache_root: PathBuf,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts for failed downloads
    pub retry_attempts: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds (exponential backoff cap)
    pub max_retry_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        let cache_root = std::env::var("EDINET_TAXONOMY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TAXONOMY_DIR));

        Self {
            remote_prefix: EDINET_TAXONOMY_PREFIX.to_string(),
            cache_root,
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
            user_agent: format!("xbrl-dts/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Async fetcher for local and remote DTS documents
pub struct ResourceFetcher {
    client: Client,
    config: FetcherConfig,
}

impl ResourceFetcher {
    /// Create a new fetcher with the given configuration
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(XbrlError::from)?;

        Ok(Self { client, config })
    }

    /// Open a document by URL or filesystem path into a fully buffered byte
    /// slice. Empty content is an error.
    pub async fn open(&self, locator: &str) -> Result<Vec<u8>> {
        let locator = self.rewrite_to_cache(locator).await;

        let data = if is_remote(&locator) {
            debug!(url = %locator, "fetching remote document");
            self.download(&locator).await?
        } else {
            debug!(path = %locator, "reading local document");
            tokio::fs::read(&locator).await.map_err(XbrlError::Io)?
        };

        if data.is_empty() {
            return Err(XbrlError::EmptyDocument { location: locator });
        }
        Ok(data)
    }

    /// Rewrite an EDINET taxonomy URL to the local cache when the cached file
    /// exists; otherwise the locator is returned unchanged.
    async fn rewrite_to_cache(&self, locator: &str) -> String {
        if let Some(suffix) = locator.strip_prefix(&self.config.remote_prefix) {
            let cached = self.config.cache_root.join(suffix);
            if tokio::fs::metadata(&cached).await.is_ok() {
                return cached.to_string_lossy().into_owned();
            }
        }
        locator.to_string()
    }

    /// Download with retry and exponential backoff
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_response_with_retry(url).await?;
        let bytes = response.bytes().await.map_err(XbrlError::from)?;
        Ok(bytes.to_vec())
    }

    async fn get_response_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;

        loop {
            match self.make_request(url).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // Retry on server errors (5xx) but not client errors (4xx)
                    if status.is_server_error() && attempt < self.config.retry_attempts {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(XbrlError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Err(error) => {
                    if attempt < self.config.retry_attempts && is_retryable_error(&error) {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn make_request(&self, url: &str) -> Result<Response> {
        let request_future = self.client.get(url).send();

        timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request_future,
        )
        .await
        .map_err(|_| XbrlError::Timeout {
            url: url.to_string(),
            timeout_seconds: self.config.timeout_seconds,
        })?
        .map_err(XbrlError::from)
    }

    async fn wait_before_retry(&self, attempt: u32) {
        let delay_ms = self.config.retry_delay_ms * 2_u64.pow(attempt);
        let capped = delay_ms.min(self.config.max_retry_delay_ms);
        sleep(Duration::from_millis(capped)).await;
    }

    /// Get the fetcher configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

fn is_retryable_error(error: &XbrlError) -> bool {
    match error {
        XbrlError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        XbrlError::Timeout { .. } => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn test_config() -> FetcherConfig {
        FetcherConfig {
            remote_prefix: EDINET_TAXONOMY_PREFIX.to_string(),
            cache_root: PathBuf::from("/nonexistent"),
            timeout_seconds: 5,
            retry_attempts: 0,
            retry_delay_ms: 10,
            max_retry_delay_ms: 100,
            user_agent: "xbrl-dts-test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_local_file() {
        let fetcher = ResourceFetcher::new(test_config()).unwrap();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<schema/>").unwrap();
        file.flush().unwrap();

        let data = fetcher
            .open(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(data, b"<schema/>");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let fetcher = ResourceFetcher::new(test_config()).unwrap();
        let result = fetcher.open("/nonexistent/schema.xsd").await;
        assert!(matches!(result, Err(XbrlError::Io(_))));
    }

    #[tokio::test]
    async fn test_open_empty_file_is_error() {
        let fetcher = ResourceFetcher::new(test_config()).unwrap();
        let file = NamedTempFile::new().unwrap();

        let result = fetcher.open(&file.path().to_string_lossy()).await;
        assert!(matches!(result, Err(XbrlError::EmptyDocument { .. })));
    }

    #[tokio::test]
    async fn test_edinet_url_rewritten_to_cache() {
        let cache = TempDir::new().unwrap();
        let cached_file = cache.path().join("jppfs/2021/jppfs_cor.xsd");
        std::fs::create_dir_all(cached_file.parent().unwrap()).unwrap();
        std::fs::write(&cached_file, "<schema/>").unwrap();

        let config = FetcherConfig {
            cache_root: cache.path().to_path_buf(),
            ..test_config()
        };
        let fetcher = ResourceFetcher::new(config).unwrap();

        let url = format!("{}jppfs/2021/jppfs_cor.xsd", EDINET_TAXONOMY_PREFIX);
        let data = fetcher.open(&url).await.unwrap();
        assert_eq!(data, b"<schema/>");
    }

    #[tokio::test]
    async fn test_non_edinet_url_not_rewritten() {
        let fetcher = ResourceFetcher::new(test_config()).unwrap();
        let rewritten = fetcher
            .rewrite_to_cache("http://example.com/taxonomy/a.xsd")
            .await;
        assert_eq!(rewritten, "http://example.com/taxonomy/a.xsd");
    }

    #[test]
    fn test_retryable_error_detection() {
        let timeout = XbrlError::Timeout {
            url: "http://example.com".to_string(),
            timeout_seconds: 5,
        };
        assert!(is_retryable_error(&timeout));

        let status = XbrlError::HttpStatus {
            url: "http://example.com".to_string(),
            status: 404,
        };
        assert!(!is_retryable_error(&status));
    }
}
