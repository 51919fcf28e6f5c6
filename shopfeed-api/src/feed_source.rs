//! Feed byte-stream sources.

use crate::constants::DEFAULT_FEED_TIMEOUT_SECS;
use shopfeed_core::FeedError;
use std::io::Read;
use std::time::Duration;

/// Source of raw feed bytes.
///
/// `fetch` blocks; callers run it inside `spawn_blocking`. Returning a
/// plain reader keeps the parser streaming: nothing past the bytes it
/// consumes is ever downloaded into memory.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> Result<Box<dyn Read + Send>, FeedError>;
}

/// Feed source that downloads over HTTP.
pub struct HttpFeedSource {
    url: String,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self) -> Result<Box<dyn Read + Send>, FeedError> {
        // The blocking client must be built off the async runtime, so
        // it is constructed here, inside the spawn_blocking call.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FeedError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let response = client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::Unavailable {
                reason: format!("GET {} failed: {e}", self.url),
            })?;
        Ok(Box::new(response))
    }
}
