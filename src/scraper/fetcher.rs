// fetcher.rs
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::scraper::{CancelToken, Throttle, TraversalError};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Something that turns a page URL into its HTML.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url, cancel: &CancelToken) -> Result<String, TraversalError>;
}

/// Fetches pages over HTTP, throttled and bounded by the cancel token's
/// deadline.
pub struct HttpFetcher {
    client: Client,
    throttle: Throttle,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(throttle: Throttle, timeout: Duration) -> Result<Self, TraversalError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TraversalError::Network(e.to_string()))?;

        Ok(Self {
            client,
            throttle,
            timeout,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url, cancel: &CancelToken) -> Result<String, TraversalError> {
        let _permit = self.throttle.acquire(cancel)?;

        let timeout = cancel.cap(self.timeout).ok_or(TraversalError::Cancelled)?;

        debug!("GET {url}");
        let resp = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if cancel.is_cancelled() {
                    TraversalError::Cancelled
                } else {
                    TraversalError::Network(e.to_string())
                }
            })?;

        check_status(resp.status(), url)?;

        resp.text()
            .map_err(|e| TraversalError::Network(e.to_string()))
    }
}

/// 403 and 429 mean the site is refusing us; any other non-success status is
/// an ordinary network failure.
pub(crate) fn check_status(status: StatusCode, url: &Url) -> Result<(), TraversalError> {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TraversalError::Blocked(format!("HTTP {status} for {url}")));
    }
    if !status.is_success() {
        return Err(TraversalError::Network(format!("HTTP {status} for {url}")));
    }
    Ok(())
}
