use crate::core::NavFeedProvider;
use crate::providers::util::{RETRY_DELAY, with_retry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Downloads the full `NAVAll.txt` feed published by AMFI.
pub struct AmfiFeedProvider {
    feed_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl AmfiFeedProvider {
    pub fn new(feed_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("navfeed/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            feed_url: feed_url.to_string(),
            client,
            retries,
        })
    }
}

#[async_trait]
impl NavFeedProvider for AmfiFeedProvider {
    async fn fetch_feed(&self) -> Result<String> {
        debug!("Requesting NAV feed from {}", self.feed_url);

        let response = with_retry(
            || async {
                self.client
                    .get(&self.feed_url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            self.retries,
            RETRY_DELAY,
        )
        .await
        .with_context(|| format!("Failed to fetch NAV feed from {}", self.feed_url))?;

        let text = response
            .text()
            .await
            .context("Failed to read NAV feed body")?;
        debug!(bytes = text.len(), "Fetched NAV feed");
        Ok(text)
    }
}
