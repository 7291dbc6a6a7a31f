use async_trait::async_trait;

/// Source of the raw delimited NAV text.
#[async_trait]
pub trait NavFeedProvider: Send + Sync {
    async fn fetch_feed(&self) -> anyhow::Result<String>;
}
