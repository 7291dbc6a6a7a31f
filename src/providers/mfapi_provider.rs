use super::util::{RETRY_DELAY, duration_until, with_retry};
use crate::core::config::ScheduleConfig;
use crate::core::{MetadataProvider, SchemeDetails, cache::Cache};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Scheme metadata and NAV history from `api.mfapi.in`.
pub struct MfApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    cache: Arc<Cache<String, SchemeDetails>>,
    refresh: Option<ScheduleConfig>,
}

impl MfApiProvider {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        retries: usize,
        cache: Arc<Cache<String, SchemeDetails>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("navfeed/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
            cache,
            refresh: None,
        })
    }

    /// Expire cached lookups at the next scheduled refresh instead of keeping
    /// them for the lifetime of the process.
    pub fn with_refresh_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.refresh = Some(schedule);
        self
    }

    fn cache_ttl(&self) -> Option<Duration> {
        let schedule = self.refresh.as_ref()?;
        let ttl = schedule.offset().and_then(|offset| {
            duration_until(schedule.hour, schedule.minute, offset, chrono::Utc::now())
        });
        match ttl {
            Ok(ttl) => Some(ttl),
            Err(e) => {
                warn!(
                    "Failed calculating refresh TTL: {}. Using fallback 1 day",
                    e
                );
                Some(Duration::from_secs(24 * 60 * 60))
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for MfApiProvider {
    async fn fetch_metadata(&self, scheme_code: &str) -> Result<SchemeDetails> {
        if let Some(cached) = self.cache.get(&scheme_code.to_string()).await {
            return Ok(cached);
        }

        let url = format!("{}/mf/{}", self.base_url, scheme_code);
        debug!("Requesting scheme metadata from {}", url);

        let response = with_retry(
            || async {
                self.client
                    .get(&url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            self.retries,
            RETRY_DELAY,
        )
        .await
        .with_context(|| format!("Metadata request failed for scheme: {scheme_code}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for scheme: {scheme_code}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for scheme: {}", scheme_code));
        }

        let details: SchemeDetails = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse metadata response for scheme: {scheme_code}"))?;

        self.cache
            .put(scheme_code.to_string(), details.clone(), self.cache_ttl())
            .await;
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_CODE: &str = "119551";
    const MOCK_JSON: &str = r#"{
        "meta": {
            "fund_house": "Aditya Birla Sun Life Mutual Fund",
            "scheme_type": "Open Ended Schemes",
            "scheme_category": "Debt Scheme - Banking and PSU Fund",
            "scheme_code": 119551,
            "scheme_name": "Aditya Birla Sun Life Banking & PSU Debt Fund - DIRECT - IDCW"
        },
        "data": [
            {"date": "05-01-2025", "nav": "101.57430"},
            {"date": "04-01-2025", "nav": "101.52010"}
        ],
        "status": "SUCCESS"
    }"#;

    async fn create_mock_server(code: &str, body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/mf/{code}")))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(server: &MockServer) -> MfApiProvider {
        MfApiProvider::new(
            &server.uri(),
            Duration::from_secs(5),
            0,
            Arc::new(Cache::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let server = create_mock_server(TEST_CODE, MOCK_JSON, 200).await;

        let details = provider(&server).fetch_metadata(TEST_CODE).await.unwrap();

        assert_eq!(
            details.category().as_deref(),
            Some("Debt Scheme - Banking and PSU Fund")
        );
        assert_eq!(details.scheme_type().as_deref(), Some("Open Ended Schemes"));
        assert_eq!(details.data.len(), 2);
        assert_eq!(details.data[0].nav, "101.57430");
    }

    #[tokio::test]
    async fn test_fetch_metadata_without_meta() {
        let server = create_mock_server(TEST_CODE, r#"{"data": []}"#, 200).await;

        let details = provider(&server).fetch_metadata(TEST_CODE).await.unwrap();

        assert!(details.category().is_none());
        assert!(details.scheme_type().is_none());
    }

    #[tokio::test]
    async fn test_fetch_metadata_server_error() {
        let server = create_mock_server(TEST_CODE, "Server Error", 500).await;

        let err = provider(&server).fetch_metadata(TEST_CODE).await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with(&format!("Metadata request failed for scheme: {TEST_CODE}"))
        );
    }

    #[tokio::test]
    async fn test_fetch_metadata_empty_response() {
        let server = create_mock_server(TEST_CODE, "", 200).await;

        let err = provider(&server).fetch_metadata(TEST_CODE).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Received empty response for scheme: {TEST_CODE}")
        );
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/mf/{TEST_CODE}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server).with_refresh_schedule(ScheduleConfig::default());
        // First call should hit network
        provider.fetch_metadata(TEST_CODE).await.unwrap();
        // Second call should hit cache
        provider.fetch_metadata(TEST_CODE).await.unwrap();
    }
}
