use navfeed::App;
use navfeed::core::config::AppConfig;
use navfeed::core::nav::UNKNOWN;
use navfeed::pipeline::RunOutcome;
use navfeed::scheduler;
use std::collections::HashSet;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const FEED: &str = "\
Scheme Code;ISIN Div Payout/ ISIN Growth;ISIN Div Reinvestment;Scheme Name;Net Asset Value;Date

Open Ended Schemes(Equity Scheme - Large Cap Fund)

HDFC Mutual Fund

100001;INF179K01BE2;-;HDFC Top 100 Fund - Growth;1050.2300;01-Jan-2025
100001;INF179K01BE2;-;HDFC Top 100 Fund - Growth;1061.1100;05-Jan-2025
100002;INF200K01180;-;SBI Bluechip Fund - Growth;88.4100;05-Jan-2025
100003;INF846K01164;-;Axis Retired Fund;12.0000;01-Jan-2024
100004;INF846K01DP8;INF846K01DQ6;Axis Midcap Fund;101.0100;06-Jan-2025
100005;INF204K01XI3;-;Nippon India Small Cap;150.5500
";

    /// Mock server for both the NAV feed and the per-scheme metadata API.
    pub async fn create_mock_server() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/spages/NAVAll.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        for (code, category) in [
            ("100001", "Equity Scheme - Large Cap Fund"),
            ("100004", "Equity Scheme - Mid Cap Fund"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/mf/{code}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"{{"meta": {{"scheme_category": "{category}", "scheme_type": "Open Ended Schemes"}}, "data": []}}"#
                )))
                .mount(&server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/mf/100002"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
            .mount(&server)
            .await;

        server
    }

    pub fn config_yaml(server_uri: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
providers:
  amfi:
    feed_url: "{server_uri}/spages/NAVAll.txt"
  mfapi:
    base_url: "{server_uri}"
pipeline:
  cutoff_year: 2025
  batch_size: 2
  request_timeout_secs: 5
data_path: "{}"
"#,
            data_path.display()
        )
    }
}

#[test_log::test(tokio::test)]
async fn test_full_refresh_and_restart() {
    let server = test_utils::create_mock_server().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(
        config_file.path(),
        test_utils::config_yaml(&server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");

    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let app = App::from_config(config.clone()).unwrap();

    let RunOutcome::Started(report) = app.pipeline.run().await.unwrap() else {
        panic!("Pipeline run was skipped");
    };
    assert_eq!(report.parsed_rows, 5);
    assert_eq!(report.cleaned, 3);

    let enriched_count = report.enrichment.await.unwrap();
    assert_eq!(enriched_count, Some(3));

    let enriched = app.cache.enriched().await;
    info!(?enriched, "Enriched generation");

    let codes: HashSet<_> = enriched.iter().map(|r| r.record.scheme_code.as_str()).collect();
    assert_eq!(codes, HashSet::from(["100001", "100002", "100004"]));

    for record in enriched.iter() {
        match record.record.scheme_code.as_str() {
            "100001" => {
                assert_eq!(record.record.net_asset_value, "1061.1100");
                assert_eq!(record.category, "Equity Scheme - Large Cap Fund");
                assert_eq!(record.scheme_type, "Open Ended Schemes");
            }
            "100002" => {
                assert_eq!(record.category, UNKNOWN);
                assert_eq!(record.scheme_type, UNKNOWN);
            }
            "100004" => {
                assert_eq!(record.record.isin_reinvestment.as_deref(), Some("INF846K01DQ6"));
            }
            other => panic!("Unexpected scheme {other}"),
        }
    }

    let cache_dir = data_dir.path().join("cache");
    for file in ["nav-cleaned.json", "nav-shuffled.json", "nav-final.json"] {
        assert!(cache_dir.join(file).exists(), "{file} missing");
    }

    // A fresh process serves the same data straight from disk
    let restarted = App::from_config(config).unwrap();
    assert!(restarted.cache.enriched().await.is_empty());
    assert_eq!(scheduler::load_on_startup(&restarted.cache).await, 3);
    assert_eq!(*restarted.cache.enriched().await, *enriched);
}

#[test_log::test(tokio::test)]
async fn test_feed_outage_keeps_previous_cache() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let data_dir = tempfile::tempdir().unwrap();
    let cache_dir = data_dir.path().join("cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(cache_dir.join("nav-final.json"), "[]").unwrap();

    let config = AppConfig::from_yaml(&test_utils::config_yaml(&server.uri(), data_dir.path())).unwrap();
    let app = App::from_config(config).unwrap();

    assert!(app.pipeline.run().await.is_err());
    assert!(!cache_dir.join("nav-cleaned.json").exists());
    assert_eq!(
        std::fs::read_to_string(cache_dir.join("nav-final.json")).unwrap(),
        "[]"
    );

    // The failed run released its guard, so a retry runs instead of skipping
    assert!(app.pipeline.run().await.is_err());
}
