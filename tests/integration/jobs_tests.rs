//! Remote job API over HTTP

use crate::test_client;
use seo_lens::config::AuthKind;
use flate2::write::GzEncoder;
use flate2::Compression;
use seo_lens::http::FetchError;
use seo_lens::jobs::{
    download_artifact, DownloadError, HttpJobApi, JobApi, JobError, JobOutcome, JobPoller,
    JobStatus, TokioClock,
};
use seo_lens::query::extract_query_params;
use seo_lens::reports::read_url_column;
use seo_lens::NoProgress;
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn poller(api: HttpJobApi) -> JobPoller<HttpJobApi, TokioClock> {
    JobPoller::new(
        api,
        TokioClock::new(),
        Duration::from_millis(10),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_submit_poll_and_download_url() {
    let mock_server = MockServer::start().await;
    let request = json!({"job_type": "export", "payload": {"query": {"dimensions": ["url"]}}});

    Mock::given(method("POST"))
        .and(path("/v1/jobs"))
        .and(header("Authorization", "Token secret"))
        .and(body_json(&request))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": 12, "job_status": "CREATED"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs/12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_id": 12, "job_status": "RUNNING"})),
        )
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs/12"))
        .and(header("Authorization", "Token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": 12,
            "job_status": "DONE",
            "results": {"download_url": "https://d.example.com/export-12.zip"}
        })))
        .mount(&mock_server)
        .await;

    let api = HttpJobApi::new(
        test_client(),
        &format!("{}/v1", mock_server.uri()),
        AuthKind::Token,
        "secret",
    );
    let outcome = poller(api).submit_and_await(&request).await.unwrap();

    assert_eq!(
        outcome,
        JobOutcome::Completed {
            download_url: "https://d.example.com/export-12.zip".to_string()
        }
    );
}

#[tokio::test]
async fn test_submit_rejected_without_polling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid query"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let api = HttpJobApi::new(test_client(), &mock_server.uri(), AuthKind::Bearer, "t0k");
    let err = poller(api).submit_and_await(&json!({})).await.unwrap_err();

    match err {
        JobError::Submit { status, payload } => {
            assert_eq!(status, "HTTP 400");
            assert!(payload.contains("invalid query"));
        }
        other => panic!("expected submit error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"job_id": "a-1", "job_status": "CREATED"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/a-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_status": "FAILED",
            "results": {"error": "quota exceeded"}
        })))
        .mount(&mock_server)
        .await;

    let api = HttpJobApi::new(test_client(), &mock_server.uri(), AuthKind::Token, "secret");
    let err = poller(api).submit_and_await(&json!({})).await.unwrap_err();

    match err {
        JobError::Failed { job_id, payload } => {
            assert_eq!(job_id, "a-1");
            assert!(payload.contains("quota exceeded"));
        }
        other => panic!("expected job failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_custom_auth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/9"))
        .and(header("X-Api-Token", "abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"job_status": "PROCESSING"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = HttpJobApi::new(test_client(), &mock_server.uri(), AuthKind::Header, "abc");
    let handle = api.status("9").await.unwrap();

    assert_eq!(handle.status, JobStatus::Running);
    assert_eq!(handle.job_id.as_deref(), Some("9"));
}

#[tokio::test]
async fn test_malformed_status_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let api = HttpJobApi::new(test_client(), &mock_server.uri(), AuthKind::Token, "abc");
    assert!(matches!(
        api.status("9").await,
        Err(JobError::MalformedResponse(_))
    ));
}

fn gzipped(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_download_gzipped_export_feeds_param_tally() {
    let mock_server = MockServer::start().await;
    let export = "sep=,\nFull URL,HTTP Code\n\
                  https://example.com/shop?color=red&size=m,200\n\
                  https://example.com/shop?color=blue,200\n";

    Mock::given(method("GET"))
        .and(path("/exports/12/crawl.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(gzipped(export), "application/gzip"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/exports/12/crawl.csv.gz", mock_server.uri());
    let artifact = download_artifact(&test_client(), &url, dir.path())
        .await
        .unwrap();

    assert_eq!(artifact.archive, dir.path().join("crawl.csv.gz"));
    assert_eq!(artifact.extracted, Some(dir.path().join("crawl.csv")));
    assert_eq!(std::fs::read_to_string(artifact.report_path()).unwrap(), export);

    let urls = read_url_column(artifact.report_path(), &NoProgress).unwrap();
    let tally = extract_query_params(&urls);
    assert_eq!(tally.sorted(), vec![("color", 2), ("size", 1)]);
}

#[tokio::test]
async fn test_download_plain_export_is_kept_as_is() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exports/keywords.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8, 2, 3, 4], "application/zip"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/exports/keywords.zip", mock_server.uri());
    let artifact = download_artifact(&test_client(), &url, dir.path())
        .await
        .unwrap();

    assert_eq!(artifact.extracted, None);
    assert_eq!(artifact.report_path(), dir.path().join("keywords.zip"));
    assert_eq!(std::fs::read(artifact.report_path()).unwrap(), vec![1u8, 2, 3, 4]);
}

#[tokio::test]
async fn test_download_missing_export() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/exports/gone.csv.gz", mock_server.uri());
    let result = download_artifact(&test_client(), &url, dir.path()).await;

    assert!(matches!(
        result,
        Err(DownloadError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(!dir.path().join("gone.csv.gz").exists());
}
