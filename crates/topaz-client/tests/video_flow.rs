//! End-to-end video job tests against a mock API server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use topaz_client::{
    CancelToken, ClientConfig, ClientError, NoopProgress, ProgressSink, TopazClient,
};
use topaz_models::{upscale_filter, OutputSettings, SourceInfo, UpscaleOptions};

fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new("test-key");
    config.video_base_url = server.uri();
    config.poll_interval = Duration::from_millis(10);
    config.max_wait = Duration::from_secs(5);
    config
}

fn test_inputs() -> (SourceInfo, OutputSettings, Vec<topaz_models::Filter>) {
    let source = SourceInfo::placeholder(1024);
    let output = OutputSettings::default().matching_source(&source);
    let filter = upscale_filter(&UpscaleOptions::default());
    (source, output, vec![filter])
}

/// Serves processing at 10%, then 45%, then complete with a download URL.
struct StatusSequence {
    calls: AtomicUsize,
    download_url: String,
}

impl Respond for StatusSequence {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => ResponseTemplate::new(200)
                .set_body_json(json!({"status": "processing", "progress": 10})),
            1 => ResponseTemplate::new(200)
                .set_body_json(json!({"status": "processing", "progress": 45})),
            _ => ResponseTemplate::new(200).set_body_json(json!({
                "status": "complete",
                "progress": 100,
                "download": {"url": self.download_url}
            })),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<u8>>,
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn report(&self, percent: u8, _message: &str) {
        self.updates.lock().unwrap().push(percent);
    }
}

async fn mount_create(server: &MockServer, request_id: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"requestId": request_id})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_video_job_reports_monotonic_progress() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/part1", server.uri());
    let result_url = format!("{}/result", server.uri());

    mount_create(&server, "req-1").await;
    Mock::given(method("PATCH"))
        .and(path("/req-1/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "u-1",
            "urls": [upload_url]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc123\""))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/req-1/complete-upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/req-1/status"))
        .respond_with(StatusSequence {
            calls: AtomicUsize::new(0),
            download_url: result_url,
        })
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/result"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"processed-video".to_vec()))
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let sink = RecordingSink::default();
    let (source, output, filters) = test_inputs();

    let (job, bytes) = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw-video".to_vec(),
            &sink,
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(bytes, b"processed-video");
    assert_eq!(job.request_id, "req-1");
    assert_eq!(job.progress, 100);
    assert_eq!(*sink.updates.lock().unwrap(), vec![10, 45, 90, 100]);
}

#[tokio::test]
async fn test_accept_without_urls_fails_before_upload() {
    let server = MockServer::start().await;

    mount_create(&server, "req-2").await;
    Mock::given(method("PATCH"))
        .and(path("/req-2/accept"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"uploadId": "u-2", "urls": []})),
        )
        .mount(&server)
        .await;
    // The flow must stop before ever issuing a PUT.
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let (source, output, filters) = test_inputs();

    let err = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw".to_vec(),
            &NoopProgress,
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_request_id_is_protocol_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let (source, output, filters) = test_inputs();

    let err = client
        .create_request(&source, &output, &filters)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn test_upload_without_etag_is_protocol_violation() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let err = client
        .upload(&format!("{}/part1", server.uri()), b"data".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)), "got {err:?}");
    assert!(err.to_string().contains("ETag"));
}

#[tokio::test]
async fn test_failed_status_raises_remote_error() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/part1", server.uri());

    mount_create(&server, "req-3").await;
    Mock::given(method("PATCH"))
        .and(path("/req-3/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "u-3",
            "urls": [upload_url]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"e1\""))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/req-3/complete-upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // Capitalized terminal string, matched case-insensitively
    Mock::given(method("GET"))
        .and(path("/req-3/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Failed",
            "message": "source codec not supported"
        })))
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let (source, output, filters) = test_inputs();

    let err = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw".to_vec(),
            &NoopProgress,
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Remote { .. }), "got {err:?}");
    assert!(err.to_string().contains("source codec not supported"));
}

#[tokio::test]
async fn test_never_terminal_polling_times_out() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/part1", server.uri());

    mount_create(&server, "req-4").await;
    Mock::given(method("PATCH"))
        .and(path("/req-4/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "u-4",
            "urls": [upload_url]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"e1\""))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/req-4/complete-upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/req-4/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "processing", "progress": 50})),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.max_wait = Duration::from_millis(100);

    let client = TopazClient::new(config).unwrap();
    let (source, output, filters) = test_inputs();

    let err = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw".to_vec(),
            &NoopProgress,
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_cancellation_stops_polling() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/part1", server.uri());

    mount_create(&server, "req-5").await;
    Mock::given(method("PATCH"))
        .and(path("/req-5/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "u-5",
            "urls": [upload_url]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"e1\""))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/req-5/complete-upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/req-5/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})),
        )
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let (source, output, filters) = test_inputs();

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw".to_vec(),
            &NoopProgress,
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled(_)), "got {err:?}");
}

#[tokio::test]
async fn test_complete_without_download_url_is_protocol_violation() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/part1", server.uri());

    mount_create(&server, "req-6").await;
    Mock::given(method("PATCH"))
        .and(path("/req-6/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadId": "u-6",
            "urls": [upload_url]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/part1"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"e1\""))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/req-6/complete-upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/req-6/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "complete"})),
        )
        .mount(&server)
        .await;

    let client = TopazClient::new(test_config(&server)).unwrap();
    let (source, output, filters) = test_inputs();

    let err = client
        .run_to_completion(
            &source,
            &output,
            &filters,
            b"raw".to_vec(),
            &NoopProgress,
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)), "got {err:?}");
}
