//! Integration tests for the API server
//!
//! Each test serves the router on an ephemeral port and talks to it over
//! HTTP. Captures come from an in-process fake, so no browser is needed.

use html2xlsx_api_server::{serve, ApiState};
use html2xlsx_common::{ConversionConfig, ServerConfig};
use html2xlsx_pipeline::Converter;
use html2xlsx_render::{CapturedElement, ElementCapture};
use image::{ImageFormat, RgbaImage};
use reqwest::multipart::{Form, Part};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// One 40x20 PNG per container, after an optional delay
struct FakeCapture {
    calls: AtomicUsize,
    delay: Duration,
}

impl FakeCapture {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ElementCapture for FakeCapture {
    fn capture_elements(
        &self,
        document: &Path,
        _selector: &str,
    ) -> html2xlsx_render::Result<Vec<CapturedElement>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        let html = std::fs::read_to_string(document).unwrap();
        let count = html.matches("<div class=\"image-box\">").count();
        Ok((1..=count)
            .map(|sequence| {
                let mut png = Cursor::new(Vec::new());
                RgbaImage::new(40, 20)
                    .write_to(&mut png, ImageFormat::Png)
                    .unwrap();
                CapturedElement {
                    sequence,
                    png: png.into_inner(),
                }
            })
            .collect())
    }
}

fn server_config() -> ServerConfig {
    ServerConfig {
        max_workers: 2,
        max_concurrent_requests: 2,
        max_file_size: 1024,
        request_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

async fn spawn(server: ServerConfig, capture: Arc<FakeCapture>) -> (String, ApiState) {
    let converter = Converter::new(ConversionConfig::default(), capture);
    let state = ApiState::with_converter(server, converter);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state.clone()));
    (format!("http://{addr}"), state)
}

/// Marked document padded with a comment to exactly `len` bytes
fn marked_html(len: usize) -> Vec<u8> {
    let head = "<html><body><h4>Box</h4><p>Uncovered Link</p><!--";
    let tail = "--></body></html>";
    let padding = len - head.len() - tail.len();
    format!("{head}{}{tail}", "x".repeat(padding)).into_bytes()
}

fn upload(bytes: Vec<u8>, filename: &str) -> Form {
    Form::new().part("html_file", Part::bytes(bytes).file_name(filename.to_string()))
}

async fn error_code(response: reqwest::Response) -> String {
    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"].is_string());
    json["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (base, _state) = spawn(server_config(), FakeCapture::new(Duration::ZERO)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "Server is running");
    assert_eq!(json["active_requests"], 0);
    assert_eq!(json["max_concurrent"], 2);
    assert_eq!(json["server_load"], "0.0%");
}

#[tokio::test]
async fn test_status_and_home_endpoints() {
    let (base, _state) = spawn(server_config(), FakeCapture::new(Duration::ZERO)).await;

    let json: serde_json::Value = reqwest::get(format!("{base}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["server_info"]["max_workers"], 2);
    assert_eq!(json["server_info"]["available_slots"], 2);
    assert_eq!(json["limits"]["request_timeout_seconds"], 5);

    let json: serde_json::Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
    assert!(json["endpoints"]["/process"].is_string());
    assert_eq!(json["features"]["thread_pool_workers"], 2);
}

#[tokio::test]
async fn test_process_returns_workbook() {
    let capture = FakeCapture::new(Duration::ZERO);
    let (base, _state) = spawn(server_config(), capture.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .multipart(upload(marked_html(200), "report.html"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("report_processed.xlsx"));
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let bytes = response.bytes().await.unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let images = archive
        .file_names()
        .filter(|name| name.starts_with("xl/media/"))
        .count();
    assert_eq!(images, 1);
    assert_eq!(capture.calls(), 1);
}

#[tokio::test]
async fn test_missing_field_is_no_file() {
    let (base, _state) = spawn(server_config(), FakeCapture::new(Duration::ZERO)).await;

    let form = Form::new().text("other", "value");
    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "NO_FILE");
}

#[tokio::test]
async fn test_missing_filename_is_empty_filename() {
    let (base, _state) = spawn(server_config(), FakeCapture::new(Duration::ZERO)).await;

    let form = Form::new().part("html_file", Part::bytes(b"<html></html>".to_vec()));
    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(error_code(response).await, "EMPTY_FILENAME");
}

#[tokio::test]
async fn test_upload_size_limit_is_inclusive() {
    let capture = FakeCapture::new(Duration::ZERO);
    let (base, _state) = spawn(server_config(), capture.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/process"))
        .multipart(upload(marked_html(1024), "exact.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(capture.calls(), 1);

    let response = client
        .post(format!("{base}/process"))
        .multipart(upload(marked_html(1025), "over.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
    assert_eq!(error_code(response).await, "FILE_TOO_LARGE");
    assert_eq!(capture.calls(), 1);
}

#[tokio::test]
async fn test_busy_server_rejects_without_processing() {
    let capture = FakeCapture::new(Duration::ZERO);
    let (base, state) = spawn(server_config(), capture.clone()).await;

    let _held = [
        state.admission.try_admit().unwrap(),
        state.admission.try_admit().unwrap(),
    ];

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .multipart(upload(marked_html(200), "busy.html"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(error_code(response).await, "SERVER_BUSY");
    assert_eq!(capture.calls(), 0);
    assert_eq!(state.workers.available(), 2);
}

#[tokio::test]
async fn test_slow_conversion_times_out() {
    let server = ServerConfig {
        request_timeout_secs: 1,
        ..server_config()
    };
    let (base, state) = spawn(server, FakeCapture::new(Duration::from_secs(3))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process"))
        .multipart(upload(marked_html(200), "slow.html"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 408);
    assert_eq!(error_code(response).await, "TIMEOUT");
    assert_eq!(state.admission.active_count(), 0);
}
