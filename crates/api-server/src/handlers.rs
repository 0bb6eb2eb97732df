//! HTTP request handlers for API endpoints

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use html2xlsx_common::ProcessingError;
use html2xlsx_extract::decode_upload;
use std::path::Path;
use tracing::{error, info, warn};

use crate::{
    types::{ApiInfo, Endpoints, ErrorResponse, Features, HealthResponse, Limits, ServerInfo, StatusResponse},
    ApiState,
};

/// Multipart field carrying the upload
pub const UPLOAD_FIELD: &str = "html_file";

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A [`ProcessingError`] rendered as `{ "error", "code" }`
#[derive(Debug)]
pub struct ApiError(pub ProcessingError);

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.0.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

/// An upload read from the multipart body
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Find the upload field and read it, stopping as soon as it passes `max_size`.
async fn read_upload(multipart: &mut Multipart, max_size: u64) -> Result<Upload, ProcessingError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_size))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ProcessingError::EmptyFilename);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(&e, max_size))?
        {
            bytes.extend_from_slice(&chunk);
            let size = bytes.len() as u64;
            if size > max_size {
                return Err(ProcessingError::FileTooLarge {
                    size,
                    max: max_size,
                });
            }
        }

        return Ok(Upload { filename, bytes });
    }

    Err(ProcessingError::NoFile)
}

fn multipart_error(err: &axum::extract::multipart::MultipartError, max_size: u64) -> ProcessingError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProcessingError::FileTooLarge {
            size: max_size.saturating_add(1),
            max: max_size,
        }
    } else {
        ProcessingError::Other(err.body_text())
    }
}

/// `{stem}_processed.xlsx`
fn output_filename(upload_name: &str) -> String {
    let stem = Path::new(upload_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output");
    format!("{}_processed.xlsx", stem.replace('"', ""))
}

/// Convert an uploaded HTML file into a workbook
pub async fn process_html(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let guard = state.admission.try_admit()?;
    let request_id = guard.id();

    let Ok(mut multipart) = multipart else {
        return Err(ProcessingError::NoFile.into());
    };

    let upload = read_upload(&mut multipart, state.limits.max_file_size)
        .await
        .inspect_err(|e| warn!("Request {} rejected: {}", request_id, e))?;
    info!(
        "Request {}: received {} ({} bytes)",
        request_id,
        upload.filename,
        upload.bytes.len()
    );

    let html = decode_upload(&upload.bytes)?;
    let converter = state.converter.clone();
    let filename = upload.filename.clone();
    let job = state
        .workers
        .run(move || converter.process(&html, &filename));

    let timeout = state.limits.request_timeout();
    let output = match tokio::time::timeout(timeout, job).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            error!("Request {} failed: {}", request_id, e);
            return Err(e.into());
        }
        Err(_) => {
            error!("Request {} timed out after {}s", request_id, timeout.as_secs());
            return Err(ProcessingError::Timeout(timeout.as_secs()).into());
        }
    };

    let download_name = output_filename(&upload.filename);
    info!(
        "Request {}: returning {} ({} bytes, {} image(s))",
        request_id,
        download_name,
        output.workbook.len(),
        output.stats.image_count
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        output.workbook,
    )
        .into_response())
}

/// Health check endpoint
pub async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "Server is running".to_string(),
        message: "HTML to Excel converter is ready".to_string(),
        active_requests: state.admission.active_count(),
        max_concurrent: state.admission.max_concurrent(),
        server_load: format!("{:.1}%", state.admission.load_percentage()),
    })
}

/// Detailed load and limits
pub async fn server_status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(StatusResponse {
        server_info: ServerInfo {
            active_requests: state.admission.active_count(),
            max_concurrent_requests: state.admission.max_concurrent(),
            max_workers: state.workers.size(),
            server_load_percentage: state.admission.load_percentage(),
            available_slots: state.admission.available_slots(),
        },
        limits: Limits {
            max_file_size_mb: state.limits.max_file_size_mb(),
            request_timeout_seconds: state.limits.request_timeout_secs,
        },
    })
}

/// API information
pub async fn home(State(state): State<ApiState>) -> impl IntoResponse {
    Json(ApiInfo {
        message: "HTML to Excel Converter API".to_string(),
        endpoints: Endpoints::default(),
        features: Features {
            concurrent_users: format!(
                "Up to {} concurrent requests",
                state.admission.max_concurrent()
            ),
            max_file_size: format!("{}MB", state.limits.max_file_size_mb()),
            thread_pool_workers: state.workers.size(),
        },
    })
}
