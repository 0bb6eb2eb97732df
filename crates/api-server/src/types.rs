//! API response types

use html2xlsx_common::ErrorCode;
use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub active_requests: usize,
    pub max_concurrent: usize,
    /// Formatted as `"8.3%"`
    pub server_load: String,
}

/// `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub server_info: ServerInfo,
    pub limits: Limits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub active_requests: usize,
    pub max_concurrent_requests: usize,
    pub max_workers: usize,
    pub server_load_percentage: f64,
    pub available_slots: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_file_size_mb: f64,
    pub request_timeout_seconds: u64,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub endpoints: Endpoints,
    pub features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(rename = "/process")]
    pub process: String,
    #[serde(rename = "/health")]
    pub health: String,
    #[serde(rename = "/status")]
    pub status: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            process: "POST - Upload HTML file for processing".to_string(),
            health: "GET - Health check".to_string(),
            status: "GET - Detailed server status".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    pub concurrent_users: String,
    pub max_file_size: String,
    pub thread_pool_workers: usize,
}
