/// Common types and utilities for HTML to spreadsheet conversion
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{Config, ConversionConfig, LayoutConfig, ServerConfig};

/// Processing errors surfaced to callers of the conversion pipeline
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("No file uploaded")]
    NoFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("File size ({size} bytes) exceeds limit ({max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unable to decode file content")]
    Encoding,

    #[error("Processing timeout after {0}s. File may be too complex.")]
    Timeout(u64),

    #[error("Expected elements never appeared: {0}")]
    SelectorTimeout(String),

    #[error("Server is busy. Please try again in a moment.")]
    ServerBusy,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Processing failed: {0}")]
    Other(String),
}

impl ProcessingError {
    /// Machine-readable code reported alongside this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoFile => ErrorCode::NoFile,
            Self::EmptyFilename => ErrorCode::EmptyFilename,
            Self::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            Self::Encoding => ErrorCode::EncodingError,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::ServerBusy => ErrorCode::ServerBusy,
            Self::SelectorTimeout(_) | Self::IoError(_) | Self::Other(_) => {
                ErrorCode::ProcessingError
            }
        }
    }
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Stable error codes of the HTTP surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoFile,
    EmptyFilename,
    FileTooLarge,
    EncodingError,
    Timeout,
    ProcessingError,
    ServerBusy,
}

impl ErrorCode {
    /// HTTP status code paired with this error code
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NoFile | Self::EmptyFilename | Self::EncodingError => 400,
            Self::Timeout => 408,
            Self::FileTooLarge => 413,
            Self::ProcessingError => 500,
            Self::ServerBusy => 503,
        }
    }

    /// Wire representation, e.g. `SERVER_BUSY`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoFile => "NO_FILE",
            Self::EmptyFilename => "EMPTY_FILENAME",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::EncodingError => "ENCODING_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::ServerBusy => "SERVER_BUSY",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
