//! HTML upload to floating-image workbook
//!
//! [`Packager`] turns the selector matches of an HTML file into a workbook;
//! [`Converter`] runs the whole per-request flow around it.

pub mod converter;
pub mod packager;

pub use converter::{
    summary_sheets, ConversionOutput, ConversionStats, Converter, OUTPUT_XLSX_NAME, TEMP_HTML_NAME,
};
pub use packager::{convert_html_to_workbook, PackageReport, Packager};

use html2xlsx_common::ProcessingError;
use html2xlsx_render::RenderError;
use html2xlsx_workbook::WorkbookError;
use thiserror::Error;

/// Packaging errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for packaging operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<PipelineError> for ProcessingError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Render(RenderError::SelectorTimeout { selector, waited_secs }) => {
                Self::SelectorTimeout(format!("{selector} after {waited_secs}s"))
            }
            PipelineError::IoError(e) => Self::IoError(e),
            other => Self::Other(other.to_string()),
        }
    }
}
