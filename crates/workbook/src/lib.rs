//! Spreadsheet output for html2xlsx
//!
//! [`layout`] turns image pixel heights into non-overlapping sheet rows;
//! [`writer`] emits the xlsx with one floating image per placement.

pub mod layout;
pub mod writer;

pub use layout::{measure_png, plan_placements, ImagePlacement, PlacementPlan, RowCursor};
pub use writer::{build_workbook, padding_rows, save_workbook, workbook_to_buffer, SummarySheet};

use thiserror::Error;

/// Workbook errors
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Unreadable image {sequence}: {message}")]
    Image { sequence: usize, message: String },

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for workbook operations
pub type Result<T> = std::result::Result<T, WorkbookError>;
