//! Element capture for html2xlsx
//!
//! Loads an HTML file in a headless browser and captures one PNG per element
//! matching a CSS selector, clipped to the element's bounding box.

mod chrome;

pub use chrome::{ChromeCapture, ChromeOptions};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Element capture errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTML file not found at {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load document: {0}")]
    Navigation(String),

    #[error("No element matched {selector:?} within {waited_secs}s")]
    SelectorTimeout { selector: String, waited_secs: u64 },

    #[error("Failed to capture element {sequence}: {message}")]
    Capture { sequence: usize, message: String },
}

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// A captured element image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedElement {
    /// 1-based position among the matched elements, in document order
    pub sequence: usize,
    /// PNG-encoded pixels of the element's bounding box
    pub png: Vec<u8>,
}

/// Something that can turn the matches of a selector into images
pub trait ElementCapture: Send + Sync {
    /// Load `document` and capture every element matching `selector`, in
    /// document order.
    ///
    /// Fails with [`RenderError::SelectorTimeout`] when nothing matches
    /// within the implementation's bounded wait.
    fn capture_elements(&self, document: &Path, selector: &str) -> Result<Vec<CapturedElement>>;
}
