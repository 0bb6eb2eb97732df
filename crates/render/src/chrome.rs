//! Headless Chrome implementation of [`ElementCapture`]

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{CapturedElement, ElementCapture, RenderError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser launch and wait settings
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// How long to wait for the first selector match
    pub selector_timeout: Duration,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            selector_timeout: Duration::from_secs(30),
            window_width: 1280,
            window_height: 800,
        }
    }
}

/// Captures elements with a fresh headless Chrome per call.
///
/// Every call launches its own browser and incognito context, so concurrent
/// calls share no page state.
#[derive(Debug, Clone, Default)]
pub struct ChromeCapture {
    options: ChromeOptions,
}

impl ChromeCapture {
    #[must_use]
    pub const fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    fn launch(&self) -> Result<Browser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((self.options.window_width, self.options.window_height)))
            // Keep the connection alive for the whole selector wait
            .idle_browser_timeout(self.options.selector_timeout + Duration::from_secs(60))
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Browser::new(launch_options).map_err(|e| RenderError::Launch(e.to_string()))
    }

    /// Poll until at least one element matches or the wait runs out.
    fn wait_for_elements<'a>(&self, tab: &'a Tab, selector: &str) -> Result<Vec<Element<'a>>> {
        let deadline = Instant::now() + self.options.selector_timeout;
        loop {
            if let Ok(elements) = tab.find_elements(selector) {
                if !elements.is_empty() {
                    return Ok(elements);
                }
            }
            if Instant::now() >= deadline {
                return Err(RenderError::SelectorTimeout {
                    selector: selector.to_string(),
                    waited_secs: self.options.selector_timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// `file://` URL for an absolute, canonical path
fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

impl ElementCapture for ChromeCapture {
    fn capture_elements(&self, document: &Path, selector: &str) -> Result<Vec<CapturedElement>> {
        if !document.is_file() {
            return Err(RenderError::MissingInput(document.to_path_buf()));
        }
        let canonical = document
            .canonicalize()
            .map_err(|_| RenderError::MissingInput(document.to_path_buf()))?;

        info!("Opening HTML file: {}", canonical.display());
        let browser = self.launch()?;
        let context = browser
            .new_context()
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        let tab = context
            .new_tab()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        tab.navigate_to(&file_url(&canonical))
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let elements = self.wait_for_elements(&tab, selector)?;
        info!("Found {} element(s) matching {}", elements.len(), selector);

        let mut captures = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            let sequence = i + 1;
            debug!("Taking screenshot of element {}", sequence);
            let png = element
                .capture_screenshot(CaptureScreenshotFormatOption::Png)
                .map_err(|e| RenderError::Capture {
                    sequence,
                    message: e.to_string(),
                })?;
            captures.push(CapturedElement { sequence, png });
        }

        Ok(captures)
    }
}
