//! Screenshot-to-spreadsheet packaging

use html2xlsx_common::ConversionConfig;
use html2xlsx_render::{ChromeCapture, ChromeOptions, ElementCapture};
use html2xlsx_workbook::{build_workbook, plan_placements, save_workbook, PlacementPlan, SummarySheet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::Result;

/// What a packaging run wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub path: PathBuf,
    pub image_count: usize,
}

/// Captures selector matches and lays them out as floating images
#[derive(Clone)]
pub struct Packager {
    capture: Arc<dyn ElementCapture>,
    config: ConversionConfig,
}

impl Packager {
    pub fn new(capture: Arc<dyn ElementCapture>, config: ConversionConfig) -> Self {
        Self { capture, config }
    }

    /// Packager backed by headless Chrome with the configured wait and viewport
    #[must_use]
    pub fn with_chrome(config: ConversionConfig) -> Self {
        let capture = ChromeCapture::new(ChromeOptions {
            selector_timeout: config.selector_timeout(),
            window_width: config.viewport_width,
            window_height: config.viewport_height,
        });
        Self::new(Arc::new(capture), config)
    }

    #[must_use]
    pub const fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Capture every match of `selector` in `html_path` into a workbook at `output`.
    pub fn package(&self, html_path: &Path, selector: &str, output: &Path) -> Result<PackageReport> {
        self.package_with_summaries(html_path, selector, output, &[])
    }

    /// [`Packager::package`] with extra tabular sheets after the image sheet
    pub fn package_with_summaries(
        &self,
        html_path: &Path,
        selector: &str,
        output: &Path,
        summaries: &[SummarySheet],
    ) -> Result<PackageReport> {
        let captures = self.capture.capture_elements(html_path, selector)?;
        info!("Captured {} element(s) from {}", captures.len(), html_path.display());

        let images = captures.into_iter().map(|c| (c.sequence, c.png)).collect();
        let plan = plan_placements(images, &self.config.layout)?;
        self.write(&plan, output, summaries)
    }

    /// Workbook with padding rows only; no browser is started.
    pub fn write_image_free(&self, output: &Path, summaries: &[SummarySheet]) -> Result<PackageReport> {
        self.write(&PlacementPlan::empty(), output, summaries)
    }

    fn write(
        &self,
        plan: &PlacementPlan,
        output: &Path,
        summaries: &[SummarySheet],
    ) -> Result<PackageReport> {
        let mut workbook =
            build_workbook(plan, &self.config.sheet_name, &self.config.layout, summaries)?;
        save_workbook(&mut workbook, output)?;
        Ok(PackageReport {
            path: output.to_path_buf(),
            image_count: plan.placements.len(),
        })
    }
}

/// Package `html_path` with headless Chrome, logging instead of failing.
///
/// Returns the output path on success and `None` on any failure.
pub fn convert_html_to_workbook(
    html_path: &Path,
    output: &Path,
    selector: &str,
    config: &ConversionConfig,
) -> Option<PathBuf> {
    let packager = Packager::with_chrome(config.clone());
    match packager.package(html_path, selector, output) {
        Ok(report) => Some(report.path),
        Err(e) => {
            error!("Failed to convert {}: {}", html_path.display(), e);
            None
        }
    }
}
