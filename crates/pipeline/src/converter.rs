//! Per-request conversion: extract, rebuild, capture, package

use html2xlsx_common::{ConversionConfig, ProcessingError, Result};
use html2xlsx_extract::{
    extract_meta_information, extract_regions_from_str, extract_tables, extract_text_content,
    write_document, ExtractedTable, MetaRecord, RegionOptions, TextRecord,
};
use html2xlsx_render::ElementCapture;
use html2xlsx_workbook::SummarySheet;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::packager::Packager;

/// Name of the rebuilt document inside the request workspace
pub const TEMP_HTML_NAME: &str = "temporaryHTML.html";
/// Name of the workbook inside the request workspace
pub const OUTPUT_XLSX_NAME: &str = "html2image2excel_output.xlsx";

/// Counts reported for one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub region_count: usize,
    pub image_count: usize,
    pub table_count: usize,
    pub text_count: usize,
    pub meta_count: usize,
    pub processing_time_ms: u64,
}

/// A finished workbook and how it was produced
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// xlsx bytes
    pub workbook: Vec<u8>,
    pub stats: ConversionStats,
}

/// Runs one upload through the whole pipeline
#[derive(Clone)]
pub struct Converter {
    packager: Packager,
}

impl Converter {
    pub fn new(config: ConversionConfig, capture: Arc<dyn ElementCapture>) -> Self {
        Self {
            packager: Packager::new(capture, config),
        }
    }

    /// Converter backed by headless Chrome
    #[must_use]
    pub fn with_chrome(config: ConversionConfig) -> Self {
        Self {
            packager: Packager::with_chrome(config),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ConversionConfig {
        self.packager.config()
    }

    /// Convert decoded upload text into workbook bytes.
    ///
    /// Blocking: call from a worker thread.
    pub fn process(&self, html: &str, filename: &str) -> Result<ConversionOutput> {
        let start = Instant::now();
        let config = self.config();
        info!("Processing {} ({} bytes)", filename, html.len());

        let tables = extract_tables(html);
        let text = extract_text_content(html);
        let meta = extract_meta_information(html);
        info!(
            "Extracted {} table(s), {} text record(s), {} meta tag(s)",
            tables.len(),
            text.len(),
            meta.len()
        );

        let workspace = tempfile::Builder::new().prefix("html2xlsx-").tempdir()?;
        let html_path = workspace.path().join(TEMP_HTML_NAME);
        let output_path = workspace.path().join(OUTPUT_XLSX_NAME);

        let regions = extract_regions_from_str(html, &RegionOptions::from(config));
        let containers = write_document(&html_path, &regions, &config.container_class)?;
        for container in &containers {
            debug!(
                "Container {}: {:?} ({} bytes)",
                container.index, container.heading, container.markup_len
            );
        }

        let summaries = if config.include_summaries {
            summary_sheets(&tables, &text, &meta)
        } else {
            Vec::new()
        };

        let report = if regions.is_empty() {
            info!("No region mentions {:?}; writing image-free workbook", config.marker_phrase);
            self.packager.write_image_free(&output_path, &summaries)
        } else {
            self.packager.package_with_summaries(
                &html_path,
                &config.container_selector(),
                &output_path,
                &summaries,
            )
        }
        .map_err(ProcessingError::from)?;

        let workbook = std::fs::read(&report.path)?;
        let stats = ConversionStats {
            region_count: regions.len(),
            image_count: report.image_count,
            table_count: tables.len(),
            text_count: text.len(),
            meta_count: meta.len(),
            processing_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            "Converted {} in {}ms: {} region(s), {} image(s)",
            filename, stats.processing_time_ms, stats.region_count, stats.image_count
        );

        Ok(ConversionOutput { workbook, stats })
    }
}

/// `Table_N`, `Text` and `Meta` sheets for the extracted summaries.
///
/// `Text` and `Meta` are omitted when they have no records.
#[must_use]
pub fn summary_sheets(
    tables: &[ExtractedTable],
    text: &[TextRecord],
    meta: &[MetaRecord],
) -> Vec<SummarySheet> {
    let labelled = |label: &str, content: &str| vec![label.to_string(), content.to_string()];
    let type_content = || vec!["Type".to_string(), "Content".to_string()];

    let mut sheets: Vec<SummarySheet> = tables
        .iter()
        .map(|table| SummarySheet {
            name: table.title.clone(),
            headers: table.headers.clone(),
            rows: table.rows.clone(),
        })
        .collect();

    if !text.is_empty() {
        sheets.push(SummarySheet {
            name: "Text".to_string(),
            headers: type_content(),
            rows: text.iter().map(|r| labelled(&r.label, &r.content)).collect(),
        });
    }
    if !meta.is_empty() {
        sheets.push(SummarySheet {
            name: "Meta".to_string(),
            headers: type_content(),
            rows: meta.iter().map(|r| labelled(&r.label, &r.content)).collect(),
        });
    }
    sheets
}
