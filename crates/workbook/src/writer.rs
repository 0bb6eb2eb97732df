//! xlsx emission with rust_xlsxwriter

use html2xlsx_common::LayoutConfig;
use rust_xlsxwriter::{Format, Image, ObjectMovement, Workbook, Worksheet};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

use crate::layout::PlacementPlan;
use crate::Result;

/// Default Excel row height in points
const PADDING_ROW_HEIGHT: f64 = 15.0;

/// Excel's per-cell character limit
pub const MAX_CELL_CHARS: usize = 32_767;

/// `value` cut to at most [`MAX_CELL_CHARS`] characters
fn clamp_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// A plain tabular sheet appended after the image sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarySheet {
    pub name: String,
    /// Written in bold on the first row when non-empty
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 1-based rows that receive padding cells below the last image
#[must_use]
pub fn padding_rows(plan: &PlacementPlan, layout: &LayoutConfig) -> Range<u32> {
    plan.next_row..plan.next_row.saturating_add(layout.padding_rows)
}

fn write_image_sheet(
    worksheet: &mut Worksheet,
    plan: &PlacementPlan,
    sheet_name: &str,
    layout: &LayoutConfig,
) -> Result<()> {
    worksheet.set_name(sheet_name)?;

    for placement in &plan.placements {
        let image = Image::new_from_buffer(&placement.png)?
            .set_object_movement(ObjectMovement::MoveButDontSizeWithCells);
        worksheet.insert_image(placement.row - 1, placement.column, &image)?;
        debug!(
            "Anchored image {} ({}x{}) at row {}",
            placement.sequence, placement.width, placement.height, placement.row
        );
    }

    for row in padding_rows(plan, layout) {
        worksheet.write_string(row - 1, layout.anchor_column, "")?;
        worksheet.set_row_height(row - 1, PADDING_ROW_HEIGHT)?;
    }

    worksheet.set_column_width(layout.anchor_column, layout.column_width)?;
    Ok(())
}

fn write_summary_sheet(worksheet: &mut Worksheet, sheet: &SummarySheet) -> Result<()> {
    worksheet.set_name(&sheet.name)?;
    let bold = Format::new().set_bold();

    let mut row = 0;
    if !sheet.headers.is_empty() {
        for (col, header) in (0u16..).zip(&sheet.headers) {
            worksheet.write_string_with_format(row, col, clamp_cell(header), &bold)?;
        }
        row += 1;
    }
    for values in &sheet.rows {
        for (col, value) in (0u16..).zip(values) {
            worksheet.write_string(row, col, clamp_cell(value))?;
        }
        row += 1;
    }

    worksheet.autofit();
    Ok(())
}

/// Assemble the image sheet followed by any summary sheets.
pub fn build_workbook(
    plan: &PlacementPlan,
    sheet_name: &str,
    layout: &LayoutConfig,
    summaries: &[SummarySheet],
) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let mut image_sheet = Worksheet::new();
    write_image_sheet(&mut image_sheet, plan, sheet_name, layout)?;
    workbook.push_worksheet(image_sheet);

    for summary in summaries {
        let mut worksheet = Worksheet::new();
        write_summary_sheet(&mut worksheet, summary)?;
        workbook.push_worksheet(worksheet);
    }

    info!(
        "Built workbook with {} image(s) and {} summary sheet(s)",
        plan.placements.len(),
        summaries.len()
    );
    Ok(workbook)
}

/// Write the workbook to `path`, replacing any existing file.
pub fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook.save(path)?;
    info!("Excel file saved: {}", path.display());
    Ok(())
}

/// Serialize the workbook to xlsx bytes.
pub fn workbook_to_buffer(workbook: &mut Workbook) -> Result<Vec<u8>> {
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::plan_placements;
    use image::{ImageFormat, RgbaImage};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn media_count(bytes: &[u8]) -> usize {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive
            .file_names()
            .filter(|name| name.starts_with("xl/media/"))
            .count()
    }

    #[test]
    fn test_padding_rows_follow_last_image() {
        let layout = LayoutConfig::default();
        let plan = PlacementPlan {
            placements: Vec::new(),
            next_row: 12,
        };
        assert_eq!(padding_rows(&plan, &layout), 12..17);
    }

    #[test]
    fn test_images_anchored_at_planned_rows() {
        let layout = LayoutConfig::default();
        let plan = plan_placements(vec![(1, png(120, 40)), (2, png(80, 100))], &layout).unwrap();

        let mut workbook = build_workbook(&plan, "HTML Box Images", &layout, &[]).unwrap();
        let bytes = workbook_to_buffer(&mut workbook).unwrap();

        assert_eq!(media_count(&bytes), 2);
        let drawing = read_part(&bytes, "xl/drawings/drawing1.xml");
        assert!(drawing.contains("<xdr:row>0</xdr:row>"));
        assert!(drawing.contains("<xdr:row>4</xdr:row>"));

        let workbook_xml = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook_xml.contains(r#"name="HTML Box Images""#));
    }

    #[test]
    fn test_image_free_workbook() {
        let layout = LayoutConfig::default();
        let mut workbook =
            build_workbook(&PlacementPlan::empty(), "HTML Box Images", &layout, &[]).unwrap();
        let bytes = workbook_to_buffer(&mut workbook).unwrap();

        assert_eq!(media_count(&bytes), 0);
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<sheetData"));
    }

    #[test]
    fn test_summary_sheets_follow_image_sheet() {
        let layout = LayoutConfig::default();
        let summaries = vec![
            SummarySheet {
                name: "Table_1".to_string(),
                headers: vec!["Name".to_string(), "Qty".to_string()],
                rows: vec![vec!["apple".to_string(), "3".to_string()]],
            },
            SummarySheet {
                name: "Text".to_string(),
                headers: vec!["Type".to_string(), "Content".to_string()],
                rows: Vec::new(),
            },
        ];

        let mut workbook =
            build_workbook(&PlacementPlan::empty(), "HTML Box Images", &layout, &summaries)
                .unwrap();
        let bytes = workbook_to_buffer(&mut workbook).unwrap();

        let workbook_xml = read_part(&bytes, "xl/workbook.xml");
        let images = workbook_xml.find(r#"name="HTML Box Images""#).unwrap();
        let table = workbook_xml.find(r#"name="Table_1""#).unwrap();
        let text = workbook_xml.find(r#"name="Text""#).unwrap();
        assert!(images < table && table < text);
    }

    #[test]
    fn test_save_workbook_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("html2image2excel_output.xlsx");
        let layout = LayoutConfig::default();
        let plan = plan_placements(vec![(1, png(10, 10))], &layout).unwrap();

        let mut workbook = build_workbook(&plan, "HTML Box Images", &layout, &[]).unwrap();
        save_workbook(&mut workbook, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(media_count(&bytes), 1);
    }

    #[test]
    fn test_clamp_cell() {
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(clamp_cell(&long).chars().count(), MAX_CELL_CHARS);
        assert_eq!(clamp_cell("short"), "short");
    }

    #[test]
    fn test_oversized_summary_values_are_clamped() {
        let layout = LayoutConfig::default();
        let long = "x".repeat(40_000);
        let summaries = vec![SummarySheet {
            name: "Text".to_string(),
            headers: vec![long.clone(), "Content".to_string()],
            rows: vec![vec!["H1".to_string(), long]],
        }];

        let mut workbook =
            build_workbook(&PlacementPlan::empty(), "HTML Box Images", &layout, &summaries)
                .unwrap();
        assert!(workbook_to_buffer(&mut workbook).is_ok());
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let layout = LayoutConfig::default();
        let result = build_workbook(&PlacementPlan::empty(), "bad[name]", &layout, &[]);
        assert!(result.is_err());
    }
}
