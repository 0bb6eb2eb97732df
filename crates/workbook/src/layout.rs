//! Image placement: pixel heights to anchor rows
//!
//! Rows are 1-based, as in `A1` notation. Each image is anchored at the
//! current row, after which the cursor moves down by
//! `max(1, ceil((height + slack) / row_height)) + spacing` rows, so later
//! images never overlap earlier ones at the default row height.

use html2xlsx_common::LayoutConfig;
use image::ImageReader;
use std::io::Cursor;

use crate::{Result, WorkbookError};

/// An image and where it goes on the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    /// 1-based capture order
    pub sequence: usize,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 1-based anchor row
    pub row: u32,
    /// 0-based anchor column
    pub column: u16,
}

/// All placements of a sheet plus the first row below them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPlan {
    pub placements: Vec<ImagePlacement>,
    /// 1-based row where padding starts
    pub next_row: u32,
}

impl PlacementPlan {
    /// A plan with no images
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            placements: Vec::new(),
            next_row: 1,
        }
    }
}

/// Monotonic row cursor
#[derive(Debug, Clone)]
pub struct RowCursor {
    layout: LayoutConfig,
    current_row: u32,
}

impl RowCursor {
    #[must_use]
    pub const fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            current_row: 1,
        }
    }

    #[must_use]
    pub const fn current_row(&self) -> u32 {
        self.current_row
    }

    /// Rows an image of `height` pixels occupies, spacing excluded
    #[must_use]
    pub fn rows_for_height(&self, height: u32) -> u32 {
        let row_height = self.layout.row_height_px.max(1);
        (height.saturating_add(self.layout.slack_px))
            .div_ceil(row_height)
            .max(1)
    }

    /// Anchor row for an image of `height` pixels; advances the cursor.
    pub fn place(&mut self, height: u32) -> u32 {
        let row = self.current_row;
        self.current_row = self
            .current_row
            .saturating_add(self.rows_for_height(height))
            .saturating_add(self.layout.spacing_rows);
        row
    }
}

/// Native pixel size of an encoded image
pub fn measure_png(sequence: usize, bytes: &[u8]) -> Result<(u32, u32)> {
    let to_error = |message: String| WorkbookError::Image { sequence, message };
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| to_error(e.to_string()))?
        .into_dimensions()
        .map_err(|e| to_error(e.to_string()))
}

/// Measure each `(sequence, png)` and assign it a row, in order.
pub fn plan_placements(
    images: Vec<(usize, Vec<u8>)>,
    layout: &LayoutConfig,
) -> Result<PlacementPlan> {
    let mut cursor = RowCursor::new(*layout);
    let mut placements = Vec::with_capacity(images.len());

    for (sequence, png) in images {
        let (width, height) = measure_png(sequence, &png)?;
        let row = cursor.place(height);
        placements.push(ImagePlacement {
            sequence,
            png,
            width,
            height,
            row,
            column: layout.anchor_column,
        });
    }

    Ok(PlacementPlan {
        placements,
        next_row: cursor.current_row(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_rows_advance_for_40_then_100() {
        let mut cursor = RowCursor::new(LayoutConfig::default());
        assert_eq!(cursor.place(40), 1);
        assert_eq!(cursor.place(100), 5);
        assert_eq!(cursor.current_row(), 12);
    }

    #[test]
    fn test_rows_for_height_rounds_up() {
        let cursor = RowCursor::new(LayoutConfig::default());
        assert_eq!(cursor.rows_for_height(0), 1);
        assert_eq!(cursor.rows_for_height(10), 1);
        assert_eq!(cursor.rows_for_height(11), 2);
        assert_eq!(cursor.rows_for_height(30), 2);
        assert_eq!(cursor.rows_for_height(31), 3);
    }

    #[test]
    fn test_zero_row_height_does_not_divide_by_zero() {
        let cursor = RowCursor::new(LayoutConfig {
            row_height_px: 0,
            ..LayoutConfig::default()
        });
        assert_eq!(cursor.rows_for_height(5), 15);
    }

    #[test]
    fn test_rows_are_strictly_increasing() {
        let mut cursor = RowCursor::new(LayoutConfig::default());
        let rows: Vec<u32> = [0, 1, 500, 3, 20].iter().map(|h| cursor.place(*h)).collect();
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_measure_png() {
        assert_eq!(measure_png(1, &png(7, 3)).unwrap(), (7, 3));
    }

    #[test]
    fn test_measure_garbage_fails() {
        let err = measure_png(2, b"not an image").unwrap_err();
        assert!(matches!(err, WorkbookError::Image { sequence: 2, .. }));
    }

    #[test]
    fn test_plan_placements() {
        let plan = plan_placements(
            vec![(1, png(120, 40)), (2, png(80, 100))],
            &LayoutConfig::default(),
        )
        .unwrap();

        let rows: Vec<u32> = plan.placements.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![1, 5]);
        assert_eq!(plan.next_row, 12);
        assert_eq!((plan.placements[0].width, plan.placements[0].height), (120, 40));
        assert!(plan.placements.iter().all(|p| p.column == 0));
    }

    #[test]
    fn test_empty_plan() {
        let plan = plan_placements(Vec::new(), &LayoutConfig::default()).unwrap();
        assert_eq!(plan, PlacementPlan::empty());
    }
}
