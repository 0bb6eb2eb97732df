//! Table extraction from the uploaded document

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dom::stripped_text;

/// One `<table>` flattened into header labels and string rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTable {
    /// `Table_{n}`, 1-based over every table in the document
    pub title: String,
    /// 0-based position among all tables in the document
    pub index: usize,
    /// Header labels; empty when the table has no header row
    pub headers: Vec<String>,
    /// Data rows, padded or truncated to `headers.len()` when headers exist
    pub rows: Vec<Vec<String>>,
}

/// Extract every table that has at least one row.
#[must_use]
pub fn extract_tables(html: &str) -> Vec<ExtractedTable> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("table") else {
        warn!("Table selector failed to parse; skipping table extraction");
        return Vec::new();
    };

    document
        .select(&selector)
        .enumerate()
        .filter_map(|(index, table)| {
            let extracted = extract_table(table, index);
            if extracted.is_none() {
                debug!("Skipping Table_{}: no rows", index + 1);
            }
            extracted
        })
        .collect()
}

fn extract_table(table: ElementRef<'_>, index: usize) -> Option<ExtractedTable> {
    let headers = header_labels(table);

    let mut rows: Vec<Vec<String>> = direct_rows(table)
        .into_iter()
        .map(|row| direct_cells(row).into_iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return None;
    }

    if !headers.is_empty() && rows[0] == headers {
        rows.remove(0);
    }

    if !headers.is_empty() {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
    }

    Some(ExtractedTable {
        title: format!("Table_{}", index + 1),
        index,
        headers,
        rows,
    })
}

/// Labels from `<thead>`, or from a first row containing a `<th>`.
fn header_labels(table: ElementRef<'_>) -> Vec<String> {
    let thead = table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "thead");

    if let Some(thead) = thead {
        return thead
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|row| row.value().name() == "tr")
            .flat_map(direct_cells)
            .map(cell_text)
            .collect();
    }

    let Some(first_row) = direct_rows(table).into_iter().next() else {
        return Vec::new();
    };
    let cells = direct_cells(first_row);
    if cells.iter().any(|cell| cell.value().name() == "th") {
        cells.into_iter().map(cell_text).collect()
    } else {
        Vec::new()
    }
}

/// Rows directly under the table or under its `thead`/`tbody`/`tfoot`.
///
/// Rows of nested tables are not included.
fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(
                    child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|inner| inner.value().name() == "tr"),
                );
            }
            _ => {}
        }
    }

    rows
}

fn direct_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    stripped_text(*cell)
}
