//! Heading-bounded region extraction
//!
//! A region starts at a heading element and runs through its following
//! siblings up to, but not including, the next heading of the same tag (or the
//! end of the sibling list). Only regions whose nodes mention the marker phrase
//! are kept.
//!
//! Each region is scanned by a [`RegionScanner`], a small state machine:
//!
//! ```text
//! Scanning ──marker seen──▶ MarkerFound
//!    │                          │
//!    └──boundary──▶ AtBoundary ◀┘
//! ```
//!
//! The keep/discard decision is read off `AtBoundary { marker_found }` and
//! nowhere else.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dom::{element_name, serialize_node, stripped_text};

/// Where a region scan currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Accumulating nodes; marker not seen yet
    Scanning,
    /// Accumulating nodes; marker seen at least once
    MarkerFound,
    /// The range is closed
    AtBoundary { marker_found: bool },
}

/// Accumulates the markup of one heading-bounded range
#[derive(Debug)]
pub struct RegionScanner<'m> {
    marker: &'m str,
    state: ScanState,
    markup: String,
    node_count: usize,
}

impl<'m> RegionScanner<'m> {
    #[must_use]
    pub const fn new(marker: &'m str) -> Self {
        Self {
            marker,
            state: ScanState::Scanning,
            markup: String::new(),
            node_count: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Take one node of the range: its serialized markup and its text.
    ///
    /// Nodes offered after the boundary are ignored.
    pub fn accept(&mut self, markup: &str, text: &str) {
        match self.state {
            ScanState::AtBoundary { .. } => {
                debug!("Ignoring node offered after region boundary");
                return;
            }
            ScanState::Scanning if text.contains(self.marker) => {
                self.state = ScanState::MarkerFound;
            }
            ScanState::Scanning | ScanState::MarkerFound => {}
        }
        self.markup.push_str(markup);
        self.node_count += 1;
    }

    /// Close the range: the next sibling is a heading or there is none.
    pub fn close(&mut self) {
        if let ScanState::Scanning | ScanState::MarkerFound = self.state {
            self.state = ScanState::AtBoundary {
                marker_found: self.state == ScanState::MarkerFound,
            };
        }
    }

    /// Emit the accumulated range if it is closed and mentioned the marker.
    #[must_use]
    pub fn finish(self, heading: String) -> Option<Region> {
        match self.state {
            ScanState::AtBoundary { marker_found: true } => Some(Region {
                heading,
                markup: self.markup,
                node_count: self.node_count,
            }),
            _ => None,
        }
    }
}

/// A kept heading-bounded range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Text of the opening heading
    pub heading: String,
    /// Concatenated markup of the heading and its siblings
    pub markup: String,
    /// Number of nodes in the range, heading included
    pub node_count: usize,
}

/// What delimits regions and what makes one worth keeping
#[derive(Debug, Clone)]
pub struct RegionOptions {
    pub heading_tag: String,
    pub marker_phrase: String,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            heading_tag: "h4".to_string(),
            marker_phrase: "Uncovered Link".to_string(),
        }
    }
}

impl From<&html2xlsx_common::ConversionConfig> for RegionOptions {
    fn from(config: &html2xlsx_common::ConversionConfig) -> Self {
        Self {
            heading_tag: config.heading_tag.to_ascii_lowercase(),
            marker_phrase: config.marker_phrase.clone(),
        }
    }
}

/// Parse `html` and extract its marker regions.
#[must_use]
pub fn extract_regions_from_str(html: &str, options: &RegionOptions) -> Vec<Region> {
    let document = Html::parse_document(html);
    extract_regions(&document, options)
}

/// Extract, in document order, every heading-bounded region mentioning the
/// marker phrase. Never fails: no headings or no marker gives an empty list.
#[must_use]
pub fn extract_regions(document: &Html, options: &RegionOptions) -> Vec<Region> {
    let selector = match Selector::parse(&options.heading_tag) {
        Ok(selector) => selector,
        Err(e) => {
            warn!("Invalid heading tag {:?}: {}", options.heading_tag, e);
            return Vec::new();
        }
    };

    let mut regions = Vec::new();
    let mut discarded = 0usize;

    for heading in document.select(&selector) {
        let heading_text = stripped_text(*heading);
        let region = scan_region(*heading, options);
        match region.finish(heading_text) {
            Some(region) => regions.push(region),
            None => discarded += 1,
        }
    }

    debug!(
        "Region scan: {} kept, {} discarded (heading <{}>)",
        regions.len(),
        discarded,
        options.heading_tag
    );
    regions
}

/// Walk from `heading` across its following siblings until the next heading.
fn scan_region<'m>(heading: NodeRef<'_, Node>, options: &'m RegionOptions) -> RegionScanner<'m> {
    let mut scanner = RegionScanner::new(&options.marker_phrase);
    let mut current = Some(heading);

    while let Some(node) = current {
        if let Some(markup) = serialize_node(node) {
            scanner.accept(&markup, &stripped_text(node));
        }

        current = node.next_sibling();
        let at_heading = current
            .as_ref()
            .and_then(element_name)
            .is_some_and(|name| name.eq_ignore_ascii_case(&options.heading_tag));
        if current.is_none() || at_heading {
            scanner.close();
            break;
        }
    }

    scanner
}
