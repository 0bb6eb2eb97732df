//! HTML extraction for the html2xlsx pipeline
//!
//! - [`regions`]: heading-bounded regions that mention a marker phrase
//! - [`rebuild`]: standalone HTML document built from the kept regions
//! - [`tables`], [`text`], [`meta`]: bounded summaries of the uploaded document
//! - [`decode`]: upload bytes to text

pub mod decode;
mod dom;
pub mod meta;
pub mod rebuild;
pub mod regions;
pub mod tables;
pub mod text;

pub use decode::decode_upload;
pub use meta::{extract_meta_information, MetaRecord};
pub use rebuild::{render_document, write_document, ContainerStatus};
pub use regions::{extract_regions, extract_regions_from_str, Region, RegionOptions, RegionScanner, ScanState};
pub use tables::{extract_tables, ExtractedTable};
pub use text::{extract_text_content, TextRecord};
