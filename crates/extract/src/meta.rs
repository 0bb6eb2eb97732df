//! `<meta>` tag extraction

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::warn;

use crate::dom::truncate_chars;

const MAX_META_TAGS: usize = 20;
const MAX_CONTENT_CHARS: usize = 500;

/// A `<meta>` tag as (`Meta_{name}` | `Property_{property}`, content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaRecord {
    pub label: String,
    pub content: String,
}

/// Extract named and property meta tags, at most 20.
///
/// Tags carrying neither a `name` nor a `property` (e.g. `charset`) are
/// skipped and do not count toward the limit.
#[must_use]
pub fn extract_meta_information(html: &str) -> Vec<MetaRecord> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("meta") else {
        warn!("Meta selector failed to parse; skipping meta extraction");
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|meta| {
            let element = meta.value();
            let content = truncate_chars(element.attr("content").unwrap_or_default(), MAX_CONTENT_CHARS);
            if let Some(name) = element.attr("name").filter(|n| !n.is_empty()) {
                Some(MetaRecord {
                    label: format!("Meta_{name}"),
                    content,
                })
            } else {
                element
                    .attr("property")
                    .filter(|p| !p.is_empty())
                    .map(|property| MetaRecord {
                        label: format!("Property_{property}"),
                        content,
                    })
            }
        })
        .take(MAX_META_TAGS)
        .collect()
}
