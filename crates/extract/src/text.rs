//! Text outline extraction: title, headings, paragraphs, lists and links

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::warn;

use crate::dom::{truncate_chars, visible_text};

const MAX_PARAGRAPHS: usize = 100;
const MAX_PARAGRAPH_CHARS: usize = 500;
const MAX_LISTS: usize = 20;
const MAX_LIST_ITEMS: usize = 20;
const MAX_LIST_ITEM_CHARS: usize = 200;
const MAX_LINKS: usize = 50;
const MAX_LINK_TEXT_CHARS: usize = 100;
const MAX_LINK_URL_CHARS: usize = 200;

/// A labeled piece of document text, e.g. (`Paragraph_3`, "...")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    pub label: String,
    pub content: String,
}

impl TextRecord {
    fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Text extraction selector {:?} failed to parse: {}", css, e);
            None
        }
    }
}

/// Extract the bounded text outline of a document.
///
/// Text inside `script` and `style` is ignored everywhere.
#[must_use]
pub fn extract_text_content(html: &str) -> Vec<TextRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    if let Some(title_selector) = selector("title") {
        if let Some(title) = document.select(&title_selector).next() {
            records.push(TextRecord::new("Title", visible_text(title)));
        }
    }

    if let Some(heading_selector) = selector("h1, h2, h3, h4, h5, h6") {
        for heading in document.select(&heading_selector) {
            let text = visible_text(heading);
            if !text.is_empty() {
                records.push(TextRecord::new(
                    heading.value().name().to_uppercase(),
                    text,
                ));
            }
        }
    }

    if let Some(p_selector) = selector("p") {
        for (i, paragraph) in document.select(&p_selector).take(MAX_PARAGRAPHS).enumerate() {
            let text = visible_text(paragraph);
            if !text.is_empty() {
                records.push(TextRecord::new(
                    format!("Paragraph_{}", i + 1),
                    truncate_chars(&text, MAX_PARAGRAPH_CHARS),
                ));
            }
        }
    }

    if let (Some(list_selector), Some(li_selector)) = (selector("ul, ol"), selector("li")) {
        for (i, list) in document.select(&list_selector).take(MAX_LISTS).enumerate() {
            records.extend(list_records(list, i, &li_selector));
        }
    }

    if let Some(link_selector) = selector("a[href]") {
        for (i, link) in document.select(&link_selector).take(MAX_LINKS).enumerate() {
            let text = visible_text(link);
            let href = link.value().attr("href").unwrap_or_default();
            if !text.is_empty() && !href.is_empty() {
                records.push(TextRecord::new(
                    format!("Link_{}_Text", i + 1),
                    truncate_chars(&text, MAX_LINK_TEXT_CHARS),
                ));
                records.push(TextRecord::new(
                    format!("Link_{}_URL", i + 1),
                    truncate_chars(href, MAX_LINK_URL_CHARS),
                ));
            }
        }
    }

    records
}

fn list_records(list: ElementRef<'_>, list_index: usize, li_selector: &Selector) -> Vec<TextRecord> {
    let kind = if list.value().name() == "ol" {
        "Ordered List"
    } else {
        "Unordered List"
    };

    list.select(li_selector)
        .take(MAX_LIST_ITEMS)
        .enumerate()
        .filter_map(|(j, item)| {
            let text = visible_text(item);
            (!text.is_empty()).then(|| {
                TextRecord::new(
                    format!("{kind}_{}_Item_{}", list_index + 1, j + 1),
                    truncate_chars(&text, MAX_LIST_ITEM_CHARS),
                )
            })
        })
        .collect()
}
