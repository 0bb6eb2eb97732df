//! Small helpers over the scraper node tree

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Tags whose text never counts as document text
const HIDDEN_TAGS: [&str; 2] = ["script", "style"];

/// Tag name of an element node, `None` for every other node kind
pub(crate) fn element_name<'a>(node: &NodeRef<'a, Node>) -> Option<&'a str> {
    match node.value() {
        Node::Element(element) => Some(element.name()),
        _ => None,
    }
}

/// Concatenation of every descendant text fragment, each trimmed.
///
/// Fragments are joined without a separator, so `<b>a</b> <i>b</i>` reads
/// as `ab`.
pub(crate) fn stripped_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Node::Text(text) = descendant.value() {
            out.push_str(text.trim());
        }
    }
    out
}

/// Like [`stripped_text`] but skips text under `script` and `style`.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for descendant in element.descendants() {
        if let Node::Text(text) = descendant.value() {
            let hidden = descendant.ancestors().any(|ancestor| {
                element_name(&ancestor).is_some_and(|name| HIDDEN_TAGS.contains(&name))
            });
            if !hidden {
                out.push_str(text.trim());
            }
        }
    }
    out
}

/// Serialize one node back to markup.
///
/// Elements serialize to their outer HTML and text is escaped. Doctype and
/// processing-instruction nodes produce nothing.
pub(crate) fn serialize_node(node: NodeRef<'_, Node>) -> Option<String> {
    match node.value() {
        Node::Element(_) => ElementRef::wrap(node).map(|element| element.html()),
        Node::Text(text) => Some(escape_text(text)),
        Node::Comment(comment) => Some(format!("<!--{}-->", &**comment)),
        _ => None,
    }
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max` characters of `s`
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
