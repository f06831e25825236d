use crate::{DocId, Document, Index};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound, in characters, of a result snippet.
pub const DEFAULT_SNIPPET_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.url, self.snippet)
    }
}

/// Preview of `doc`: its heading when it has one, otherwise the start of its
/// normalized text.
pub fn snippet(doc: &Document, max_chars: usize) -> String {
    let source = doc
        .heading
        .as_deref()
        .filter(|heading| !heading.trim().is_empty())
        .unwrap_or(&doc.normalized_text);
    truncate_chars(source, max_chars).to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// One hit per distinct id, in ascending id order.
pub fn assemble(doc_ids: &[DocId], index: &Index, snippet_chars: usize) -> Vec<SearchHit> {
    let mut ids = doc_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
        .filter_map(|id| index.document(id))
        .map(|doc| SearchHit {
            doc_id: doc.id,
            title: doc.title.clone(),
            url: doc.url.clone(),
            snippet: snippet(doc, snippet_chars),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;
    use crate::DocumentRecord;

    fn doc(heading: Option<&str>, text: &str) -> Document {
        Document {
            id: 1,
            title: String::new(),
            url: "u".into(),
            normalized_text: text.into(),
            heading: heading.map(str::to_string),
        }
    }

    #[test]
    fn prefers_heading() {
        assert_eq!(snippet(&doc(Some("Grado en Medicina"), "body text"), 150), "Grado en Medicina");
        assert_eq!(snippet(&doc(Some("  "), "body text"), 150), "body text");
        assert_eq!(snippet(&doc(None, "body text"), 150), "body text");
    }

    #[test]
    fn bounds_length_on_char_boundaries() {
        let long = "ñ".repeat(400);
        let s = snippet(&doc(None, &long), DEFAULT_SNIPPET_CHARS);
        assert_eq!(s.chars().count(), DEFAULT_SNIPPET_CHARS);
        assert_eq!(snippet(&doc(None, "short"), 3), "sho");
    }

    #[test]
    fn assemble_orders_and_dedups() {
        let index = IndexBuilder::default().build([
            DocumentRecord::new("https://one", None, "first"),
            DocumentRecord::new("https://two", None, "second"),
            DocumentRecord::new("https://three", None, "third"),
        ]);
        let hits = assemble(&[3, 1, 3, 99], &index, DEFAULT_SNIPPET_CHARS);
        let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one", "https://three"]);
        assert_eq!(hits[0].to_string(), "https://one -> first");
    }
}
