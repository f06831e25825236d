//! Text normalization: markup stripping, case and accent folding, punctuation removal.
//!
//! Raw corpus text may be an HTML page or text already extracted from a document;
//! both go through the same pipeline. Markup is only parsed when the input looks
//! like it contains tags, so plain text with a stray `<` is left intact.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Node, Selector};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<(?:[A-Za-z][A-Za-z0-9-]*|/[A-Za-z][A-Za-z0-9-]*|!)[^>]*>").expect("valid regex");
    static ref PUNCTUATION: Regex = Regex::new(r"[\p{P}\p{S}]").expect("valid regex");
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref HEADING: Selector = Selector::parse("h1, h2, h3").expect("valid selector");
}

/// Elements whose text content is not meant to be read.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Human-readable content pulled out of a raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Text nodes joined by single spaces, original casing.
    pub text: String,
    /// Contents of the `<title>` element, if any.
    pub title: Option<String>,
    /// First `h1`/`h2`/`h3` heading, if any.
    pub heading: Option<String>,
}

/// Full pipeline: extract readable text, then fold and clean it.
pub fn normalize(raw: &str) -> String {
    clean(&extract(raw).text)
}

/// Strip markup, keeping text content separated by a single space.
///
/// Malformed markup never fails; the HTML parser recovers and whatever text it
/// finds is returned.
pub fn extract(raw: &str) -> Extracted {
    if !TAG.is_match(raw) {
        return Extracted { text: decode_entities(raw), ..Extracted::default() };
    }

    let html = Html::parse_document(raw);
    let mut parts: Vec<&str> = Vec::new();
    for node in html.tree.root().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        let text = text.trim();
        if !hidden && !text.is_empty() {
            parts.push(text);
        }
    }

    let first_text = |selector: &Selector| {
        html.select(selector)
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .find(|s| !s.is_empty())
    };

    Extracted {
        text: parts.join(" "),
        title: first_text(&*TITLE),
        heading: first_text(&*HEADING),
    }
}

/// Resolve character references (`&amp;`, `&#241;`) in text that carries no
/// markup, leaving any literal `<` untouched.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let escaped = raw.replace('<', "&lt;");
    Html::parse_fragment(&escaped).root_element().text().collect()
}

/// Lower-case, fold diacritics, drop punctuation, collapse whitespace and trim.
pub fn clean(text: &str) -> String {
    let folded = fold(text);
    let stripped = PUNCTUATION.replace_all(&folded, "");
    collapse_whitespace(&stripped)
}

/// Lower-case and fold accented letters to their ASCII base form.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().nfd() {
        if is_combining_mark(c) {
            continue;
        }
        // letters with no canonical decomposition
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'þ' => out.push_str("th"),
            'ø' => out.push('o'),
            'đ' | 'ð' => out.push('d'),
            'ł' => out.push('l'),
            'ı' => out.push('i'),
            _ => out.push(c),
        }
    }
    out
}

/// Collapse runs of whitespace (including newlines, tabs and carriage returns).
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
