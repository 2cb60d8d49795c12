//! Parsed-document snapshot with fail-soft query helpers.
//!
//! A [`Document`] wraps one parsed HTML snapshot from a document accessor.
//! Every query degrades to `None` or an empty list — a selector that fails
//! to parse, or matches nothing, must never abort extraction of the rest of
//! the record.
//!
//! Snapshots are synchronous and short-lived: callers fetch page content
//! through the accessor, parse it, extract, and drop the snapshot before
//! the next await.

use scraper::{ElementRef, Html, Selector};

/// One parsed document snapshot.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse an HTML string into a snapshot.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Compile a selector, swallowing parse failures.
    fn selector(selector: &str) -> Option<Selector> {
        Selector::parse(selector).ok()
    }

    /// Root element of the document.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// First element matching `selector`, if the selector parses and hits.
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let sel = Self::selector(selector)?;
        self.html.select(&sel).next()
    }

    /// All elements matching `selector`; empty on a bad selector.
    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Self::selector(selector) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    /// Collapsed text of the first match, `None` when empty.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.select_first(selector)
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    /// Collapsed non-empty texts of all matches.
    pub fn all_texts(&self, selector: &str) -> Vec<String> {
        self.select_all(selector)
            .into_iter()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Attribute value of the first match, `None` when absent or blank.
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.select_first(selector)
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// All elements matching `selector` within a scope element.
pub fn select_within<'a>(scope: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => scope.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// First element matching `selector` within a scope element.
pub fn first_within<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    scope.select(&sel).next()
}

/// Collapsed, trimmed text content of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

/// Next sibling that is itself an element.
pub fn next_sibling_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Parent element, when one exists.
pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
