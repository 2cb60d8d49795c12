//! Label→adjacent-value lookup across table, definition-list, and
//! free-text layouts.
//!
//! Given candidate labels like `["Open Date", "Posting Date", "Start
//! Date"]`, finds the value a document associates with that label. Two
//! strategies run in order: a structured decode of label/value pairs from
//! tables and definition lists, then a free-text scan. Within each
//! strategy, earlier labels in the candidate list are preferred.
//!
//! The extractor never returns an empty string and never echoes the label
//! itself back as the value — both degrade to the next strategy or label.

use scraper::ElementRef;

use crate::dom::{self, Document};
use crate::extract::tabular::normalize_header;

/// Resolve the value associated with one of `labels`, or `None`.
pub fn labeled_value(doc: &Document, labels: &[&str]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }

    let pairs = structured_pairs(doc);
    for label in labels {
        if let Some(value) = lookup_pairs(&pairs, label) {
            return Some(value);
        }
    }

    for label in labels {
        if let Some(value) = free_text_scan(doc, label) {
            return Some(value);
        }
    }

    None
}

/// Label/value pairs from `<tr>` rows with at least two cells and from
/// `<dt>`/`<dd>` definition lists.
fn structured_pairs(doc: &Document) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for row in doc.select_all("tr") {
        let cells = dom::select_within(row, "th, td");
        if cells.len() < 2 {
            continue;
        }
        // An all-<th> row is a column header row, not a label/value row
        if dom::select_within(row, "th").len() == cells.len() {
            continue;
        }
        let label = dom::element_text(cells[0]);
        let value = dom::element_text(cells[1]);
        if !label.is_empty() {
            pairs.push((label, value));
        }
    }

    for dt in doc.select_all("dt") {
        if let Some(dd) = dom::next_sibling_element(dt) {
            if dd.value().name() == "dd" {
                let label = dom::element_text(dt);
                let value = dom::element_text(dd);
                if !label.is_empty() {
                    pairs.push((label, value));
                }
            }
        }
    }

    pairs
}

/// Match a label against decoded pairs, case-insensitive substring on the
/// normalized forms.
fn lookup_pairs(pairs: &[(String, String)], label: &str) -> Option<String> {
    let needle = normalize_header(label);
    if needle.is_empty() {
        return None;
    }

    pairs.iter().find_map(|(pair_label, value)| {
        if normalize_header(pair_label).contains(&needle) {
            accept_value(value, label)
        } else {
            None
        }
    })
}

/// Free-text strategy: find an element whose direct text contains the
/// label, then try its trailing text, its next sibling, and its parent's
/// text minus the label, in that order.
fn free_text_scan(doc: &Document, label: &str) -> Option<String> {
    for el in descendant_elements(doc.root()) {
        let own = own_text(el);
        let Some((_, end)) = find_ci(&own, label) else {
            continue;
        };

        // Trailing text after the label within the same element
        if let Some(value) = accept_value(&own[end..], label) {
            return Some(value);
        }

        // Adjacent sibling
        if let Some(sibling) = dom::next_sibling_element(el) {
            if let Some(value) = accept_value(&dom::element_text(sibling), label) {
                return Some(value);
            }
        }

        // Parent's text minus the label
        if let Some(parent) = dom::parent_element(el) {
            let parent_text = dom::element_text(parent);
            if let Some((start, end)) = find_ci(&parent_text, label) {
                let remainder = format!("{} {}", &parent_text[..start], &parent_text[end..]);
                if let Some(value) = accept_value(&remainder, label) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Strip separators, reject empties and label echoes.
fn accept_value(candidate: &str, label: &str) -> Option<String> {
    let cleaned = dom::collapse_ws(candidate.trim_matches(|c: char| {
        c.is_whitespace() || c == ':' || c == '-' || c == '–'
    }));
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.eq_ignore_ascii_case(label.trim()) {
        return None;
    }
    Some(cleaned)
}

/// Case-insensitive substring search; byte offsets of the match.
///
/// Labels are ASCII, so ASCII case folding on byte windows is exact and
/// the returned offsets always land on char boundaries.
fn find_ci(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle = needle.trim();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    (0..=h.len() - n.len())
        .find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
        .map(|i| (i, i + n.len()))
}

/// Concatenated text of an element's direct text-node children only.
fn own_text(el: ElementRef<'_>) -> String {
    let raw: String = el
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    dom::collapse_ws(&raw)
}

fn descendant_elements<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants().filter_map(ElementRef::wrap)
}
