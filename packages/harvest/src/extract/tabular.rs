//! Header-inference and row decoding for table-like content.
//!
//! Tables on listing and detail pages rarely come labeled the same way
//! twice. Headers are inferred from `<th>` cells when present, from the
//! first data row otherwise, and blank header cells get positional
//! `column_N` names. The same header normalization (lower-case,
//! whitespace to underscore) is shared with label matching so table and
//! label lookups speak one vocabulary.

use indexmap::IndexMap;
use scraper::ElementRef;

use crate::dom::{self, Document};

/// A table decoded into records keyed by inferred header.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub headers: Vec<String>,
    pub rows: Vec<IndexMap<String, String>>,
}

/// Normalize a header or label for matching: collapse whitespace,
/// lower-case, spaces to underscores.
pub fn normalize_header(raw: &str) -> String {
    dom::collapse_ws(raw).to_lowercase().replace(' ', "_")
}

/// Positional name for a blank or unlabeled column (1-based).
fn column_name(index: usize) -> String {
    format!("column_{}", index + 1)
}

/// Decode every `<table>` in the document.
pub fn decode_tables(doc: &Document) -> Vec<DecodedTable> {
    decode_tables_in(doc.root())
}

/// Decode every `<table>` under a scope element.
pub fn decode_tables_in(scope: ElementRef<'_>) -> Vec<DecodedTable> {
    dom::select_within(scope, "table")
        .into_iter()
        .filter_map(decode_table)
        .collect()
}

/// Decode one table element. `None` when it has no rows at all.
pub fn decode_table(table: ElementRef<'_>) -> Option<DecodedTable> {
    let rows: Vec<ElementRef<'_>> = dom::select_within(table, "tr");
    if rows.is_empty() {
        return None;
    }

    let mut headers: Vec<String> = Vec::new();
    let mut data_start = 0;

    // Prefer explicit header cells
    let header_cells = dom::select_within(rows[0], "th");
    if !header_cells.is_empty() {
        headers = header_texts(&header_cells);
        data_start = 1;
    } else {
        // No <th> anywhere: first data row becomes the header vocabulary
        let first_cells = dom::select_within(rows[0], "td");
        if !first_cells.is_empty() {
            headers = header_texts(&first_cells);
            data_start = 1;
        }
    }

    let mut decoded_rows = Vec::new();
    for row in rows.into_iter().skip(data_start) {
        let cells = dom::select_within(row, "td, th");
        if cells.is_empty() {
            continue;
        }

        let mut record: IndexMap<String, String> = IndexMap::new();
        let mut all_empty = true;
        for (i, cell) in cells.iter().enumerate() {
            let value = dom::element_text(*cell);
            if !value.is_empty() {
                all_empty = false;
            }
            let key = headers.get(i).cloned().unwrap_or_else(|| column_name(i));
            record.insert(key, value);
        }

        // A row is discarded only if every cell is empty
        if !all_empty {
            decoded_rows.push(record);
        }
    }

    Some(DecodedTable {
        headers,
        rows: decoded_rows,
    })
}

fn header_texts(cells: &[ElementRef<'_>]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let text = dom::element_text(*cell);
            if text.is_empty() {
                column_name(i)
            } else {
                normalize_header(&text)
            }
        })
        .collect()
}

/// Look a value up by header across all decoded tables.
///
/// Keys are tried in order; a key matches a header by case-insensitive
/// substring (both sides normalized). Returns the first non-empty cell in
/// the matching column.
pub fn lookup(doc: &Document, keys: &[&str]) -> Option<String> {
    let tables = decode_tables(doc);
    for key in keys {
        let needle = normalize_header(key);
        if needle.is_empty() {
            continue;
        }
        for table in &tables {
            for row in &table.rows {
                for (header, value) in row {
                    if header.contains(&needle) && !value.trim().is_empty() {
                        return Some(value.trim().to_string());
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Open  Date"), "open_date");
        assert_eq!(normalize_header("  Buyer Email "), "buyer_email");
        assert_eq!(normalize_header("STATUS"), "status");
    }

    #[test]
    fn test_decode_with_explicit_headers() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>Title</th><th>Close Date</th></tr>
                <tr><td>Roof Repair</td><td>2024-01-05</td></tr>
                <tr><td>Paving</td><td>2024-01-06</td></tr>
            </table>"#,
        );
        let tables = decode_tables(&doc);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.headers, vec!["title", "close_date"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["title"], "Roof Repair");
        assert_eq!(table.rows[1]["close_date"], "2024-01-06");
    }

    #[test]
    fn test_headers_inferred_from_first_row() {
        let doc = Document::parse(
            r#"<table>
                <tr><td>Title</td><td>Status</td></tr>
                <tr><td>Roof Repair</td><td>Open</td></tr>
            </table>"#,
        );
        let tables = decode_tables(&doc);
        let table = &tables[0];
        assert_eq!(table.headers, vec!["title", "status"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["status"], "Open");
    }

    #[test]
    fn test_blank_headers_get_positional_names() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>Name</th><th></th></tr>
                <tr><td>Roof Repair</td><td>Open</td></tr>
            </table>"#,
        );
        let tables = decode_tables(&doc);
        let table = &tables[0];
        assert_eq!(table.headers, vec!["name", "column_2"]);
        assert_eq!(table.rows[0]["column_2"], "Open");
    }

    #[test]
    fn test_all_empty_row_discarded() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>A</th><th>B</th></tr>
                <tr><td></td><td>  </td></tr>
                <tr><td>x</td><td></td></tr>
            </table>"#,
        );
        let tables = decode_tables(&doc);
        let table = &tables[0];
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["a"], "x");
    }

    #[test]
    fn test_extra_cells_keyed_positionally() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>A</th></tr>
                <tr><td>x</td><td>y</td></tr>
            </table>"#,
        );
        let tables = decode_tables(&doc);
        let table = &tables[0];
        assert_eq!(table.rows[0]["a"], "x");
        assert_eq!(table.rows[0]["column_2"], "y");
    }

    #[test]
    fn test_lookup_by_substring_key() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>Posting Date</th><th>Status</th></tr>
                <tr><td>2024-01-05</td><td>Open</td></tr>
            </table>"#,
        );
        assert_eq!(lookup(&doc, &["posting"]), Some("2024-01-05".to_string()));
        assert_eq!(lookup(&doc, &["status"]), Some("Open".to_string()));
        assert_eq!(lookup(&doc, &["award"]), None);
    }

    #[test]
    fn test_lookup_key_order_wins() {
        let doc = Document::parse(
            r#"<table>
                <tr><th>Open Date</th><th>Close Date</th></tr>
                <tr><td>2024-01-01</td><td>2024-01-07</td></tr>
            </table>"#,
        );
        assert_eq!(
            lookup(&doc, &["close_date", "open_date"]),
            Some("2024-01-07".to_string())
        );
    }

    #[test]
    fn test_empty_table_is_none() {
        let doc = Document::parse(r#"<table></table>"#);
        assert!(decode_tables(&doc).is_empty());
    }
}
