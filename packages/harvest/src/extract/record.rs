//! Per-entity record extraction.
//!
//! Composes the field resolver and the structured-content extractors into
//! one complete raw record per detail page. Every field runs its
//! configured fallback chain; nothing here ever fails an item — the worst
//! outcome for any field is its sentinel or `None`.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use url::Url;

use crate::accessor::resolve_url;
use crate::config::SourceConfig;
use crate::dom::{self, Document};
use crate::types::{ListingEntry, RawContact, RawDocument, RawOpportunity};

/// Sentinel for fields the extractor guarantees non-null but could not
/// resolve.
pub const UNKNOWN: &str = "Unknown";

/// Deterministic raw-record id from the external id (or URL fallback)
/// plus the detail URL.
pub fn raw_record_id(external_id: Option<&str>, detail_url: &str) -> String {
    let base = external_id
        .map(str::to_string)
        .or_else(|| numeric_path_suffix(detail_url))
        .unwrap_or_else(|| detail_url.to_string());

    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update(b"|");
    hasher.update(detail_url.as_bytes());
    hex::encode(hasher.finalize())[..32].to_string()
}

/// Last purely-numeric path segment of a URL, the id-of-last-resort on
/// portals that only encode identity in the address.
fn numeric_path_suffix(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        .last()
        .map(str::to_string)
}

/// Extracts complete raw records from detail-page snapshots.
pub struct RecordExtractor {
    config: SourceConfig,
}

impl RecordExtractor {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Assemble a raw opportunity from a detail-page snapshot.
    ///
    /// Guarantees: `id` and `detail_url` always set; `title`,
    /// `description`, and `status` always non-null, defaulting to the
    /// `"Unknown"` sentinel.
    pub fn extract_opportunity(&self, doc: &Document, entry: &ListingEntry) -> RawOpportunity {
        let plans = &self.config.fields;

        let external_id = plans
            .external_id
            .resolve(doc)
            .or_else(|| entry.external_id.clone());

        let mut opp = RawOpportunity::new(
            raw_record_id(external_id.as_deref(), &entry.detail_link),
            entry.detail_link.clone(),
        );
        opp.external_id = external_id;

        opp.title = plans
            .title
            .resolve(doc)
            .or_else(|| entry.title.clone())
            .or_else(|| Some(UNKNOWN.to_string()));
        opp.description = plans
            .description
            .resolve(doc)
            .or_else(|| Some(UNKNOWN.to_string()));
        opp.status = plans
            .status
            .resolve(doc)
            .or_else(|| Some(UNKNOWN.to_string()));

        opp.note = plans.note.resolve(doc);
        opp.open_date = plans.open_date.resolve(doc).or_else(|| entry.listed_date.clone());
        opp.close_date = plans.close_date.resolve(doc);
        opp.created_at = plans.created_at.resolve(doc);
        opp.entity_name = plans.entity_name.resolve(doc);
        opp.entity_code = plans.entity_code.resolve(doc);
        opp.awarded_to = plans.awarded_to.resolve(doc);
        opp.award_amount = plans.award_amount.resolve(doc);

        let contact = self.extract_contact(doc);
        opp.contact_name = contact.name;
        opp.contact_email = contact.email;
        opp.contact_phone = contact.phone;

        if let Some(selector) = &self.config.categories_selector {
            opp.categories = doc.all_texts(selector);
        }
        if let Some(selector) = &self.config.taxonomy_selector {
            opp.taxonomy_codes = doc.all_texts(selector);
        }

        opp
    }

    /// Extract the contact block.
    pub fn extract_contact(&self, doc: &Document) -> RawContact {
        let plans = &self.config.fields;
        RawContact {
            name: plans.contact_name.resolve(doc),
            email: plans.contact_email.resolve(doc).map(strip_mailto),
            phone: plans.contact_phone.resolve(doc),
        }
    }

    /// Extract the attachment list, owned by `parent_id`.
    pub fn extract_documents(&self, doc: &Document, parent_id: &str, base_url: &str) -> Vec<RawDocument> {
        let selectors = &self.config.documents;
        let mut documents = Vec::new();

        for row in doc.select_all(&selectors.row) {
            let Some(link) = dom::first_within(row, &selectors.link) else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(download_url) = resolve_url(base_url, href) else {
                continue;
            };

            let file_name = {
                let text = dom::element_text(link);
                if text.is_empty() {
                    url_file_name(&download_url).unwrap_or_else(|| UNKNOWN.to_string())
                } else {
                    text
                }
            };

            documents.push(RawDocument {
                id: document_id(&download_url, parent_id),
                file_name,
                download_url,
                file_size_bytes: None,
                parent_id: parent_id.to_string(),
            });
        }

        documents
    }

    /// Backfill description/note from harvested tab content.
    pub fn fill_from_tabs(&self, opp: &mut RawOpportunity, tabs: &IndexMap<String, String>) {
        if opp.description.as_deref() == Some(UNKNOWN) {
            if let Some(content) = match_tab(tabs, &self.config.description_tabs) {
                opp.description = Some(content);
            }
        }
        if opp.note.is_none() {
            opp.note = match_tab(tabs, &self.config.note_tabs);
        }
    }
}

/// First tab whose name contains any of the wanted substrings.
fn match_tab(tabs: &IndexMap<String, String>, wanted: &[String]) -> Option<String> {
    for want in wanted {
        let needle = want.to_lowercase();
        for (name, content) in tabs {
            if name.to_lowercase().contains(&needle) && !content.trim().is_empty() {
                return Some(content.clone());
            }
        }
    }
    None
}

fn document_id(download_url: &str, parent_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(download_url.as_bytes());
    hasher.update(b"|");
    hasher.update(parent_id.as_bytes());
    hex::encode(hasher.finalize())[..32].to_string()
}

fn strip_mailto(value: String) -> String {
    match value.strip_prefix("mailto:") {
        Some(rest) => rest.split('?').next().unwrap_or(rest).trim().to_string(),
        None => value,
    }
}

fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|seg| !seg.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    fn entry(detail_link: &str) -> ListingEntry {
        ListingEntry {
            external_id: None,
            title: None,
            detail_link: detail_link.to_string(),
            listed_date: None,
            page_number: 1,
            ordinal: 0,
        }
    }

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(SourceConfig::new("okbids", "https://x.test/list?page={page}"))
    }

    const DETAIL_PAGE: &str = r#"
        <html><body>
            <h1>Roof Repair</h1>
            <table>
                <tr><th>Event ID</th><td>164192</td></tr>
                <tr><th>Status</th><td>Open</td></tr>
                <tr><th>Entity</th><td>Cherokee Nation</td></tr>
                <tr><th>Open Date</th><td>01/02/2024</td></tr>
                <tr><th>Close Date</th><td>January 9, 2024</td></tr>
            </table>
            <div class="description">Re-roof the tribal complex annex.</div>
            <p>Buyer Email: <a href="mailto:JANE@X.COM?subject=bid">JANE@X.COM</a></p>
            <ul class="attachments">
                <li><a href="/files/plans.pdf">Site Plans</a></li>
                <li><a href="https://files.x.test/specs.docx">Specifications</a></li>
                <li><span>no link here</span></li>
            </ul>
        </body></html>
    "#;

    #[test]
    fn test_complete_extraction() {
        let doc = Document::parse(DETAIL_PAGE);
        let opp = extractor().extract_opportunity(&doc, &entry("https://x.test/opp/164192"));

        assert_eq!(opp.external_id.as_deref(), Some("164192"));
        assert_eq!(opp.title.as_deref(), Some("Roof Repair"));
        assert_eq!(opp.status.as_deref(), Some("Open"));
        assert_eq!(opp.entity_name.as_deref(), Some("Cherokee Nation"));
        assert_eq!(opp.open_date.as_deref(), Some("01/02/2024"));
        assert_eq!(opp.close_date.as_deref(), Some("January 9, 2024"));
        assert_eq!(
            opp.description.as_deref(),
            Some("Re-roof the tribal complex annex.")
        );
        assert_eq!(opp.contact_email.as_deref(), Some("JANE@X.COM"));
    }

    #[test]
    fn test_sentinels_on_empty_page() {
        let doc = Document::parse("<html><body></body></html>");
        let opp = extractor().extract_opportunity(&doc, &entry("https://x.test/opp/9"));

        assert_eq!(opp.title.as_deref(), Some(UNKNOWN));
        assert_eq!(opp.description.as_deref(), Some(UNKNOWN));
        assert_eq!(opp.status.as_deref(), Some(UNKNOWN));
        assert!(!opp.id.is_empty());
        assert_eq!(opp.detail_url, "https://x.test/opp/9");
    }

    #[test]
    fn test_raw_id_deterministic() {
        let a = raw_record_id(Some("164192"), "https://x.test/opp/164192");
        let b = raw_record_id(Some("164192"), "https://x.test/opp/164192");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let c = raw_record_id(Some("164193"), "https://x.test/opp/164193");
        assert_ne!(a, c);
    }

    #[test]
    fn test_raw_id_url_fallback() {
        // No external id on the page: the numeric path suffix stands in
        let with_suffix = raw_record_id(None, "https://x.test/opportunities/164192");
        let again = raw_record_id(None, "https://x.test/opportunities/164192");
        assert_eq!(with_suffix, again);

        // No numeric segment either: the URL itself is the base
        let url_only = raw_record_id(None, "https://x.test/opportunities/roof-repair");
        assert_eq!(url_only.len(), 32);
    }

    #[test]
    fn test_numeric_path_suffix() {
        assert_eq!(
            numeric_path_suffix("https://x.test/opp/164192"),
            Some("164192".to_string())
        );
        assert_eq!(
            numeric_path_suffix("https://x.test/opp/164192/details"),
            Some("164192".to_string())
        );
        assert_eq!(numeric_path_suffix("https://x.test/opp/roof"), None);
    }

    #[test]
    fn test_document_extraction() {
        let doc = Document::parse(DETAIL_PAGE);
        let docs = extractor().extract_documents(&doc, "parent123", "https://x.test/opp/164192");

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].file_name, "Site Plans");
        assert_eq!(docs[0].download_url, "https://x.test/files/plans.pdf");
        assert_eq!(docs[0].parent_id, "parent123");
        assert_eq!(docs[1].download_url, "https://files.x.test/specs.docx");
        assert!(docs[0].file_size_bytes.is_none());
    }

    #[test]
    fn test_tab_backfill() {
        let doc = Document::parse("<html><body></body></html>");
        let ex = extractor();
        let mut opp = ex.extract_opportunity(&doc, &entry("https://x.test/opp/9"));

        let mut tabs = IndexMap::new();
        tabs.insert("Overview".to_string(), "From the overview tab.".to_string());
        tabs.insert("Special Instructions".to_string(), "Submit by mail.".to_string());

        ex.fill_from_tabs(&mut opp, &tabs);
        assert_eq!(opp.description.as_deref(), Some("From the overview tab."));
        assert_eq!(opp.note.as_deref(), Some("Submit by mail."));
    }

    #[test]
    fn test_mailto_stripping() {
        assert_eq!(
            strip_mailto("mailto:JANE@X.COM?subject=bid".to_string()),
            "JANE@X.COM"
        );
        assert_eq!(strip_mailto("jane@x.com".to_string()), "jane@x.com");
    }
}
