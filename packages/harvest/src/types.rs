//! Raw data model for the collection stage.
//!
//! Everything here is *unnormalized*: field values are kept exactly as they
//! appeared in the source document (dates as raw strings, money as raw
//! strings). Normalization happens in a separate, later pass over persisted
//! batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collect::session::DateWindow;

/// One row of a paginated listing page.
///
/// Ephemeral: produced by the collection controller and consumed immediately
/// by the record extractor. Never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Source-native identifier, when the listing row exposes one
    pub external_id: Option<String>,

    /// Row title as rendered
    pub title: Option<String>,

    /// Absolute URL of the detail page
    pub detail_link: String,

    /// Raw posted/listed date string, format unknown
    pub listed_date: Option<String>,

    /// 1-based listing page this row came from
    pub page_number: u32,

    /// 0-based position within the page
    pub ordinal: usize,
}

/// An unnormalized opportunity record captured from one detail page.
///
/// Every optional field may be absent, but the record always carries an `id`
/// and a `detail_url`. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOpportunity {
    /// Deterministic raw-record id, derived from the external id (or a
    /// URL-based fallback) plus the detail URL
    pub id: String,

    /// Source-native identifier when one was found on the page
    pub external_id: Option<String>,

    /// The detail page this record was extracted from
    pub detail_url: String,

    pub title: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,

    /// Raw date strings, source-dependent format
    pub open_date: Option<String>,
    pub close_date: Option<String>,
    pub created_at: Option<String>,

    /// Classification codes as found
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub taxonomy_codes: Vec<String>,

    /// Issuing entity / agency, as found
    pub entity_name: Option<String>,
    pub entity_code: Option<String>,

    /// Contact block, as found
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    /// Award fields, as found
    pub awarded_to: Option<String>,
    pub award_amount: Option<String>,

    /// Status string; the record extractor defaults this to `"Unknown"`
    /// when no strategy resolves it
    pub status: Option<String>,
}

impl RawOpportunity {
    /// Create a record carrying only the invariant fields.
    pub fn new(id: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external_id: None,
            detail_url: detail_url.into(),
            title: None,
            description: None,
            note: None,
            open_date: None,
            close_date: None,
            created_at: None,
            categories: Vec::new(),
            taxonomy_codes: Vec::new(),
            entity_name: None,
            entity_code: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            awarded_to: None,
            award_amount: None,
            status: None,
        }
    }

    /// Whether any contact field carries a value.
    pub fn has_contact(&self) -> bool {
        self.contact_name.is_some() || self.contact_email.is_some() || self.contact_phone.is_some()
    }
}

/// An attachment discovered on a detail page.
///
/// Owned exclusively by its parent [`RawOpportunity`] for the lifetime of
/// the raw batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub file_name: String,
    pub download_url: String,

    /// Populated after a successful download; `None` when the download
    /// failed or was not attempted
    pub file_size_bytes: Option<u64>,

    /// Raw-record id of the owning opportunity
    pub parent_id: String,
}

/// A contact block as found on a detail page, before any normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl RawContact {
    /// Whether any field carries a value.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// One opportunity plus its attachments, as stored in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub opportunity: RawOpportunity,
    #[serde(default)]
    pub documents: Vec<RawDocument>,
}

/// Metadata header of a persisted batch file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub scraped_at: DateTime<Utc>,
    pub source: String,
    pub source_url: String,
    pub date_range: DateWindow,
    pub session_id: String,
    pub batch_number: u32,
    pub total_items: usize,
}

/// One page's worth of collected and detailed records.
///
/// Append-only: batch files within a session are numbered monotonically and
/// never mutated after write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub metadata: BatchMetadata,
    pub items: Vec<BatchItem>,
}

impl Batch {
    pub fn new(metadata: BatchMetadata, items: Vec<BatchItem>) -> Self {
        Self { metadata, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_opportunity_invariant_fields() {
        let opp = RawOpportunity::new("abc123", "https://portal.example.gov/opp/164192");
        assert_eq!(opp.id, "abc123");
        assert_eq!(opp.detail_url, "https://portal.example.gov/opp/164192");
        assert!(opp.title.is_none());
        assert!(!opp.has_contact());
    }

    #[test]
    fn test_raw_contact_empty_detection() {
        assert!(RawContact::default().is_empty());

        let contact = RawContact {
            phone: Some("918-555-0142".to_string()),
            ..Default::default()
        };
        assert!(!contact.is_empty());
    }
}
