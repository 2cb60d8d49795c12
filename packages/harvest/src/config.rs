//! Per-source configuration.
//!
//! Everything source-specific — URLs, selectors, label vocabularies,
//! pacing — lives in one immutable [`SourceConfig`] passed into the
//! collection controller and record extractor at construction. Nothing is
//! read from ambient or global state.
//!
//! The defaults describe a generic server-rendered procurement portal;
//! individual sources override what differs.

use serde::{Deserialize, Serialize};

use crate::extract::tabs::TabConfig;
use crate::resolve::FieldPlan;

/// Page-number placeholder in a listing URL template.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Selectors for decoding one listing page into entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One listing row
    pub row: String,

    /// Detail link within a row
    pub link: String,

    /// Row title; defaults to the link text when absent
    pub title: Option<String>,

    /// Posted/listed date within a row
    pub date: Option<String>,

    /// Element carrying the source-native id as an attribute
    pub id_attr_selector: Option<String>,

    /// Attribute name on `id_attr_selector`
    pub id_attr: Option<String>,

    /// Element whose text is the source-native id
    pub id_text: Option<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            row: "table.listing tbody tr, ul.results > li, .opportunity-row".to_string(),
            link: "a".to_string(),
            title: None,
            date: Some(".date, .posted, td.posted-date".to_string()),
            id_attr_selector: Some("a".to_string()),
            id_attr: Some("data-id".to_string()),
            id_text: Some(".event-id, .reference".to_string()),
        }
    }
}

/// Selectors for the attachment list on a detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSelectors {
    /// One attachment row or list item
    pub row: String,

    /// Download link within a row
    pub link: String,
}

impl Default for DocumentSelectors {
    fn default() -> Self {
        Self {
            row: ".attachments li, table.attachments tr, .documents .document".to_string(),
            link: "a[href]".to_string(),
        }
    }
}

/// Ordered fallback chains for every detail-page field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPlans {
    pub external_id: FieldPlan,
    pub title: FieldPlan,
    pub description: FieldPlan,
    pub note: FieldPlan,
    pub status: FieldPlan,
    pub open_date: FieldPlan,
    pub close_date: FieldPlan,
    pub created_at: FieldPlan,
    pub entity_name: FieldPlan,
    pub entity_code: FieldPlan,
    pub contact_name: FieldPlan,
    pub contact_email: FieldPlan,
    pub contact_phone: FieldPlan,
    pub awarded_to: FieldPlan,
    pub award_amount: FieldPlan,
}

impl Default for FieldPlans {
    fn default() -> Self {
        // Attempt order per field: source label match, then generic
        // selectors, then tabular fallback
        Self {
            external_id: FieldPlan::new()
                .labeled(["Event ID", "Solicitation Number", "Reference Number", "Bid Number"])
                .any_text([".event-id", ".solicitation-number", ".reference"])
                .table(["event_id", "solicitation", "reference"]),
            title: FieldPlan::new()
                .any_text(["h1.opportunity-title", ".detail-header h1", "h1", "h2.title"])
                .labeled(["Title", "Project Name"]),
            description: FieldPlan::new()
                .labeled(["Description", "Summary", "Scope of Work"])
                .any_text([".description", "#description", ".opportunity-description"])
                .table(["description", "summary"]),
            note: FieldPlan::new()
                .labeled(["Note", "Notes", "Special Instructions"])
                .any_text([".notes", ".special-instructions"]),
            status: FieldPlan::new()
                .labeled(["Status", "Stage", "Bid Status"])
                .any_text([".status", ".opportunity-status", ".badge-status"])
                .table(["status", "stage"]),
            open_date: FieldPlan::new()
                .labeled(["Open Date", "Posting Date", "Start Date", "Posted"])
                .any_text([".open-date", ".posting-date"])
                .table(["open_date", "posting_date", "start_date"]),
            close_date: FieldPlan::new()
                .labeled(["Close Date", "Closing Date", "Due Date", "Deadline"])
                .any_text([".close-date", ".due-date"])
                .table(["close_date", "closing_date", "due_date", "deadline"]),
            created_at: FieldPlan::new()
                .labeled(["Created", "Issued", "Published"])
                .attr("meta[property='article:published_time']", "content"),
            entity_name: FieldPlan::new()
                .labeled(["Entity", "Agency", "Organization", "Department"])
                .any_text([".entity-name", ".agency-name"])
                .table(["entity", "agency", "organization", "department"]),
            entity_code: FieldPlan::new()
                .labeled(["Entity Code", "Agency Code"])
                .table(["entity_code", "agency_code"]),
            contact_name: FieldPlan::new()
                .labeled(["Contact Name", "Buyer Name", "Contact", "Buyer"])
                .any_text([".contact-name", ".buyer-name"])
                .table(["contact_name", "buyer"]),
            contact_email: FieldPlan::new()
                .attr("a[href^='mailto:']", "href")
                .labeled(["Email", "Buyer Email", "Contact Email"])
                .table(["email", "buyer_email", "contact_email"]),
            contact_phone: FieldPlan::new()
                .labeled(["Phone", "Telephone", "Contact Phone"])
                .any_text([".contact-phone", ".buyer-phone"])
                .table(["phone", "telephone"]),
            awarded_to: FieldPlan::new()
                .labeled(["Awarded To", "Winner", "Successful Bidder"])
                .table(["awarded_to", "winner"]),
            award_amount: FieldPlan::new()
                .labeled(["Award Amount", "Contract Value", "Estimated Value"])
                .table(["award_amount", "contract_value", "estimated_value"]),
        }
    }
}

/// Immutable configuration for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short source name, used in ids, session names, and output metadata
    pub name: String,

    /// Listing URL template with a `{page}` placeholder. A template
    /// without the placeholder names a single-page source.
    pub listing_url: String,

    /// Expected items per listing page; a shorter page ends pagination
    pub page_size: usize,

    /// Whether the listing is guaranteed descending by date. Enables the
    /// early pagination stop; sources without the guarantee must leave
    /// this off and rely on the short-page termination alone.
    pub ordered_by_date_desc: bool,

    /// Delay between detail-page visits
    pub item_delay_ms: u64,

    /// Delay between listing pages
    pub page_delay_ms: u64,

    /// Harvest tab content on detail pages
    pub harvest_tabs: bool,

    /// Download attachments during collection
    pub download_attachments: bool,

    /// Bounded retry count for attachment downloads
    pub max_download_attempts: u32,

    pub listing: ListingSelectors,
    pub fields: FieldPlans,
    pub documents: DocumentSelectors,
    pub tabs: TabConfig,

    /// Selector for classification code elements
    pub categories_selector: Option<String>,

    /// Selector for taxonomy code elements
    pub taxonomy_selector: Option<String>,

    /// Tab names (substring match) whose content backfills a missing
    /// description
    pub description_tabs: Vec<String>,

    /// Tab names whose content backfills a missing note
    pub note_tabs: Vec<String>,
}

impl SourceConfig {
    /// Create a config with the generic-portal defaults.
    pub fn new(name: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listing_url: listing_url.into(),
            page_size: 25,
            ordered_by_date_desc: true,
            item_delay_ms: 500,
            page_delay_ms: 1_000,
            harvest_tabs: true,
            download_attachments: false,
            max_download_attempts: 3,
            listing: ListingSelectors::default(),
            fields: FieldPlans::default(),
            documents: DocumentSelectors::default(),
            tabs: TabConfig::default(),
            categories_selector: Some(".categories .category, .commodity-codes li".to_string()),
            taxonomy_selector: Some(".naics li, .taxonomy-codes li".to_string()),
            description_tabs: vec![
                "description".to_string(),
                "overview".to_string(),
                "details".to_string(),
            ],
            note_tabs: vec!["note".to_string(), "instruction".to_string()],
        }
    }

    /// Set the expected page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Disable the descending-date early stop for sources without the
    /// ordering guarantee.
    pub fn without_date_ordering(mut self) -> Self {
        self.ordered_by_date_desc = false;
        self
    }

    /// Set pacing delays.
    pub fn with_delays(mut self, item_delay_ms: u64, page_delay_ms: u64) -> Self {
        self.item_delay_ms = item_delay_ms;
        self.page_delay_ms = page_delay_ms;
        self
    }

    /// Enable attachment downloads.
    pub fn with_downloads(mut self, max_attempts: u32) -> Self {
        self.download_attachments = true;
        self.max_download_attempts = max_attempts;
        self
    }

    /// Disable tab harvesting.
    pub fn without_tabs(mut self) -> Self {
        self.harvest_tabs = false;
        self
    }

    /// Replace the listing selectors.
    pub fn with_listing(mut self, listing: ListingSelectors) -> Self {
        self.listing = listing;
        self
    }

    /// Replace the field plans.
    pub fn with_fields(mut self, fields: FieldPlans) -> Self {
        self.fields = fields;
        self
    }

    /// Concrete listing URL for a 1-based page number.
    pub fn listing_page_url(&self, page: u32) -> String {
        self.listing_url
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Whether the listing URL paginates at all.
    pub fn is_paginated(&self) -> bool {
        self.listing_url.contains(PAGE_PLACEHOLDER)
    }
}
