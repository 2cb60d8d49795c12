//! Canonical entity model.
//!
//! These are the normalized counterparts of the raw collection-side
//! records: ISO dates, canonical status strings, whole-unit amounts, and
//! deterministic content-addressed ids linking children to parents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A normalized contract opportunity.
///
/// Created once per raw opportunity and never mutated after the pipeline
/// run completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedContract {
    /// Deterministic hash of `(source, external id)`
    pub id: String,
    pub source: String,
    pub external_id: Option<String>,

    pub title: String,
    pub description: String,
    pub note: Option<String>,

    /// Canonical status (see [`crate::status::normalize_status`])
    pub status: String,

    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDate>,

    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub taxonomy_codes: Vec<String>,

    /// Issuing agency, when one was found
    pub agency_id: Option<String>,

    /// Contacts in discovery order
    #[serde(default)]
    pub contact_ids: Vec<String>,

    pub awarded_to: Option<String>,

    /// Award/estimated amount in whole currency units
    pub amount: Option<i64>,

    pub source_url: String,
}

/// A normalized issuing agency, content-addressed by its code or name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAgency {
    pub id: String,
    pub source: String,
    pub name: String,
    pub code: Option<String>,
}

/// A normalized contact person, content-addressed by email or name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPerson {
    pub id: String,
    pub source: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A normalized attachment, always linked to exactly one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub id: String,
    pub source: String,
    pub contract_id: String,
    pub file_name: String,

    /// Lower-cased filename extension, or `"unknown"`
    pub file_type: String,

    pub download_url: String,
    pub file_size_bytes: Option<u64>,
}

/// Anything carrying a deterministic entity id.
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for NormalizedContract {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for NormalizedAgency {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for NormalizedPerson {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for NormalizedDocument {
    fn id(&self) -> &str {
        &self.id
    }
}
