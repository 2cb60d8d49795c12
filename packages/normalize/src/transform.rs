//! Raw-to-canonical transformation.
//!
//! One pass over the batch items: each raw opportunity yields a contract,
//! possibly an agency, possibly a person, and one document per raw
//! attachment. Parent/child links are attached immediately as the related
//! entities are produced — no second linking pass. Per-field parse
//! failures (dates, amounts) degrade to `None`; nothing in this module
//! fails an item.

use serde::Serialize;
use tracing::{debug, info};

use harvest::dates::parse_flexible;
use harvest::types::{Batch, BatchItem, RawDocument, RawOpportunity};

use crate::contact::{normalize_email, normalize_phone};
use crate::ids::entity_id;
use crate::money::parse_amount;
use crate::status::normalize_status;
use crate::types::{
    NormalizedAgency, NormalizedContract, NormalizedDocument, NormalizedPerson,
};

/// File-type fallback for missing or implausible extensions.
const UNKNOWN_FILE_TYPE: &str = "unknown";

/// Longest extension still treated as a real file type.
const MAX_EXTENSION_LEN: usize = 10;

/// Entities produced by one transform pass, pre-deduplication.
#[derive(Debug, Default)]
pub struct TransformOutput {
    pub contracts: Vec<NormalizedContract>,
    pub agencies: Vec<NormalizedAgency>,
    pub people: Vec<NormalizedPerson>,
    pub documents: Vec<NormalizedDocument>,
    pub report: TransformReport,
}

/// Summary of one transform pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    pub batches_read: usize,
    pub items_processed: usize,
    pub contracts_built: usize,
    pub agencies_built: usize,
    pub people_built: usize,
    pub documents_built: usize,
    pub unparsed_dates: usize,
    pub unparsed_amounts: usize,
}

/// Maps raw records from one source into the canonical model.
pub struct Transformer {
    source: String,
}

impl Transformer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Transform every item of every batch, independently.
    pub fn transform_batches(&self, batches: &[Batch]) -> TransformOutput {
        let mut out = TransformOutput::default();
        out.report.batches_read = batches.len();

        for batch in batches {
            for item in &batch.items {
                self.transform_item(item, &mut out);
            }
        }

        info!(
            source = %self.source,
            batches = out.report.batches_read,
            contracts = out.report.contracts_built,
            agencies = out.report.agencies_built,
            people = out.report.people_built,
            documents = out.report.documents_built,
            "transform pass complete"
        );
        out
    }

    /// Transform one batch item, linking children as they are produced.
    pub fn transform_item(&self, item: &BatchItem, out: &mut TransformOutput) {
        out.report.items_processed += 1;

        let mut contract = self.build_contract(&item.opportunity, &mut out.report);

        if let Some(agency) = self.build_agency(&item.opportunity) {
            contract.agency_id = Some(agency.id.clone());
            out.agencies.push(agency);
            out.report.agencies_built += 1;
        }

        if let Some(person) = self.build_person(&item.opportunity) {
            contract.contact_ids.push(person.id.clone());
            out.people.push(person);
            out.report.people_built += 1;
        }

        for raw_doc in &item.documents {
            out.documents.push(self.build_document(raw_doc, &contract.id));
            out.report.documents_built += 1;
        }

        debug!(contract_id = %contract.id, "item transformed");
        out.contracts.push(contract);
        out.report.contracts_built += 1;
    }

    fn build_contract(
        &self,
        raw: &RawOpportunity,
        report: &mut TransformReport,
    ) -> NormalizedContract {
        let natural_key = raw.external_id.as_deref().unwrap_or(&raw.id);

        let mut parse_date = |value: &Option<String>| {
            let parsed = value.as_deref().and_then(parse_flexible);
            if parsed.is_none() && value.is_some() {
                report.unparsed_dates += 1;
            }
            parsed
        };
        let open_date = parse_date(&raw.open_date);
        let close_date = parse_date(&raw.close_date);
        let created_at = parse_date(&raw.created_at);

        let amount = raw.award_amount.as_deref().and_then(|value| {
            let parsed = parse_amount(value);
            if parsed.is_none() {
                report.unparsed_amounts += 1;
            }
            parsed
        });

        NormalizedContract {
            id: entity_id(&self.source, natural_key),
            source: self.source.clone(),
            external_id: raw.external_id.clone(),
            title: raw.title.clone().unwrap_or_else(|| "Unknown".to_string()),
            description: raw
                .description
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            note: raw.note.clone(),
            status: normalize_status(raw.status.as_deref().unwrap_or("Unknown")),
            open_date,
            close_date,
            created_at,
            categories: raw.categories.clone(),
            taxonomy_codes: raw.taxonomy_codes.clone(),
            agency_id: None,
            contact_ids: Vec::new(),
            awarded_to: raw.awarded_to.clone(),
            amount,
            source_url: raw.detail_url.clone(),
        }
    }

    /// An agency exists only when the raw record names an entity. The
    /// natural key is the agency code when present, the name otherwise.
    fn build_agency(&self, raw: &RawOpportunity) -> Option<NormalizedAgency> {
        let name = raw.entity_name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }

        let natural_key = raw
            .entity_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(name);

        Some(NormalizedAgency {
            id: entity_id(&self.source, natural_key),
            source: self.source.clone(),
            name: name.to_string(),
            code: raw.entity_code.clone(),
        })
    }

    /// A person exists when any contact field carries a value. Email is
    /// the preferred identity key, then name, then bare phone digits.
    fn build_person(&self, raw: &RawOpportunity) -> Option<NormalizedPerson> {
        if !raw.has_contact() {
            return None;
        }

        let email = raw.contact_email.as_deref().and_then(normalize_email);
        let phone = raw.contact_phone.as_deref().and_then(normalize_phone);
        let name = raw
            .contact_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let natural_key = email
            .clone()
            .or_else(|| name.as_deref().map(str::to_lowercase))
            .or_else(|| phone.clone())?;

        Some(NormalizedPerson {
            id: entity_id(&self.source, &natural_key),
            source: self.source.clone(),
            name,
            email,
            phone,
        })
    }

    fn build_document(&self, raw: &RawDocument, contract_id: &str) -> NormalizedDocument {
        let natural_key = if raw.download_url.trim().is_empty() {
            raw.id.as_str()
        } else {
            raw.download_url.as_str()
        };

        NormalizedDocument {
            id: entity_id(&self.source, natural_key),
            source: self.source.clone(),
            contract_id: contract_id.to_string(),
            file_name: raw.file_name.clone(),
            file_type: file_type_of(&raw.file_name),
            download_url: raw.download_url.clone(),
            file_size_bytes: raw.file_size_bytes,
        }
    }
}

/// Lower-cased filename extension, or `"unknown"` when missing or
/// implausibly long.
fn file_type_of(file_name: &str) -> String {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return UNKNOWN_FILE_TYPE.to_string();
    };
    let ext = ext.trim();
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return UNKNOWN_FILE_TYPE.to_string();
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return UNKNOWN_FILE_TYPE.to_string();
    }
    ext.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(external_id: &str) -> RawOpportunity {
        let mut opp = RawOpportunity::new(
            format!("raw-{external_id}"),
            format!("https://x.test/opp/{external_id}"),
        );
        opp.external_id = Some(external_id.to_string());
        opp.title = Some("Roof Repair".to_string());
        opp.description = Some("Re-roof the annex.".to_string());
        opp.status = Some("Open".to_string());
        opp
    }

    fn item(opp: RawOpportunity, documents: Vec<RawDocument>) -> BatchItem {
        BatchItem {
            opportunity: opp,
            documents,
        }
    }

    #[test]
    fn test_scenario_cherokee_nation() {
        let mut opp = raw("164192");
        opp.entity_name = Some("Cherokee Nation".to_string());
        opp.contact_email = Some("JANE@X.COM".to_string());

        let transformer = Transformer::new("okbids");
        let mut out = TransformOutput::default();
        transformer.transform_item(&item(opp, vec![]), &mut out);

        let contract = &out.contracts[0];
        assert_eq!(contract.status, "open");
        assert_eq!(contract.title, "Roof Repair");

        let agency = &out.agencies[0];
        assert_eq!(agency.name, "Cherokee Nation");
        assert_eq!(contract.agency_id.as_deref(), Some(agency.id.as_str()));

        let person = &out.people[0];
        assert_eq!(person.email.as_deref(), Some("jane@x.com"));
        assert_eq!(contract.contact_ids, vec![person.id.clone()]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let transformer = Transformer::new("okbids");

        let ids: Vec<(String, String, String)> = (0..2)
            .map(|_| {
                let mut opp = raw("164192");
                opp.entity_name = Some("Cherokee Nation".to_string());
                opp.contact_email = Some("jane@x.com".to_string());

                let mut out = TransformOutput::default();
                transformer.transform_item(&item(opp, vec![]), &mut out);
                (
                    out.contracts[0].id.clone(),
                    out.agencies[0].id.clone(),
                    out.people[0].id.clone(),
                )
            })
            .collect();

        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_dates_and_amounts_parsed() {
        let mut opp = raw("1");
        opp.open_date = Some("01/02/2024".to_string());
        opp.close_date = Some("January 9, 2024".to_string());
        opp.created_at = Some("no date here".to_string());
        opp.award_amount = Some("$1M - $5M".to_string());

        let transformer = Transformer::new("okbids");
        let mut out = TransformOutput::default();
        transformer.transform_item(&item(opp, vec![]), &mut out);

        let contract = &out.contracts[0];
        assert_eq!(
            contract.open_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(
            contract.close_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 9)
        );
        assert_eq!(contract.created_at, None);
        assert_eq!(contract.amount, Some(1_000_000));
        assert_eq!(out.report.unparsed_dates, 1);
    }

    #[test]
    fn test_no_entity_no_agency() {
        let transformer = Transformer::new("okbids");
        let mut out = TransformOutput::default();
        transformer.transform_item(&item(raw("2"), vec![]), &mut out);

        assert!(out.agencies.is_empty());
        assert!(out.contracts[0].agency_id.is_none());
        assert!(out.people.is_empty());
        assert!(out.contracts[0].contact_ids.is_empty());
    }

    #[test]
    fn test_agency_keyed_by_code_when_present() {
        let transformer = Transformer::new("okbids");

        let mut with_code = raw("3");
        with_code.entity_name = Some("Cherokee Nation".to_string());
        with_code.entity_code = Some("CN-001".to_string());

        let mut renamed = raw("4");
        renamed.entity_name = Some("Cherokee Nation Businesses".to_string());
        renamed.entity_code = Some("CN-001".to_string());

        let mut out = TransformOutput::default();
        transformer.transform_item(&item(with_code, vec![]), &mut out);
        transformer.transform_item(&item(renamed, vec![]), &mut out);

        // Same code, same identity, despite the different display names
        assert_eq!(out.agencies[0].id, out.agencies[1].id);
    }

    #[test]
    fn test_person_falls_back_to_name_key() {
        let transformer = Transformer::new("okbids");

        let mut opp = raw("5");
        opp.contact_name = Some("Jane Doe".to_string());
        opp.contact_email = Some("not-an-email".to_string());

        let mut out = TransformOutput::default();
        transformer.transform_item(&item(opp, vec![]), &mut out);

        let person = &out.people[0];
        assert_eq!(person.name.as_deref(), Some("Jane Doe"));
        assert!(person.email.is_none());
        assert_eq!(person.id, entity_id("okbids", "jane doe"));
    }

    #[test]
    fn test_documents_linked_to_contract() {
        let transformer = Transformer::new("okbids");

        let opp = raw("6");
        let documents = vec![
            RawDocument {
                id: "d1".to_string(),
                file_name: "plans.PDF".to_string(),
                download_url: "https://x.test/files/plans.pdf".to_string(),
                file_size_bytes: Some(2_048),
                parent_id: "raw-6".to_string(),
            },
            RawDocument {
                id: "d2".to_string(),
                file_name: "README".to_string(),
                download_url: "https://x.test/files/readme".to_string(),
                file_size_bytes: None,
                parent_id: "raw-6".to_string(),
            },
        ];

        let mut out = TransformOutput::default();
        transformer.transform_item(&item(opp, documents), &mut out);

        let contract_id = out.contracts[0].id.clone();
        assert_eq!(out.documents.len(), 2);
        assert!(out.documents.iter().all(|d| d.contract_id == contract_id));
        assert_eq!(out.documents[0].file_type, "pdf");
        assert_eq!(out.documents[1].file_type, "unknown");
    }

    #[test]
    fn test_file_type_edge_cases() {
        assert_eq!(file_type_of("specs.docx"), "docx");
        assert_eq!(file_type_of("archive.tar.gz"), "gz");
        assert_eq!(file_type_of("no-extension"), "unknown");
        assert_eq!(file_type_of(".hidden"), "unknown");
        assert_eq!(file_type_of("weird.extension-too-long-to-be-real"), "unknown");
        assert_eq!(file_type_of("trailing."), "unknown");
    }
}
