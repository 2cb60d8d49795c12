//! The validation gate.
//!
//! Per-field extraction failures are always fail-soft, but a structural
//! violation in the final aggregate is fatal: the run aborts and nothing
//! partial is persisted. Checks: unique ids per collection, referential
//! closure for every cross-entity link, required fields, and metadata
//! totals that match the collections.

use std::collections::HashSet;

use crate::error::{NormalizeError, Result};
use crate::output::OutputAggregate;
use crate::types::HasId;

/// Validate an assembled aggregate against the output schema.
pub fn validate(aggregate: &OutputAggregate) -> Result<()> {
    let contract_ids = unique_ids("contracts", &aggregate.contracts)?;
    let agency_ids = unique_ids("agencies", &aggregate.agencies)?;
    let people_ids = unique_ids("people", &aggregate.people)?;
    unique_ids("documents", &aggregate.documents)?;

    // Referential closure: every link resolves inside this aggregate
    for contract in &aggregate.contracts {
        if let Some(agency_id) = &contract.agency_id {
            if !agency_ids.contains(agency_id.as_str()) {
                return Err(NormalizeError::validation(format!(
                    "contract {} references unknown agency {agency_id}",
                    contract.id
                )));
            }
        }
        for contact_id in &contract.contact_ids {
            if !people_ids.contains(contact_id.as_str()) {
                return Err(NormalizeError::validation(format!(
                    "contract {} references unknown contact {contact_id}",
                    contract.id
                )));
            }
        }
    }
    for document in &aggregate.documents {
        if !contract_ids.contains(document.contract_id.as_str()) {
            return Err(NormalizeError::validation(format!(
                "document {} references unknown contract {}",
                document.id, document.contract_id
            )));
        }
    }

    // Required fields
    for contract in &aggregate.contracts {
        require(!contract.title.trim().is_empty(), || {
            format!("contract {} has an empty title", contract.id)
        })?;
        require(!contract.status.trim().is_empty(), || {
            format!("contract {} has an empty status", contract.id)
        })?;
        require(!contract.source_url.trim().is_empty(), || {
            format!("contract {} has an empty source_url", contract.id)
        })?;
    }
    for agency in &aggregate.agencies {
        require(!agency.name.trim().is_empty(), || {
            format!("agency {} has an empty name", agency.id)
        })?;
    }
    for person in &aggregate.people {
        require(
            person.email.is_some() || person.name.is_some() || person.phone.is_some(),
            || format!("person {} has no identifying field", person.id),
        )?;
    }
    for document in &aggregate.documents {
        require(!document.file_name.trim().is_empty(), || {
            format!("document {} has an empty file_name", document.id)
        })?;
    }

    // Metadata totals must describe the collections
    let meta = &aggregate.metadata;
    require(meta.total_contracts == aggregate.contracts.len(), || {
        "metadata total_contracts does not match".to_string()
    })?;
    require(meta.total_agencies == aggregate.agencies.len(), || {
        "metadata total_agencies does not match".to_string()
    })?;
    require(meta.total_documents == aggregate.documents.len(), || {
        "metadata total_documents does not match".to_string()
    })?;
    require(meta.total_people == aggregate.people.len(), || {
        "metadata total_people does not match".to_string()
    })?;

    Ok(())
}

/// Collect ids, failing on the first duplicate or blank.
fn unique_ids<'a, T: HasId>(collection: &str, items: &'a [T]) -> Result<HashSet<&'a str>> {
    let mut ids = HashSet::with_capacity(items.len());
    for item in items {
        let id = item.id();
        if id.trim().is_empty() {
            return Err(NormalizeError::validation(format!(
                "{collection} contains an entity with an empty id"
            )));
        }
        if !ids.insert(id) {
            return Err(NormalizeError::validation(format!(
                "{collection} contains duplicate id {id}"
            )));
        }
    }
    Ok(ids)
}

fn require(condition: bool, reason: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(NormalizeError::validation(reason()))
    }
}
