//! Output aggregate assembly and persistence.
//!
//! The aggregate is the final artifact of an intake run: all normalized
//! collections plus run metadata, deduplicated and validated before
//! anything touches disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dedup::dedupe_by_id;
use crate::error::{NormalizeError, Result};
use crate::transform::TransformOutput;
use crate::types::{
    NormalizedAgency, NormalizedContract, NormalizedDocument, NormalizedPerson,
};
use crate::validate::validate;

/// Run metadata carried inside the output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub processed_at: DateTime<Utc>,
    pub source: String,
    pub total_contracts: usize,
    pub total_agencies: usize,
    pub total_documents: usize,
    pub total_people: usize,
}

/// The final normalized artifact of one intake run.
///
/// Invariants (enforced by [`validate`]): every id within a collection is
/// unique, and every cross-entity reference resolves within this same
/// aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputAggregate {
    pub contracts: Vec<NormalizedContract>,
    pub agencies: Vec<NormalizedAgency>,
    pub documents: Vec<NormalizedDocument>,
    pub people: Vec<NormalizedPerson>,
    pub metadata: OutputMetadata,
}

impl OutputAggregate {
    /// Deduplicate a transform pass and stamp metadata.
    ///
    /// Deduplication keeps the first-encountered instance of every
    /// entity, in discovery order.
    pub fn assemble(source: impl Into<String>, output: TransformOutput) -> Self {
        let contracts = dedupe_by_id(output.contracts);
        let agencies = dedupe_by_id(output.agencies);
        let documents = dedupe_by_id(output.documents);
        let people = dedupe_by_id(output.people);

        let metadata = OutputMetadata {
            processed_at: Utc::now(),
            source: source.into(),
            total_contracts: contracts.len(),
            total_agencies: agencies.len(),
            total_documents: documents.len(),
            total_people: people.len(),
        };

        Self {
            contracts,
            agencies,
            documents,
            people,
            metadata,
        }
    }

    /// Run the validation gate. A failure here is fatal to the run.
    pub fn validate(&self) -> Result<()> {
        validate(self)
    }

    /// Validate, then persist as `normalized_<source>_<timestamp>.json`.
    ///
    /// Nothing is written when validation fails.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.validate()?;

        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| NormalizeError::io("create output dir", dir, e))?;

        let path = dir.join(format!(
            "normalized_{}_{}.json",
            self.metadata.source,
            self.metadata.processed_at.timestamp(),
        ));

        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&path, json).map_err(|e| NormalizeError::io("write output", &path, e))?;

        info!(
            path = %path.display(),
            contracts = self.metadata.total_contracts,
            "normalized output written"
        );
        Ok(path)
    }
}
