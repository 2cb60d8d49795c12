//! Normalization-side library for the intake pipeline.
//!
//! Reads immutable raw batches persisted by the collection stage and
//! produces one canonical, referentially-closed output aggregate:
//! contracts, agencies, documents, and people with deterministic
//! content-addressed ids.
//!
//! # Design Philosophy
//!
//! **Identity is a function of content.**
//!
//! - Every entity id is a hash of `(source, natural key)` — repeated runs
//!   over the same inputs converge instead of duplicating
//! - Field-level parse failures (dates, amounts, contacts) degrade to
//!   `None`, never errors
//! - The final gate is strict: a schema violation aborts the run and
//!   nothing partial is persisted
//!
//! # Modules
//!
//! - [`transform`] - Raw-to-canonical mapping with in-pass linking
//! - [`ids`] - Deterministic entity identity
//! - [`dedup`] - Keep-first collapse by id
//! - [`validate`] - The fatal validation gate
//! - [`output`] - Aggregate assembly and persistence
//! - [`status`], [`money`], [`contact`] - Scalar normalizers

pub mod contact;
pub mod dedup;
pub mod error;
pub mod ids;
pub mod money;
pub mod output;
pub mod status;
pub mod transform;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use dedup::dedupe_by_id;
pub use error::{NormalizeError, Result};
pub use ids::entity_id;
pub use output::{OutputAggregate, OutputMetadata};
pub use transform::{TransformOutput, TransformReport, Transformer};
pub use types::{
    HasId, NormalizedAgency, NormalizedContract, NormalizedDocument, NormalizedPerson,
};
pub use validate::validate;
