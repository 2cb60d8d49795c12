//! Collection-side library for the intake pipeline.
//!
//! Walks paginated listing/detail documents through a pluggable document
//! accessor, recovers fields from heterogeneous unlabeled structures via
//! cascading fallback chains, and persists immutable raw batches for the
//! normalization stage.
//!
//! # Design Philosophy
//!
//! **Fail soft per field, fail loud per run.**
//!
//! - Every field is an ordered list of acquisition strategies; a miss is
//!   `None`, never an error
//! - A broken item is logged and skipped; collection continues
//! - Storage and first-page accessor failures abort the run with typed
//!   errors
//! - Raw records are stored exactly as found — normalization is someone
//!   else's pass
//!
//! # Modules
//!
//! - [`accessor`] - Document automation capability trait + implementations
//! - [`resolve`] - Ordered-fallback field resolution
//! - [`extract`] - Labeled-value, tabular, tabbed, and record extractors
//! - [`collect`] - Pagination controller, admission test, sessions
//! - [`store`] - Immutable numbered batch files
//! - [`download`] - Attachment fetching with bounded retry
//! - [`config`] - Immutable per-source configuration
//! - [`testing`] - Scriptable mock accessor

pub mod accessor;
pub mod collect;
pub mod config;
pub mod dates;
pub mod dom;
pub mod download;
pub mod error;
pub mod extract;
pub mod resolve;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use accessor::{DocumentAccessor, PoliteAccessor, StaticAccessor};
pub use collect::{CollectReport, CollectionController, DateWindow, Session};
pub use config::{FieldPlans, ListingSelectors, SourceConfig};
pub use dom::Document;
pub use download::{Downloader, HttpDownloader, RetryPolicy};
pub use error::{AccessError, DownloadError, HarvestError, StorageError};
pub use extract::{harvest_tabs, labeled_value, RecordExtractor, TabConfig};
pub use resolve::{resolve, FieldPlan, FieldStrategy};
pub use store::BatchStore;
pub use types::{Batch, BatchItem, BatchMetadata, ListingEntry, RawContact, RawDocument, RawOpportunity};
