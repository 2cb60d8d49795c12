//! Structured-content extractors.
//!
//! Each extractor recovers values from one kind of document structure —
//! labeled pairs, tables, tab panels — and all of them share the same
//! fail-soft contract: a miss is `None` or an omission, never an error.

pub mod labeled;
pub mod record;
pub mod tabs;
pub mod tabular;

pub use labeled::labeled_value;
pub use record::{raw_record_id, RecordExtractor};
pub use tabs::{harvest_tabs, TabConfig};
pub use tabular::{decode_tables, DecodedTable};
