//! Storage Module
//!
//! Per-level persistence: checksummed append-only logs with in-memory indexes.
//!
//! ## Responsibilities
//! - Encode/decode records with corruption detection
//! - Map keys to log offsets in an ordered in-memory index
//! - Rebuild the index by replaying a log on open
//! - Merge one level's log into another (compaction)
//!
//! ## Layering
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Segment   (owns the level's data file) │
//! ├────────────────────────────────────────┤
//! │ Table     (log + index, any Seek)      │
//! ├───────────────────┬────────────────────┤
//! │ Record codec      │ Ordered index      │
//! │ [len|key|sum|len| │ key → offset       │
//! │  value]           │ (BTreeMap)         │
//! └───────────────────┴────────────────────┘
//! ```

mod index;
pub mod record;
mod segment;
mod table;

pub use index::OrderedIndex;
pub use record::Record;
pub use segment::Segment;
pub use table::{LogStorage, Table};
