//! # lsmkv
//!
//! An embeddable, persistent key-value store built as a log-structured merge tree:
//! - One append-only, checksummed record log per level
//! - In-memory ordered index mapping keys to log offsets, rebuilt on open
//! - Size-tiered compaction cascading from young levels into old ones
//! - Single-owner access model (wrap in a mutex to share)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          HTTP facade (lsmkv-server) / CLI (lsmkv-cli)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ put / get / scan / scan_all / close
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Tree                                 │
//! │        (levels L0..Ln, threshold × growth_factor^n)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐
//!   │ Segment 0 │ │ Segment 1 │ │ Segment 2 │   {dir}/{n}/data
//!   └─────┬─────┘ └───────────┘ └───────────┘
//!         │
//!         ▼
//!   ┌─────────────────────────────┐
//!   │ Table = record log + index  │
//!   └─────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use lsmkv::Tree;
//!
//! # fn main() -> lsmkv::Result<()> {
//! let mut tree = Tree::open_path(1000, std::path::Path::new("./data"))?;
//! tree.put(b"hello", b"world")?;
//! assert_eq!(tree.get(b"hello")?, b"world");
//! tree.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod tree;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LsmError, Result};
pub use config::Config;
pub use tree::Tree;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lsmkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
