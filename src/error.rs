//! Error types for lsmkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LsmError
pub type Result<T> = std::result::Result<T, LsmError>;

/// Unified error type for lsmkv operations
#[derive(Debug, Error)]
pub enum LsmError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    /// Stored checksum disagrees with the one recomputed from the value bytes
    #[error("Data for key '{}' checksum mismatch", String::from_utf8_lossy(.key))]
    CorruptedData { key: Vec<u8> },

    /// Record is structurally unreadable (negative length, torn tail)
    #[error("Malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LsmError {
    /// True for the "key absent" outcome, which callers often handle as a non-error
    pub fn is_not_found(&self) -> bool {
        matches!(self, LsmError::KeyNotFound)
    }
}
