//! # evidence-store
//!
//! Durable storage for the evidence chain.
//!
//! [`JsonlChainStore`] keeps the chain as JSON Lines, one record per line,
//! and implements [`evidence_core::ChainStore`]. [`attachment`] hashes files
//! so records can reference them by digest.
//!
//! ```rust,ignore
//! use evidence_core::EvidenceLog;
//! use evidence_store::JsonlChainStore;
//!
//! let store = JsonlChainStore::in_dir("evidence_logs", "evidence_chain.jsonl")?;
//! let log = EvidenceLog::new(store);
//! ```

pub mod attachment;
pub mod jsonl;

pub use attachment::{attach_files, Attachment, ATTACHMENTS_KEY};
pub use jsonl::{parse_lines, JsonlChainStore, DEFAULT_FILE_NAME};

// ── Tests ─────────────────────────────────────────────────────────────────────
