//! # evidence-core
//!
//! Canonical hashing, chain verification, and the serialized append handle
//! for the tamper-evident evidence chain.
//!
//! ## Overview
//!
//! Every record stores the SHA-256 of its predecessor plus the SHA-256 of
//! its own canonical content. Editing any stored field, even one byte,
//! changes that record's recomputed hash and is reported by `verify` as a
//! break at that record's position.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use evidence_contracts::{Category, Payload, VerifyMode};
//! use evidence_core::{EvidenceLog, InMemoryChainStore};
//!
//! let log = EvidenceLog::new(InMemoryChainStore::new());
//! log.append(Category::Observation, "Test entry A", Payload::new())?;
//!
//! let report = log.verify(VerifyMode::FullScan)?;
//! assert!(report.is_intact());
//! ```

pub mod chain;
pub mod export;
pub mod log;
pub mod memory;
pub mod traits;

pub use chain::{
    canonical_bytes, genesis_hash, hash_record, recompute_hash, verify_entries, DIGEST_ALGORITHM,
    GENESIS_SEED,
};
pub use export::build_export;
pub use log::EvidenceLog;
pub use memory::InMemoryChainStore;
pub use traits::{ChainStore, Clock, SystemClock};

// ── Tests ─────────────────────────────────────────────────────────────────────
