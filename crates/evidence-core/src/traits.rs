//! Trait seams for the evidence chain.
//!
//! - `ChainStore`: the durable medium (append-only, one tail)
//! - `Clock`: where append timestamps come from
//!
//! `EvidenceLog` is the only caller of `ChainStore::append_with`. Stores are
//! responsible for holding an exclusive lock across the tail read and the
//! write so that two appends can never claim the same tail.

use chrono::{DateTime, Utc};

use evidence_contracts::{EvidenceResult, Record, StoredEntry};

/// An append-only backing store for one chain.
///
/// Implementations must be safe to share across threads. Scans are
/// read-only and must return a consistent snapshot: every entry that was
/// fully committed when the scan began, and no half-written entry from an
/// append still in flight.
pub trait ChainStore: Send + Sync {
    /// Read the tail, build the next record from it, and append that record.
    ///
    /// `build` receives the current last record (`None` for an empty log).
    /// The whole sequence runs under the store's exclusive lock. If `build`
    /// returns an error nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceError::Storage` when the medium cannot be read,
    /// locked, or written, or when the tail entry is unreadable (a chain with
    /// a broken tail cannot be extended). Errors from `build` pass through.
    fn append_with(
        &self,
        build: &mut dyn FnMut(Option<&Record>) -> EvidenceResult<Record>,
    ) -> EvidenceResult<Record>;

    /// Return every stored entry in storage order.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceError::Storage` when the medium cannot be read.
    /// Unparseable lines are not errors; they come back as
    /// `StoredEntry::Malformed`.
    fn scan(&self) -> EvidenceResult<Vec<StoredEntry>>;
}

/// Source of append timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
