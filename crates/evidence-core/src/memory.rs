//! In-memory implementation of `ChainStore`.
//!
//! `InMemoryChainStore` keeps every entry in a `Vec` behind a `Mutex`. It is
//! the reference store: embedded callers that do not need durability use it,
//! and so do the tests that tamper with stored entries directly.

use std::sync::Mutex;

use tracing::debug;

use evidence_contracts::{EvidenceError, EvidenceResult, Record, StoredEntry};

use crate::traits::ChainStore;

/// An append-only chain held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryChainStore {
    pub(crate) entries: Mutex<Vec<StoredEntry>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing sequence of entries, e.g. one loaded from an export
    /// that should be re-verified.
    pub fn from_entries(entries: Vec<StoredEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy out the current entries.
    pub fn entries(&self) -> EvidenceResult<Vec<StoredEntry>> {
        self.scan()
    }

    fn lock(&self) -> EvidenceResult<std::sync::MutexGuard<'_, Vec<StoredEntry>>> {
        self.entries.lock().map_err(|e| EvidenceError::Storage {
            reason: format!("chain state lock poisoned: {}", e),
        })
    }
}

impl ChainStore for InMemoryChainStore {
    fn append_with(
        &self,
        build: &mut dyn FnMut(Option<&Record>) -> EvidenceResult<Record>,
    ) -> EvidenceResult<Record> {
        let mut entries = self.lock()?;

        let tail = match entries.last() {
            None => None,
            Some(StoredEntry::Record(r)) => Some(r),
            Some(StoredEntry::Malformed { line, .. }) => {
                return Err(EvidenceError::Storage {
                    reason: format!(
                        "tail entry at line {} is unreadable; the chain cannot be extended",
                        line
                    ),
                });
            }
        };

        let record = build(tail)?;
        debug!(
            sequence_index = record.sequence_index,
            entry_hash = %record.entry_hash,
            "appended record to in-memory chain"
        );
        entries.push(StoredEntry::Record(record.clone()));
        Ok(record)
    }

    fn scan(&self) -> EvidenceResult<Vec<StoredEntry>> {
        Ok(self.lock()?.clone())
    }
}
