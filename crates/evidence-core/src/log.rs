//! The evidence log handle: the single serialized entry point for appends.
//!
//! `EvidenceLog` owns one `ChainStore`. Every append goes through
//! `append()`, which hands the store a closure that turns the current tail
//! into the next record. The store runs that closure under its exclusive
//! lock, so the tail read, the hash, and the write happen as one step.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use evidence_contracts::{
    Category, EvidenceError, EvidenceResult, ExportReport, Payload, Record, StoredEntry,
    VerificationReport, VerifyMode,
};

use crate::{
    chain::{genesis_hash, hash_record, verify_entries},
    export::build_export,
    traits::{ChainStore, Clock, SystemClock},
};

/// An append-only, tamper-evident evidence log over a `ChainStore`.
pub struct EvidenceLog<S: ChainStore> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: ChainStore> EvidenceLog<S> {
    /// Open a log over `store`, timestamping with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Box::new(SystemClock))
    }

    /// Open a log with an explicit clock.
    pub fn with_clock(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append one record to the chain.
    ///
    /// The timestamp is read under the store's lock and truncated to
    /// microseconds. If the clock reads earlier than the tail's timestamp,
    /// the tail's timestamp is reused so time never runs backwards along the
    /// chain.
    ///
    /// # Errors
    ///
    /// `EvidenceError::Storage` if the store cannot be read or written or
    /// its tail is unreadable; `EvidenceError::Validation` if the chain has
    /// exhausted its sequence space.
    pub fn append(
        &self,
        category: Category,
        description: impl Into<String>,
        payload: Payload,
    ) -> EvidenceResult<Record> {
        let description = description.into();

        let record = self.store.append_with(&mut |tail| {
            let (sequence_index, previous_hash, floor) = match tail {
                None => (0, genesis_hash(), None),
                Some(t) => {
                    let next = t.sequence_index.checked_add(1).ok_or_else(|| {
                        EvidenceError::Validation {
                            reason: "sequence index space exhausted".to_string(),
                        }
                    })?;
                    (next, t.entry_hash.clone(), Some(t.timestamp))
                }
            };

            let timestamp = monotonic(self.clock.now(), floor);
            let entry_hash = hash_record(
                sequence_index,
                &timestamp,
                category,
                &description,
                &payload,
                &previous_hash,
            );

            Ok(Record {
                sequence_index,
                timestamp,
                category,
                description: description.clone(),
                payload: payload.clone(),
                previous_hash,
                entry_hash,
            })
        })?;

        info!(
            sequence_index = record.sequence_index,
            category = %record.category,
            entry_hash = %record.entry_hash,
            "evidence recorded"
        );

        Ok(record)
    }

    /// Append with a category given as its wire name.
    ///
    /// Returns `EvidenceError::Validation` for an unrecognized name without
    /// touching the store.
    pub fn append_str(
        &self,
        category: &str,
        description: impl Into<String>,
        payload: Payload,
    ) -> EvidenceResult<Record> {
        let category: Category = category.parse()?;
        self.append(category, description, payload)
    }

    /// Verify the whole chain. Read-only.
    pub fn verify(&self, mode: VerifyMode) -> EvidenceResult<VerificationReport> {
        let entries = self.store.scan()?;
        debug!(entries = entries.len(), "scanned chain for verification");
        Ok(verify_entries(&entries, mode))
    }

    /// Snapshot the chain with per-entry verification status, stamped with
    /// the log's clock.
    pub fn export(&self) -> EvidenceResult<ExportReport> {
        let entries = self.store.scan()?;
        Ok(build_export(&entries, self.clock.now()))
    }

    /// Every stored entry, in order.
    pub fn entries(&self) -> EvidenceResult<Vec<StoredEntry>> {
        self.store.scan()
    }
}

/// Truncate to microseconds and clamp to `floor`.
fn monotonic(now: DateTime<Utc>, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match floor {
        Some(floor) if now < floor => floor,
        _ => now,
    }
}
