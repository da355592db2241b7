//! Assemble an `ExportReport` from a snapshot of stored entries.
//!
//! Export introduces no state of its own: it is a full-scan verification
//! plus the raw entries, annotated with per-entry status.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use evidence_contracts::{EntryStatus, ExportReport, ExportedEntry, StoredEntry, VerifyMode};

use crate::chain::{genesis_hash, verify_entries, DIGEST_ALGORITHM};

/// Build the export for `entries` as of `exported_at`.
pub fn build_export(entries: &[StoredEntry], exported_at: DateTime<Utc>) -> ExportReport {
    let report = verify_entries(entries, VerifyMode::FullScan);
    let first_break = report.first_break();

    let mut reasons_by_index: HashMap<usize, _> = report
        .findings
        .iter()
        .map(|f| (f.index, f.reasons.clone()))
        .collect();

    let exported: Vec<ExportedEntry> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let status = match reasons_by_index.remove(&index) {
                Some(reasons) => EntryStatus::Broken { reasons },
                None if first_break.is_some_and(|b| index > b) => EntryStatus::Unverified,
                None => EntryStatus::Verified,
            };
            let (record, raw) = match entry {
                StoredEntry::Record(r) => (Some(r.clone()), None),
                StoredEntry::Malformed { raw, .. } => (None, Some(raw.clone())),
            };
            ExportedEntry {
                index,
                status,
                record,
                raw,
            }
        })
        .collect();

    let first_entry_at = entries.iter().find_map(StoredEntry::record).map(|r| r.timestamp);
    let last = entries.iter().rev().find_map(StoredEntry::record);

    debug!(
        entries = exported.len(),
        status = %report.status,
        "export assembled"
    );

    ExportReport {
        export_id: uuid::Uuid::new_v4(),
        exported_at,
        digest_algorithm: DIGEST_ALGORITHM.to_string(),
        genesis_hash: genesis_hash(),
        status: report.status,
        total_entries: entries.len(),
        first_entry_at,
        last_entry_at: last.map(|r| r.timestamp),
        terminal_hash: last.map(|r| r.entry_hash.clone()),
        findings: report.findings,
        entries: exported,
    }
}
