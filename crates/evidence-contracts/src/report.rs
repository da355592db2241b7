//! Verification and export report types.
//!
//! Verification never throws on a broken chain. It returns a
//! `VerificationReport` whose `status` is either `Intact` or `BrokenAt` the
//! first failing position, with every finding attached. `ExportReport`
//! combines that report with the raw entries for downstream rendering.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// How far verification walks once it has found a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyMode {
    /// Walk the whole log and report every finding downstream of the first.
    #[default]
    FullScan,
    /// Stop at the first finding.
    FailFast,
}

/// The two externally observable states of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ChainStatus {
    /// Every digest and every link checks out. An empty chain is intact.
    Intact,
    /// Position `index` is the first entry that fails; everything before it
    /// is independently valid.
    BrokenAt { index: usize },
}

impl ChainStatus {
    pub fn is_intact(&self) -> bool {
        matches!(self, ChainStatus::Intact)
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStatus::Intact => f.write_str("INTACT"),
            ChainStatus::BrokenAt { index } => write!(f, "BROKEN-AT({})", index),
        }
    }
}

/// Why a single entry failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BreakReason {
    /// The stored line is not a well-formed record.
    Malformed { error: String },

    /// `sequence_index` is not the next expected value.
    SequenceGap { expected: u64, found: u64 },

    /// Same `sequence_index` and `previous_hash` as the entry before it:
    /// two appends raced on one tail. The earlier entry is canonical.
    Fork { sequence_index: u64 },

    /// `previous_hash` does not equal the prior entry's `entry_hash`
    /// (or the genesis hash at position 0).
    LinkageMismatch { expected: String, found: String },

    /// Recomputing the digest from stored fields gives a different value.
    DigestMismatch { stored: String, recomputed: String },

    /// The timestamp is earlier than the previous entry's.
    TimestampRegression {
        previous: DateTime<Utc>,
        found: DateTime<Utc>,
    },
}

impl fmt::Display for BreakReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakReason::Malformed { error } => write!(f, "malformed entry: {}", error),
            BreakReason::SequenceGap { expected, found } => {
                write!(f, "sequence gap: expected {}, found {}", expected, found)
            }
            BreakReason::Fork { sequence_index } => {
                write!(f, "fork: second entry claiming sequence {}", sequence_index)
            }
            BreakReason::LinkageMismatch { expected, found } => write!(
                f,
                "linkage mismatch: expected previous_hash {}, found {}",
                short_hash(expected),
                short_hash(found)
            ),
            BreakReason::DigestMismatch { stored, recomputed } => write!(
                f,
                "digest mismatch: stored {}, recomputed {}",
                short_hash(stored),
                short_hash(recomputed)
            ),
            BreakReason::TimestampRegression { previous, found } => write!(
                f,
                "timestamp regression: {} is earlier than {}",
                found.to_rfc3339(),
                previous.to_rfc3339()
            ),
        }
    }
}

/// Everything wrong with one stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Position in storage order, 0-based.
    pub index: usize,
    /// The entry's own `sequence_index`, when it parsed.
    pub sequence_index: Option<u64>,
    /// At least one reason.
    pub reasons: Vec<BreakReason>,
}

/// Outcome of walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub status: ChainStatus,
    pub mode: VerifyMode,
    /// Number of entries examined. In fail-fast mode this stops at the break.
    pub entries_checked: usize,
    /// Total entries present in the snapshot.
    pub total_entries: usize,
    /// Findings in storage order. Empty when intact.
    pub findings: Vec<Finding>,
    /// `entry_hash` of the last entry before the first break (or of the last
    /// entry when intact). `None` when no entry is provably intact.
    pub last_intact_hash: Option<String>,
}

impl VerificationReport {
    pub fn is_intact(&self) -> bool {
        self.status.is_intact()
    }

    /// Index of the first break, if any.
    pub fn first_break(&self) -> Option<usize> {
        match self.status {
            ChainStatus::Intact => None,
            ChainStatus::BrokenAt { index } => Some(index),
        }
    }
}

/// Per-entry status in an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum EntryStatus {
    /// Before the first break: digest and linkage proven.
    Verified,
    /// Has findings of its own.
    Broken { reasons: Vec<BreakReason> },
    /// Downstream of the first break with no findings of its own. Its link
    /// to the provably intact prefix is lost.
    Unverified,
}

/// One entry as it appears in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedEntry {
    pub index: usize,
    #[serde(flatten)]
    pub status: EntryStatus,
    /// The parsed record, when the line parsed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub record: Option<Record>,
    /// The raw text of a line that did not parse.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub raw: Option<String>,
}

/// A display-ready snapshot of the whole chain with verification status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub export_id: uuid::Uuid,
    pub exported_at: DateTime<Utc>,
    /// Digest algorithm identifier, fixed for the lifetime of a log.
    pub digest_algorithm: String,
    pub genesis_hash: String,
    pub status: ChainStatus,
    pub total_entries: usize,
    pub first_entry_at: Option<DateTime<Utc>>,
    pub last_entry_at: Option<DateTime<Utc>>,
    /// `entry_hash` of the final parsed entry, if any.
    pub terminal_hash: Option<String>,
    pub findings: Vec<Finding>,
    pub entries: Vec<ExportedEntry>,
}

/// First 16 hex chars of a digest, for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
