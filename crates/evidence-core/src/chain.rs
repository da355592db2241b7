//! Hash-chain primitives: canonical serialization, hashing, and chain
//! verification.
//!
//! Hash input is the compact JSON encoding (no insignificant whitespace) of
//! an object with exactly these keys, in this order:
//!
//!   1. `category`        kebab-case name, e.g. `"device-state-capture"`
//!   2. `description`     caller text
//!   3. `payload`         key-sorted map (BTreeMap order, byte-wise)
//!   4. `previous_hash`   64 lowercase hex chars
//!   5. `sequence_index`  JSON integer
//!   6. `timestamp`       RFC 3339, UTC, six fractional digits, `Z` suffix
//!
//! Scalars inside `description` and `payload` have one spelling each:
//!
//! - **Integers** (values written as integers) are plain decimal, with a
//!   leading `-` only when negative: `42`, `-7`.
//! - **Floats** use the shortest digit string `d` (length `n`) that
//!   round-trips the IEEE-754 double. With the value written `0.d × 10^kk`:
//!   - `n <= kk <= 16`: digits, `kk - n` zeros, then `.0` (`1.0`, `1200.0`)
//!   - `0 < kk < n` (and `kk <= 16`): point inside the digits (`1.5`)
//!   - `-5 < kk <= 0`: `0.`, `-kk` zeros, digits (`0.0001`)
//!   - otherwise exponent form `d1[.rest]e<kk-1>` with no `+` sign
//!     (`1e16`, `1e-7`, `1.5e300`)
//!
//!   `-0.0` keeps its sign. Non-finite floats never reach a payload
//!   (they become `null`).
//! - **Strings** are UTF-8 in double quotes. `"` and `\` are escaped
//!   with a backslash. U+0008, U+0009, U+000A, U+000C and U+000D become
//!   `\b \t \n \f \r`. Every other code point below U+0020 becomes
//!   `\u00xx` with lowercase hex. Everything else, including `/`, U+007F
//!   and all non-ASCII text, is emitted as raw UTF-8.
//!
//! These are the rules `serde_json` follows when writing, so the stored
//! line and the hash input agree byte for byte.
//!
//! `entry_hash` is the lowercase hex SHA-256 of those bytes. Two
//! implementations fed the same appends produce identical hashes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use evidence_contracts::{
    canonical_timestamp, BreakReason, Category, ChainStatus, Finding, Payload, Record,
    StoredEntry, VerificationReport, VerifyMode,
};

/// Public seed string whose SHA-256 is the genesis `previous_hash`.
pub const GENESIS_SEED: &str = "GENESIS";

/// Identifier of the digest algorithm. Fixed for the lifetime of a log.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// The `previous_hash` of record 0: SHA-256 of `GENESIS_SEED`, hex encoded.
pub fn genesis_hash() -> String {
    hex::encode(Sha256::digest(GENESIS_SEED.as_bytes()))
}

/// Field layout of the hash input. Declaration order is the emitted key
/// order and must stay lexicographic.
#[derive(Serialize)]
struct CanonicalRecord<'a> {
    category: &'a str,
    description: &'a str,
    payload: &'a Payload,
    previous_hash: &'a str,
    sequence_index: u64,
    timestamp: String,
}

/// Produce the canonical bytes hashed for one record.
///
/// # Panics
///
/// Panics if the payload cannot be serialized to JSON, which cannot happen:
/// every `PayloadValue` has a JSON form and all map keys are strings.
pub fn canonical_bytes(
    sequence_index: u64,
    timestamp: &DateTime<Utc>,
    category: Category,
    description: &str,
    payload: &Payload,
    previous_hash: &str,
) -> Vec<u8> {
    let canonical = CanonicalRecord {
        category: category.as_str(),
        description,
        payload,
        previous_hash,
        sequence_index,
        timestamp: canonical_timestamp(timestamp),
    };
    serde_json::to_vec(&canonical).expect("canonical record must always be serializable to JSON")
}

/// Compute the `entry_hash` for the given field values.
pub fn hash_record(
    sequence_index: u64,
    timestamp: &DateTime<Utc>,
    category: Category,
    description: &str,
    payload: &Payload,
    previous_hash: &str,
) -> String {
    let bytes = canonical_bytes(
        sequence_index,
        timestamp,
        category,
        description,
        payload,
        previous_hash,
    );
    hex::encode(Sha256::digest(&bytes))
}

/// Recompute a stored record's hash from its own fields.
pub fn recompute_hash(record: &Record) -> String {
    hash_record(
        record.sequence_index,
        &record.timestamp,
        record.category,
        &record.description,
        &record.payload,
        &record.previous_hash,
    )
}

/// Walk `entries` in order and check every digest and link.
///
/// Per entry:
///
/// 1. **Parse**: a malformed line is a break.
/// 2. **Sequence**: `sequence_index` must be the next expected value.
/// 3. **Linkage**: `previous_hash` must equal the prior entry's stored
///    `entry_hash`, or the genesis hash at position 0.
/// 4. **Digest**: `entry_hash` must equal the recomputed hash.
/// 5. **Time**: the timestamp must not be earlier than the prior entry's.
///
/// An entry repeating the previous entry's `sequence_index` and
/// `previous_hash` is a fork; the first of the pair stays canonical.
///
/// In `FullScan` mode, expectations re-sync to each stored record after a
/// finding, so each downstream finding reflects damage to that entry itself
/// rather than the cascade from the first break. `FailFast` stops at the
/// first finding. Either way `status` is `BrokenAt` the first finding.
pub fn verify_entries(entries: &[StoredEntry], mode: VerifyMode) -> VerificationReport {
    debug!(entries = entries.len(), ?mode, "verifying evidence chain");

    let mut expected_sequence: u64 = 0;
    let mut expected_prev: Option<String> = Some(genesis_hash());
    let mut prev_record: Option<&Record> = None;
    let mut findings: Vec<Finding> = Vec::new();
    let mut entries_checked = 0;

    for (index, entry) in entries.iter().enumerate() {
        entries_checked += 1;
        let mut reasons = Vec::new();

        let sequence_index = match entry {
            StoredEntry::Malformed { line, error, .. } => {
                warn!(index, line, error = %error, "malformed evidence entry");
                reasons.push(BreakReason::Malformed {
                    error: error.clone(),
                });
                // The lost entry presumably held the next sequence slot; its
                // hash is unknowable, so the next link cannot be checked.
                expected_sequence = expected_sequence.saturating_add(1);
                expected_prev = None;
                prev_record = None;
                None
            }
            StoredEntry::Record(record) => {
                let is_fork = prev_record.is_some_and(|prev| {
                    prev.sequence_index == record.sequence_index
                        && prev.previous_hash == record.previous_hash
                });

                if is_fork {
                    reasons.push(BreakReason::Fork {
                        sequence_index: record.sequence_index,
                    });
                } else {
                    if record.sequence_index != expected_sequence {
                        reasons.push(BreakReason::SequenceGap {
                            expected: expected_sequence,
                            found: record.sequence_index,
                        });
                    }
                    if let Some(expected) = &expected_prev {
                        if &record.previous_hash != expected {
                            reasons.push(BreakReason::LinkageMismatch {
                                expected: expected.clone(),
                                found: record.previous_hash.clone(),
                            });
                        }
                    }
                }

                let recomputed = recompute_hash(record);
                if recomputed != record.entry_hash {
                    reasons.push(BreakReason::DigestMismatch {
                        stored: record.entry_hash.clone(),
                        recomputed,
                    });
                }

                if let Some(prev) = prev_record {
                    if record.timestamp < prev.timestamp {
                        reasons.push(BreakReason::TimestampRegression {
                            previous: prev.timestamp,
                            found: record.timestamp,
                        });
                    }
                }

                // A fork's second branch never becomes the reference point.
                if !is_fork {
                    expected_sequence = record.sequence_index.saturating_add(1);
                    expected_prev = Some(record.entry_hash.clone());
                    prev_record = Some(record);
                }

                Some(record.sequence_index)
            }
        };

        if !reasons.is_empty() {
            warn!(index, ?sequence_index, reasons = reasons.len(), "chain break detected");
            findings.push(Finding {
                index,
                sequence_index,
                reasons,
            });
            if mode == VerifyMode::FailFast {
                break;
            }
        }
    }

    let status = match findings.first() {
        None => ChainStatus::Intact,
        Some(f) => ChainStatus::BrokenAt { index: f.index },
    };

    let intact_prefix = match status {
        ChainStatus::Intact => entries.len(),
        ChainStatus::BrokenAt { index } => index,
    };
    let last_intact_hash = intact_prefix
        .checked_sub(1)
        .and_then(|i| entries[i].record())
        .map(|r| r.entry_hash.clone());

    info!(
        %status,
        entries = entries.len(),
        findings = findings.len(),
        "evidence chain verified"
    );

    VerificationReport {
        status,
        mode,
        entries_checked,
        total_entries: entries.len(),
        findings,
        last_intact_hash,
    }
}
