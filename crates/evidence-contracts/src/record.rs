//! The chain record and its stored form.
//!
//! `Record` is the unit of the hash chain. It is only ever produced by the
//! append path in `evidence-core`; callers never assemble one and insert it.
//! `StoredEntry` is what a store hands back when scanning: either a record
//! that parsed cleanly or the raw text of a line that did not.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{category::Category, payload::Payload};

/// One entry in the evidence chain.
///
/// Field order here is the field order of a stored JSON line. It does not
/// affect hashing; the canonical hash input has its own fixed layout.
///
/// Unknown fields are rejected when parsing, so a line with extra keys
/// spliced in is reported as malformed rather than silently accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Position in the chain, starting at 0, gapless.
    pub sequence_index: u64,

    /// Append time (UTC, microsecond precision).
    #[serde(with = "canonical_time")]
    pub timestamp: DateTime<Utc>,

    /// What kind of evidence this is.
    pub category: Category,

    /// Free text supplied by the caller. Never inspected.
    pub description: String,

    /// Structured data supplied by the caller. Never inspected.
    pub payload: Payload,

    /// `entry_hash` of the preceding record, or the genesis hash.
    pub previous_hash: String,

    /// SHA-256 (hex) over the canonical form of every field above.
    pub entry_hash: String,
}

/// A single item read back from durable storage.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntry {
    /// The line parsed into a well-formed record.
    Record(Record),

    /// The line could not be parsed: truncated write, hand edit, or garbage.
    Malformed {
        /// 1-based line number in the backing file (or position + 1).
        line: usize,
        /// The raw text as read.
        raw: String,
        /// Why parsing failed.
        error: String,
    },
}

impl StoredEntry {
    /// The record, if this entry parsed.
    pub fn record(&self) -> Option<&Record> {
        match self {
            StoredEntry::Record(r) => Some(r),
            StoredEntry::Malformed { .. } => None,
        }
    }
}

/// Format a timestamp the one way the chain accepts:
/// RFC 3339, UTC, six fractional digits, `Z` suffix.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter that writes and accepts only the canonical timestamp form.
///
/// A stored timestamp that parses but does not re-format to exactly the same
/// text (extra precision, a `+00:00` offset, another zone) is rejected.
/// Otherwise two different stored texts could hash identically.
mod canonical_time {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&canonical_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map_err(serde::de::Error::custom)?
            .with_timezone(&Utc);
        if canonical_timestamp(&parsed) != raw {
            return Err(serde::de::Error::custom(format!(
                "timestamp '{}' is not in canonical form",
                raw
            )));
        }
        Ok(parsed)
    }
}
