//! # evidence-contracts
//!
//! Shared types for the tamper-evident evidence chain.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only data definitions, wire formats, and error types.

pub mod category;
pub mod error;
pub mod payload;
pub mod record;
pub mod report;

pub use category::Category;
pub use error::{EvidenceError, EvidenceResult};
pub use payload::{payload_from_json, Payload, PayloadValue};
pub use record::{canonical_timestamp, Record, StoredEntry};
pub use report::{
    short_hash, BreakReason, ChainStatus, EntryStatus, ExportReport, ExportedEntry, Finding,
    VerificationReport, VerifyMode,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn sample_record() -> Record {
        let mut payload = Payload::new();
        payload.insert("os".to_string(), "linux".into());
        Record {
            sequence_index: 3,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 19, 8, 15, 0).unwrap(),
            category: Category::DeviceStateCapture,
            description: "state".to_string(),
            payload,
            previous_hash: "a".repeat(64),
            entry_hash: "b".repeat(64),
        }
    }

    // ── Category ─────────────────────────────────────────────────────────────

    #[test]
    fn category_parses_every_wire_name() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(cat.as_str()).unwrap(), cat);
        }
    }

    #[test]
    fn category_rejects_unknown_name() {
        let err = Category::from_str("NOT_A_CATEGORY").unwrap_err();
        match err {
            EvidenceError::Validation { reason } => {
                assert!(reason.contains("NOT_A_CATEGORY"));
                assert!(reason.contains("observation"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn category_matching_is_case_sensitive() {
        assert!(Category::from_str("Observation").is_err());
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::DeviceStateCapture).unwrap();
        assert_eq!(json, "\"device-state-capture\"");
    }

    // ── PayloadValue ─────────────────────────────────────────────────────────

    #[test]
    fn payload_keys_serialize_sorted_regardless_of_insertion_order() {
        let mut a = Payload::new();
        a.insert("zeta".to_string(), 1u64.into());
        a.insert("alpha".to_string(), 2u64.into());

        let mut b = Payload::new();
        b.insert("alpha".to_string(), 2u64.into());
        b.insert("zeta".to_string(), 1u64.into());

        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
        assert_eq!(ja, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn payload_value_parses_nested_json() {
        let value: PayloadValue = serde_json::from_value(json!({
            "flag": true,
            "items": [1, "two", null],
            "nested": { "x": 1.5 }
        }))
        .unwrap();

        let map = value.as_map().unwrap();
        assert_eq!(map["flag"], PayloadValue::Bool(true));
        let items = map["items"].as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_str(), Some("two"));
        assert_eq!(items[2], PayloadValue::Null);
        assert!(map["nested"].as_map().unwrap().contains_key("x"));
    }

    #[test]
    fn payload_from_json_wraps_scalars() {
        let p = payload_from_json(json!("loose"));
        assert_eq!(p["value"].as_str(), Some("loose"));
        assert!(payload_from_json(json!(null)).is_empty());
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(PayloadValue::from(f64::NAN), PayloadValue::Null);
    }

    // ── Record wire form ─────────────────────────────────────────────────────

    #[test]
    fn record_timestamp_uses_canonical_form() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["timestamp"], "2026-10-19T08:15:00.000000Z");
    }

    #[test]
    fn record_round_trips_through_json_line() {
        let rec = sample_record();
        let line = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&line).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn record_rejects_non_canonical_timestamp() {
        let mut json = serde_json::to_value(sample_record()).unwrap();
        json["timestamp"] = json!("2026-10-19T08:15:00+00:00");
        assert!(serde_json::from_value::<Record>(json).is_err());
    }

    #[test]
    fn record_rejects_unknown_fields() {
        let mut json = serde_json::to_value(sample_record()).unwrap();
        json["injected"] = json!("extra");
        assert!(serde_json::from_value::<Record>(json).is_err());
    }

    #[test]
    fn record_rejects_unknown_category() {
        let mut json = serde_json::to_value(sample_record()).unwrap();
        json["category"] = json!("NOT_A_CATEGORY");
        assert!(serde_json::from_value::<Record>(json).is_err());
    }

    // ── Reports ──────────────────────────────────────────────────────────────

    #[test]
    fn chain_status_display() {
        assert_eq!(ChainStatus::Intact.to_string(), "INTACT");
        assert_eq!(ChainStatus::BrokenAt { index: 4 }.to_string(), "BROKEN-AT(4)");
    }

    #[test]
    fn verify_mode_defaults_to_full_scan() {
        assert_eq!(VerifyMode::default(), VerifyMode::FullScan);
    }

    #[test]
    fn break_reason_display_shortens_hashes() {
        let reason = BreakReason::DigestMismatch {
            stored: "c".repeat(64),
            recomputed: "d".repeat(64),
        };
        let msg = reason.to_string();
        assert!(msg.contains(&"c".repeat(16)));
        assert!(!msg.contains(&"c".repeat(17)));
    }

    #[test]
    fn exported_entry_flattens_status() {
        let entry = ExportedEntry {
            index: 0,
            status: EntryStatus::Verified,
            record: Some(sample_record()),
            raw: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "verified");
        assert!(json.get("raw").is_none());
    }

    // ── EvidenceError display messages ───────────────────────────────────────

    #[test]
    fn error_storage_display() {
        let err = EvidenceError::storage("failed to open log", "permission denied");
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn error_chain_integrity_display() {
        let err = EvidenceError::ChainIntegrity {
            index: 2,
            reason: "digest mismatch".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("index 2"));
        assert!(msg.contains("digest mismatch"));
    }
}
