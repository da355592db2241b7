//! Renderings of an `ExportReport`.
//!
//! JSON is the structured form consumed by templating tools. The timeline is
//! a plain-text chronological listing for people: a header with chain
//! status, any findings, then one block per entry.

use std::fmt;

use evidence_contracts::{
    canonical_timestamp, short_hash, EntryStatus, EvidenceResult, ExportReport, ExportedEntry,
};

const RULE_HEAVY: &str = "============================================================";
const RULE_LIGHT: &str = "----------------------------------------";

/// Pretty-printed JSON of the whole report.
pub fn render_json(report: &ExportReport) -> EvidenceResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Plain-text timeline.
pub fn render_timeline(report: &ExportReport) -> String {
    Timeline(report).to_string()
}

/// Display adapter that writes the timeline for one report.
struct Timeline<'a>(&'a ExportReport);

impl fmt::Display for Timeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "EVIDENCE CHAIN TIMELINE")?;
        writeln!(f, "{}", RULE_HEAVY)?;
        writeln!(f)?;
        writeln!(f, "Generated: {}", canonical_timestamp(&report.exported_at))?;
        writeln!(f, "Export ID: {}", report.export_id)?;
        writeln!(f, "Chain status: {}", report.status)?;
        writeln!(f, "Digest algorithm: {}", report.digest_algorithm)?;
        writeln!(f, "Genesis hash: {}", report.genesis_hash)?;
        writeln!(f, "Entries: {}", report.total_entries)?;
        writeln!(f, "First entry: {}", optional_time(report.first_entry_at.as_ref()))?;
        writeln!(f, "Last entry: {}", optional_time(report.last_entry_at.as_ref()))?;
        writeln!(
            f,
            "Terminal hash: {}",
            report.terminal_hash.as_deref().unwrap_or("N/A")
        )?;
        writeln!(f)?;

        if !report.findings.is_empty() {
            writeln!(f, "FINDINGS")?;
            writeln!(f, "{}", RULE_LIGHT)?;
            for finding in &report.findings {
                let seq = finding
                    .sequence_index
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "?".to_string());
                for reason in &finding.reasons {
                    writeln!(
                        f,
                        "  [position {}, sequence {}] {}",
                        finding.index, seq, reason
                    )?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "CHRONOLOGICAL TIMELINE")?;
        writeln!(f, "{}", RULE_LIGHT)?;
        writeln!(f)?;

        for entry in &report.entries {
            write_entry(f, entry)?;
        }
        Ok(())
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &ExportedEntry) -> fmt::Result {
    match (&entry.record, &entry.raw) {
        (Some(record), _) => {
            writeln!(f, "[{}]", canonical_timestamp(&record.timestamp))?;
            writeln!(f, "  Sequence: {}", record.sequence_index)?;
            writeln!(f, "  Category: {}", record.category)?;
            writeln!(f, "  Description: {}", record.description)?;
            writeln!(f, "  Evidence Hash: {}...", short_hash(&record.entry_hash))?;
        }
        (None, raw) => {
            writeln!(f, "[position {}: unreadable entry]", entry.index)?;
            writeln!(f, "  Raw: {}", raw.as_deref().unwrap_or(""))?;
        }
    }
    writeln!(f, "  Status: {}", status_label(&entry.status))?;
    writeln!(f)
}

/// One-line label for an entry status.
pub fn status_label(status: &EntryStatus) -> String {
    match status {
        EntryStatus::Verified => "verified".to_string(),
        EntryStatus::Unverified => "unverified (after chain break)".to_string(),
        EntryStatus::Broken { reasons } => format!(
            "BROKEN ({})",
            reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

fn optional_time(ts: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    ts.map(canonical_timestamp).unwrap_or_else(|| "N/A".to_string())
}
