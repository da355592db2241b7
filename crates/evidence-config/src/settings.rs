//! Configuration schema.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration.
//!
//! Example:
//! ```toml
//! [log]
//! dir = "evidence_logs"
//! file_name = "evidence_chain.jsonl"
//! fsync = true
//!
//! [verify]
//! mode = "full-scan"     # or "fail-fast"
//!
//! [export]
//! dir = "legal_output"
//! format = "json"        # or "text"
//! file_stem = "evidence_export"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use evidence_contracts::VerifyMode;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvidenceConfig {
    pub log: LogSettings,
    pub verify: VerifySettings,
    pub export: ExportSettings,
}

impl EvidenceConfig {
    /// Full path of the chain file.
    pub fn chain_path(&self) -> PathBuf {
        self.log.dir.join(&self.log.file_name)
    }

    /// Full path of an export file in the given format.
    pub fn export_path(&self, format: ExportFormat) -> PathBuf {
        self.export
            .dir
            .join(format!("{}.{}", self.export.file_stem, format.extension()))
    }
}

/// Where the chain lives and how it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Directory holding the chain file and its lock file.
    pub dir: PathBuf,
    /// Bare file name; must not contain path separators.
    pub file_name: String,
    /// `fsync` the chain file after every append.
    pub fsync: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("evidence_logs"),
            file_name: "evidence_chain.jsonl".to_string(),
            fsync: true,
        }
    }
}

/// How verification walks the chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifySettings {
    pub mode: VerifyMode,
}

/// Rendering of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Pretty-printed `ExportReport` JSON.
    #[default]
    Json,
    /// Plain-text chronological timeline.
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

/// Where exports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub format: ExportFormat,
    /// File name without extension.
    pub file_stem: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("legal_output"),
            format: ExportFormat::Json,
            file_stem: "evidence_export".to_string(),
        }
    }
}
