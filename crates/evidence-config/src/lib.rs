//! # evidence-config
//!
//! TOML configuration for the evidence chain tools: where the chain file
//! lives, how verification walks it, and where exports go.
//!
//! ```rust,ignore
//! use evidence_config::EvidenceConfig;
//!
//! let config = EvidenceConfig::load_or_default(None)?;
//! let store = JsonlChainStore::open(config.chain_path())?;
//! ```

pub mod loader;
pub mod settings;

pub use loader::DEFAULT_CONFIG_FILE;
pub use settings::{EvidenceConfig, ExportFormat, ExportSettings, LogSettings, VerifySettings};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use evidence_contracts::{EvidenceError, VerifyMode};

    use crate::{EvidenceConfig, ExportFormat};

    /// An empty document yields the defaults.
    #[test]
    fn test_empty_config_is_default() {
        let config = EvidenceConfig::from_toml_str("").unwrap();
        assert_eq!(config, EvidenceConfig::default());
        assert_eq!(
            config.chain_path(),
            PathBuf::from("evidence_logs").join("evidence_chain.jsonl")
        );
        assert!(config.log.fsync);
        assert_eq!(config.verify.mode, VerifyMode::FullScan);
        assert_eq!(config.export.format, ExportFormat::Json);
    }

    /// Every section can be overridden.
    #[test]
    fn test_full_config_parses() {
        let toml = r#"
            [log]
            dir = "/var/lib/evidence"
            file_name = "chain.jsonl"
            fsync = false

            [verify]
            mode = "fail-fast"

            [export]
            dir = "out"
            format = "text"
            file_stem = "timeline"
        "#;

        let config = EvidenceConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.chain_path(), Path::new("/var/lib/evidence/chain.jsonl"));
        assert!(!config.log.fsync);
        assert_eq!(config.verify.mode, VerifyMode::FailFast);
        assert_eq!(
            config.export_path(ExportFormat::Text),
            Path::new("out").join("timeline.txt")
        );
    }

    /// A partial section keeps defaults for missing keys.
    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = EvidenceConfig::from_toml_str("[log]\nfsync = false\n").unwrap();
        assert_eq!(config.log.file_name, "evidence_chain.jsonl");
        assert!(!config.log.fsync);
    }

    /// Misspelled keys are rejected rather than silently ignored.
    #[test]
    fn test_unknown_key_rejected() {
        let err = EvidenceConfig::from_toml_str("[log]\nfsnyc = false\n").unwrap_err();
        match err {
            EvidenceError::Config { reason } => assert!(reason.contains("failed to parse")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    /// An unknown verify mode is rejected.
    #[test]
    fn test_unknown_verify_mode_rejected() {
        assert!(EvidenceConfig::from_toml_str("[verify]\nmode = \"sometimes\"\n").is_err());
    }

    /// `file_name` must not smuggle in a directory.
    #[test]
    fn test_file_name_with_separator_rejected() {
        let err = EvidenceConfig::from_toml_str("[log]\nfile_name = \"../chain.jsonl\"\n")
            .unwrap_err();
        assert!(matches!(err, EvidenceError::Config { .. }));
    }

    #[test]
    fn test_empty_file_name_rejected() {
        assert!(EvidenceConfig::from_toml_str("[log]\nfile_name = \"\"\n").is_err());
    }

    /// Loading from a file on disk.
    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.toml");
        std::fs::write(&path, "[export]\nformat = \"text\"\n").unwrap();

        let config = EvidenceConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.export.format, ExportFormat::Text);
    }

    /// An explicit path that does not exist is an error, not a silent default.
    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EvidenceConfig::load_or_default(Some(&dir.path().join("absent.toml")))
            .unwrap_err();
        match err {
            EvidenceError::Config { reason } => assert!(reason.contains("failed to read")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
