//! Evidence chain command-line front-end.
//!
//! Appends observations and host snapshots to the tamper-evident chain,
//! verifies it, and exports it for downstream templating.
//!
//! Usage:
//!   evidence log "Screen flickered during call" --attach screenshot.png
//!   evidence capture --note "before firmware update"
//!   evidence verify
//!   evidence export --format text
//!   evidence timeline

mod capture;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use evidence_config::{EvidenceConfig, ExportFormat};
use evidence_contracts::{
    payload_from_json, short_hash, Category, EvidenceError, EvidenceResult, VerifyMode,
};
use evidence_core::{genesis_hash, EvidenceLog};
use evidence_export::{render_timeline, write_export};
use evidence_store::{attach_files, JsonlChainStore};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tamper-evident evidence log.
///
/// Every entry is chained to the one before it by SHA-256, so any later edit
/// to a stored entry is detected by `verify`.
#[derive(Parser)]
#[command(
    name = "evidence",
    version,
    about = "Tamper-evident, SHA-256 hash-chained evidence log",
    long_about = "Appends timestamped evidence records to an append-only hash chain,\n\
                  verifies chain integrity, and exports the chain with per-record status."
)]
struct Cli {
    /// Path to a TOML config file (default: ./evidence.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory holding the chain file.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record an observation (or another category) with optional data and attachments.
    Log {
        /// Free-text description.
        #[arg(required = true)]
        description: Vec<String>,

        /// observation | device-state-capture | forensic-collection | anomaly
        #[arg(long, default_value = "observation")]
        category: String,

        /// Structured data as a JSON object.
        #[arg(long)]
        data: Option<String>,

        /// Files to hash and reference from the record.
        #[arg(long = "attach")]
        attach: Vec<PathBuf>,
    },
    /// Record a snapshot of host metadata as a device-state-capture entry.
    Capture {
        /// Description for the entry.
        #[arg(long)]
        note: Option<String>,
    },
    /// Verify chain integrity. Exits with status 2 if the chain is broken.
    Verify {
        /// Stop at the first break instead of scanning the whole chain.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Write the chain with verification status to a file.
    Export {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Output path (default from config).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Refuse to export a broken chain.
        #[arg(long)]
        require_intact: bool,
    },
    /// Print the plain-text timeline to stdout.
    Timeline,
    /// Print the genesis hash that seeds every chain.
    Genesis,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Text => ExportFormat::Text,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("evidence: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> EvidenceResult<i32> {
    let mut config = EvidenceConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.log_dir {
        config.log.dir = dir;
    }
    debug!(chain = %config.chain_path().display(), "resolved chain path");

    match cli.command {
        Command::Log {
            description,
            category,
            data,
            attach,
        } => run_log(&config, &category, &description.join(" "), data.as_deref(), &attach),
        Command::Capture { note } => run_capture(&config, note),
        Command::Verify { fail_fast } => run_verify(&config, fail_fast),
        Command::Export {
            format,
            output,
            require_intact,
        } => run_export(&config, format.map(Into::into), output, require_intact),
        Command::Timeline => {
            print!("{}", render_timeline(&open_log(&config)?.export()?));
            Ok(0)
        }
        Command::Genesis => {
            println!("{}", genesis_hash());
            Ok(0)
        }
    }
}

fn open_log(config: &EvidenceConfig) -> EvidenceResult<EvidenceLog<JsonlChainStore>> {
    let store = JsonlChainStore::open(config.chain_path())?.with_fsync(config.log.fsync);
    Ok(EvidenceLog::new(store))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_log(
    config: &EvidenceConfig,
    category: &str,
    description: &str,
    data: Option<&str>,
    attach: &[PathBuf],
) -> EvidenceResult<i32> {
    // Validate everything before touching the chain.
    let category: Category = category.parse()?;
    let mut payload = match data {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).map_err(|e| EvidenceError::Validation {
                    reason: format!("--data is not valid JSON: {}", e),
                })?;
            payload_from_json(value)
        }
        None => Default::default(),
    };
    attach_files(&mut payload, attach)?;

    let record = open_log(config)?.append(category, description, payload)?;
    println!(
        "[{}] Logged #{}: {}",
        record.timestamp.to_rfc3339(),
        record.sequence_index,
        record.category
    );
    println!("Entry hash: {}", record.entry_hash);
    Ok(0)
}

fn run_capture(config: &EvidenceConfig, note: Option<String>) -> EvidenceResult<i32> {
    println!("Capturing device state...");
    let payload = capture::host_snapshot();
    let description = note.unwrap_or_else(|| "Device state capture".to_string());

    let record = open_log(config)?.append(Category::DeviceStateCapture, description, payload)?;
    println!("State captured as #{}.", record.sequence_index);
    println!("Entry hash: {}", record.entry_hash);
    Ok(0)
}

fn run_verify(config: &EvidenceConfig, fail_fast: bool) -> EvidenceResult<i32> {
    let mode = if fail_fast {
        VerifyMode::FailFast
    } else {
        config.verify.mode
    };

    println!("Verifying evidence chain integrity...");
    let report = open_log(config)?.verify(mode)?;

    println!("Entries: {}", report.total_entries);
    println!("Chain integrity: {}", report.status);
    if let Some(hash) = &report.last_intact_hash {
        println!("Last intact hash: {}", hash);
    }
    for finding in &report.findings {
        for reason in &finding.reasons {
            println!("  - position {}: {}", finding.index, reason);
        }
    }

    Ok(if report.is_intact() { 0 } else { 2 })
}

fn run_export(
    config: &EvidenceConfig,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    require_intact: bool,
) -> EvidenceResult<i32> {
    let report = open_log(config)?.export()?;

    if require_intact {
        if let Some(finding) = report.findings.first() {
            let reason = finding
                .reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EvidenceError::ChainIntegrity {
                index: finding.index,
                reason,
            });
        }
    }

    let format = format.unwrap_or(config.export.format);
    let path = output.unwrap_or_else(|| config.export_path(format));
    write_export(&report, format, &path)?;

    println!(
        "Exported {} entries to {}",
        report.total_entries,
        path.display()
    );
    println!("Chain integrity: {}", report.status);
    if let Some(hash) = &report.terminal_hash {
        println!("Terminal hash: {}...", short_hash(hash));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_command_parses_attachments() {
        let cli = Cli::try_parse_from([
            "evidence", "log", "saw", "it", "--attach", "a.png", "--attach", "b.png",
        ])
        .unwrap();
        match cli.command {
            Command::Log {
                description,
                category,
                attach,
                ..
            } => {
                assert_eq!(description.join(" "), "saw it");
                assert_eq!(category, "observation");
                assert_eq!(attach.len(), 2);
            }
            _ => panic!("expected log command"),
        }
    }

    #[test]
    fn log_rejects_unknown_category_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EvidenceConfig::default();
        config.log.dir = dir.path().join("logs");
        config.log.fsync = false;

        let err = run_log(&config, "NOT_A_CATEGORY", "x", None, &[]).unwrap_err();
        assert!(matches!(err, EvidenceError::Validation { .. }));
        assert!(!config.chain_path().exists());
    }

    #[test]
    fn log_then_verify_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EvidenceConfig::default();
        config.log.dir = dir.path().join("logs");
        config.log.fsync = false;

        assert_eq!(
            run_log(&config, "anomaly", "odd", Some(r#"{"k": [1, 2]}"#), &[]).unwrap(),
            0
        );
        assert_eq!(run_capture(&config, None).unwrap(), 0);
        assert_eq!(run_verify(&config, false).unwrap(), 0);

        let out = dir.path().join("out.txt");
        assert_eq!(
            run_export(&config, Some(ExportFormat::Text), Some(out.clone()), true).unwrap(),
            0
        );
        assert!(std::fs::read_to_string(out).unwrap().contains("Category: anomaly"));
    }

    #[test]
    fn invalid_data_json_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EvidenceConfig::default();
        config.log.dir = dir.path().to_path_buf();

        let err = run_log(&config, "observation", "x", Some("{nope"), &[]).unwrap_err();
        assert!(matches!(err, EvidenceError::Validation { .. }));
    }
}
