//! Writing exports to disk.

use std::path::Path;

use tracing::info;

use evidence_config::ExportFormat;
use evidence_contracts::{EvidenceError, EvidenceResult, ExportReport};

use crate::render::{render_json, render_timeline};

/// Render `report` in `format`.
pub fn render(report: &ExportReport, format: ExportFormat) -> EvidenceResult<String> {
    match format {
        ExportFormat::Json => render_json(report),
        ExportFormat::Text => Ok(render_timeline(report)),
    }
}

/// Render `report` and write it to `path`, creating parent directories.
///
/// The source chain is never touched; exports are copies.
pub fn write_export(report: &ExportReport, format: ExportFormat, path: &Path) -> EvidenceResult<()> {
    let body = render(report, format)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EvidenceError::storage(
                    format!("failed to create export directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
    }

    std::fs::write(path, body).map_err(|e| {
        EvidenceError::storage(format!("failed to write export '{}'", path.display()), e)
    })?;

    info!(
        path = %path.display(),
        ?format,
        entries = report.total_entries,
        status = %report.status,
        "evidence export written"
    );

    Ok(())
}
