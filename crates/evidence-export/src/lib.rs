//! # evidence-export
//!
//! Display renderings of a verified evidence chain for downstream
//! templating.
//!
//! - [`render::render_json`]: the full `ExportReport` as pretty JSON
//! - [`render::render_timeline`]: a plain-text chronological timeline
//! - [`writer::write_export`]: render and write to a file
//!
//! Both renderings are derived purely from `EvidenceLog::export()`; nothing
//! here reads or writes the chain itself.

pub mod render;
pub mod writer;

pub use render::{render_json, render_timeline, status_label};
pub use writer::{render, write_export};

// ── Tests ─────────────────────────────────────────────────────────────────────
