//! File attachments referenced by digest.
//!
//! An attachment is never copied into the chain. Its SHA-256, size, and path
//! are recorded in the payload under `attachments`, so the reference is
//! covered by the record's `entry_hash` like any other payload content.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use evidence_contracts::{EvidenceError, EvidenceResult, Payload, PayloadValue};

/// Payload key under which attachments are listed.
pub const ATTACHMENTS_KEY: &str = "attachments";

/// A file referenced by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    /// Absolute path at the time of hashing.
    pub path: String,
    /// Lowercase hex SHA-256 of the file's bytes.
    pub sha256: String,
    pub size_bytes: u64,
}

impl Attachment {
    /// Hash the file at `path`.
    ///
    /// # Errors
    ///
    /// `EvidenceError::Validation` if the file does not exist,
    /// `EvidenceError::Storage` if it cannot be read.
    pub fn from_path(path: &Path) -> EvidenceResult<Self> {
        let absolute = std::fs::canonicalize(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                EvidenceError::Validation {
                    reason: format!("attachment '{}' does not exist", path.display()),
                }
            } else {
                EvidenceError::storage(format!("failed to resolve '{}'", path.display()), e)
            }
        })?;

        let mut file = File::open(&absolute)
            .map_err(|e| EvidenceError::storage(format!("failed to open '{}'", path.display()), e))?;

        let mut hasher = Sha256::new();
        let mut buf = [0u8; 8192];
        let mut size_bytes: u64 = 0;
        loop {
            let n = file
                .read(&mut buf)
                .map_err(|e| EvidenceError::storage(format!("failed to read '{}'", path.display()), e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            size_bytes += n as u64;
        }

        let attachment = Self {
            file_name: absolute
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: absolute.to_string_lossy().into_owned(),
            sha256: hex::encode(hasher.finalize()),
            size_bytes,
        };

        debug!(
            path = %attachment.path,
            sha256 = %attachment.sha256,
            size_bytes,
            "hashed attachment"
        );

        Ok(attachment)
    }

    /// Payload form: a map with `file_name`, `path`, `sha256`, `size_bytes`.
    pub fn to_payload_value(&self) -> PayloadValue {
        let mut map = Payload::new();
        map.insert("file_name".to_string(), self.file_name.clone().into());
        map.insert("path".to_string(), self.path.clone().into());
        map.insert("sha256".to_string(), self.sha256.clone().into());
        map.insert("size_bytes".to_string(), self.size_bytes.into());
        PayloadValue::Map(map)
    }
}

/// Hash every path and list the results under `attachments` in `payload`.
///
/// Existing entries under that key are replaced. An empty `paths` leaves the
/// payload untouched.
pub fn attach_files<P: AsRef<Path>>(payload: &mut Payload, paths: &[P]) -> EvidenceResult<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let attachments = paths
        .iter()
        .map(|p| Attachment::from_path(p.as_ref()).map(|a| a.to_payload_value()))
        .collect::<EvidenceResult<Vec<_>>>()?;
    payload.insert(ATTACHMENTS_KEY.to_string(), PayloadValue::List(attachments));
    Ok(())
}
