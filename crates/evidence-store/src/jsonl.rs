//! JSON Lines implementation of `ChainStore`.
//!
//! One record per line, appended and never rewritten. Appends hold an
//! exclusive `fs2` lock on a sibling `<file>.lock` across the tail read and
//! the write; scans hold a shared lock on the same file, so a scan never
//! observes an append half-way through.
//!
//! A line that does not parse (truncated write, hand edit, invalid UTF-8),
//! or that parses but is not byte-for-byte the form this store writes,
//! comes back as `StoredEntry::Malformed`. Verification treats it as a break;
//! appending after it is refused.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use tracing::{debug, warn};

use evidence_contracts::{EvidenceError, EvidenceResult, Record, StoredEntry};
use evidence_core::ChainStore;

/// Default file name of the chain inside its log directory.
pub const DEFAULT_FILE_NAME: &str = "evidence_chain.jsonl";

/// A durable chain stored as JSON Lines on the local filesystem.
#[derive(Debug)]
pub struct JsonlChainStore {
    path: PathBuf,
    lock_path: PathBuf,
    fsync: bool,
    /// Serializes appends from handles in this process before the file lock
    /// is even attempted.
    writer: Mutex<()>,
}

impl JsonlChainStore {
    /// Open (without creating) the chain file at `path`.
    ///
    /// The file and its parent directory are created lazily by the first
    /// append. `fsync` after each append is on by default.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceError::Config` if `path` has no file name component.
    pub fn open(path: impl Into<PathBuf>) -> EvidenceResult<Self> {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .ok_or_else(|| EvidenceError::Config {
                reason: format!("chain path '{}' has no file name", path.display()),
            })?
            .to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);

        Ok(Self {
            path,
            lock_path,
            fsync: true,
            writer: Mutex::new(()),
        })
    }

    /// Open `<dir>/<file_name>`.
    pub fn in_dir(dir: impl AsRef<Path>, file_name: &str) -> EvidenceResult<Self> {
        Self::open(dir.as_ref().join(file_name))
    }

    /// Whether to `fsync` the data file after each append.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Path of the chain file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every line. The flag reports whether the file is
    /// non-empty and lacks a trailing newline.
    fn load(&self) -> EvidenceResult<(Vec<StoredEntry>, bool)> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Vec::new(), false)),
            Err(e) => {
                return Err(EvidenceError::storage(
                    format!("failed to read chain file '{}'", self.path.display()),
                    e,
                ))
            }
        };

        let needs_separator = !bytes.is_empty() && !bytes.ends_with(b"\n");
        Ok((parse_lines(&bytes), needs_separator))
    }

    /// Open (creating if needed) the sibling lock file and its directory.
    fn open_lock_file(&self) -> EvidenceResult<File> {
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EvidenceError::storage(
                        format!("failed to create log directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }

        OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| EvidenceError::storage("failed to open lock file", e))
    }

    fn lock_exclusive(&self) -> EvidenceResult<LockGuard> {
        let file = self.open_lock_file()?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| EvidenceError::storage("failed to acquire exclusive file lock", e))?;
        Ok(LockGuard(file))
    }

    /// Shared lock for scans. The lock file is created here too, so a scan
    /// racing the very first append still waits for that append to finish.
    fn lock_shared(&self) -> EvidenceResult<LockGuard> {
        let file = self.open_lock_file()?;
        FileExt::lock_shared(&file)
            .map_err(|e| EvidenceError::storage("failed to acquire shared file lock", e))?;
        Ok(LockGuard(file))
    }
}

impl ChainStore for JsonlChainStore {
    fn append_with(
        &self,
        build: &mut dyn FnMut(Option<&Record>) -> EvidenceResult<Record>,
    ) -> EvidenceResult<Record> {
        let _writer = self.writer.lock().map_err(|e| EvidenceError::Storage {
            reason: format!("chain writer lock poisoned: {}", e),
        })?;
        let _lock = self.lock_exclusive()?;

        let (entries, needs_separator) = self.load()?;
        let tail = match entries.last() {
            None => None,
            Some(StoredEntry::Record(r)) => Some(r),
            Some(StoredEntry::Malformed { line, error, .. }) => {
                warn!(
                    path = %self.path.display(),
                    line,
                    error = %error,
                    "refusing to extend chain with unreadable tail"
                );
                return Err(EvidenceError::Storage {
                    reason: format!(
                        "tail entry at line {} of '{}' is unreadable; the chain cannot be extended",
                        line,
                        self.path.display()
                    ),
                });
            }
        };

        let record = build(tail)?;

        let mut buf = Vec::new();
        if needs_separator {
            buf.push(b'\n');
        }
        serde_json::to_writer(&mut buf, &record)?;
        buf.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                EvidenceError::storage(
                    format!("failed to open chain file '{}'", self.path.display()),
                    e,
                )
            })?;
        file.write_all(&buf)
            .map_err(|e| EvidenceError::storage("failed to append record", e))?;
        if self.fsync {
            file.sync_data()
                .map_err(|e| EvidenceError::storage("failed to sync chain file", e))?;
        }

        debug!(
            path = %self.path.display(),
            sequence_index = record.sequence_index,
            bytes = buf.len(),
            "appended record to chain file"
        );

        Ok(record)
    }

    fn scan(&self) -> EvidenceResult<Vec<StoredEntry>> {
        let _lock = self.lock_shared()?;
        let (entries, _) = self.load()?;
        Ok(entries)
    }
}

/// Parse raw file bytes into entries. Blank lines are skipped; line numbers
/// are 1-based positions in the file. A line must re-serialize to exactly
/// its stored bytes to count as a record.
pub fn parse_lines(bytes: &[u8]) -> Vec<StoredEntry> {
    bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, raw)| !raw.iter().all(u8::is_ascii_whitespace))
        .map(|(i, raw)| parse_line(i + 1, raw))
        .collect()
}

fn parse_line(line: usize, raw: &[u8]) -> StoredEntry {
    let text = match std::str::from_utf8(raw) {
        Ok(t) => t,
        Err(e) => {
            return StoredEntry::Malformed {
                line,
                raw: String::from_utf8_lossy(raw).into_owned(),
                error: format!("invalid UTF-8: {}", e),
            }
        }
    };
    let malformed = |error: String| StoredEntry::Malformed {
        line,
        raw: text.to_string(),
        error,
    };

    let record = match serde_json::from_str::<Record>(text) {
        Ok(record) => record,
        Err(e) => return malformed(e.to_string()),
    };

    // Different spellings of the same values parse to the same record; only
    // the exact written form counts.
    match serde_json::to_string(&record) {
        Ok(canonical) if canonical == text => StoredEntry::Record(record),
        Ok(_) => malformed("non-canonical stored form".to_string()),
        Err(e) => malformed(e.to_string()),
    }
}

/// Holds an `fs2` lock until dropped.
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            warn!(error = %e, "failed to release chain file lock");
        }
    }
}
