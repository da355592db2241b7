//! Loading `EvidenceConfig` from TOML.
//!
//! `from_toml_str` and `from_file` parse and validate. `load_or_default`
//! implements the lookup the CLI uses: an explicit path must exist; without
//! one, `evidence.toml` in the working directory is used if present, and the
//! built-in defaults otherwise.

use std::path::Path;

use tracing::debug;

use evidence_contracts::{EvidenceError, EvidenceResult};

use crate::settings::EvidenceConfig;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "evidence.toml";

impl EvidenceConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `EvidenceError::Config` if the TOML is malformed, has unknown
    /// keys, or fails validation.
    pub fn from_toml_str(s: &str) -> EvidenceResult<Self> {
        let config: EvidenceConfig = toml::from_str(s).map_err(|e| EvidenceError::Config {
            reason: format!("failed to parse evidence config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it.
    pub fn from_file(path: &Path) -> EvidenceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EvidenceError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), "loaded evidence config");
        Ok(config)
    }

    /// Load `path` if given, else `./evidence.toml` if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> EvidenceResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::from_file(fallback);
        }
        debug!("no config file found; using defaults");
        Ok(Self::default())
    }

    /// Reject values that would put the chain somewhere unexpected.
    pub fn validate(&self) -> EvidenceResult<()> {
        let name = &self.log.file_name;
        if name.is_empty() {
            return Err(EvidenceError::Config {
                reason: "log.file_name must not be empty".to_string(),
            });
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(EvidenceError::Config {
                reason: format!("log.file_name '{}' must be a bare file name", name),
            });
        }
        if self.export.file_stem.is_empty() {
            return Err(EvidenceError::Config {
                reason: "export.file_stem must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
