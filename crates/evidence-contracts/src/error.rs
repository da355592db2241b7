//! Error types for the evidence chain.
//!
//! All fallible operations return `EvidenceResult<T>`. Chain breaks found by
//! verification are data (`VerificationReport`), not errors; the
//! `ChainIntegrity` variant exists for callers that choose to escalate a
//! broken report into a hard failure.

use thiserror::Error;

/// The unified error type for the evidence chain crates.
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// Input to an append was malformed, e.g. an unrecognized category.
    ///
    /// The log is untouched; the caller must correct the input and retry.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The durable medium could not be opened, read, locked, or written.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// A value could not be encoded to or decoded from its wire form.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Verification found a linkage or digest break.
    #[error("chain integrity broken at index {index}: {reason}")]
    ChainIntegrity { index: usize, reason: String },
}

impl EvidenceError {
    /// Shorthand for a `Storage` error with context.
    pub fn storage(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            reason: format!("{}: {}", context, err),
        }
    }
}

impl From<serde_json::Error> for EvidenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the evidence crates.
pub type EvidenceResult<T> = Result<T, EvidenceError>;
