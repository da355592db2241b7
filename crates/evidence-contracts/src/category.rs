//! The fixed set of evidence categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvidenceError;

/// What kind of evidence a record holds.
///
/// The set is closed: anything outside it is rejected at append time, and a
/// stored line carrying an unknown category fails to parse during
/// verification.
///
/// Wire form is kebab-case:
/// ```text
/// "observation" | "device-state-capture" | "forensic-collection" | "anomaly"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// A first-hand observation written down by the operator.
    Observation,
    /// A snapshot of host or device metadata.
    DeviceStateCapture,
    /// A reference to an external forensic collection.
    ForensicCollection,
    /// Something unexpected noticed on a device or account.
    Anomaly,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Observation,
        Category::DeviceStateCapture,
        Category::ForensicCollection,
        Category::Anomaly,
    ];

    /// The kebab-case wire name. This is also the form fed to the digest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Observation => "observation",
            Category::DeviceStateCapture => "device-state-capture",
            Category::ForensicCollection => "forensic-collection",
            Category::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EvidenceError;

    /// Parse a wire name. Matching is exact; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| EvidenceError::Validation {
                reason: format!(
                    "unrecognized category '{}' (expected one of: {})",
                    s,
                    Category::ALL
                        .iter()
                        .map(Category::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}
