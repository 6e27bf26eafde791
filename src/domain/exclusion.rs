//! Exclusion registry entries.

use crate::domain::Wallet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default reason recorded when an exclusion is added without one.
pub const DEFAULT_EXCLUSION_REASON: &str = "Excluded from drawing";

/// A wallet barred from the draw, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionEntry {
    /// Excluded wallet; unique key.
    pub wallet: Wallet,
    /// Why it is excluded.
    pub reason: String,
    /// When the exclusion was recorded.
    pub created_at: DateTime<Utc>,
}

impl ExclusionEntry {
    /// Create an entry timestamped now, substituting the default reason when
    /// none is given.
    pub fn new(wallet: Wallet, reason: Option<String>) -> Self {
        ExclusionEntry {
            wallet,
            reason: reason.unwrap_or_else(|| DEFAULT_EXCLUSION_REASON.to_string()),
            created_at: Utc::now(),
        }
    }
}
