//! Persisted draw results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved draw: the settings it was run with and the report it produced.
///
/// `settings` and `results` are stored verbatim as JSON; the draw id doubles
/// as the external handle, defaulting to the save time in epoch millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDraw {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub settings: serde_json::Value,
    pub results: serde_json::Value,
}
