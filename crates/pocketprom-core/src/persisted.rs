//! Durable counter subset and its JSON document.
//!
//! The on-disk document is decoded leniently into [`PersistedDocument`]
//! (missing keys, negative counters) and then normalized into
//! [`PersistedCounters`], which is what the store and the save path use.

use serde::{Deserialize, Serialize};

use crate::error::{PocketPromError, Result};

/// Counters that survive a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCounters {
    pub joins: u64,
    pub quits: u64,
    /// Ping of the most recent join; `null` until the first join ever.
    pub last_join_ping: Option<i64>,
}

impl PersistedCounters {
    /// Canonical pretty-printed JSON payload.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PocketPromError::Persistence(format!("encode failed: {e}")))
    }
}

/// Raw document as found on disk, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistedDocument {
    #[serde(default)]
    pub joins: Option<i64>,
    #[serde(default)]
    pub quits: Option<i64>,
    #[serde(default)]
    pub last_join_ping: Option<i64>,
}

impl PersistedDocument {
    /// Decode a document. Anything that is not an object with integer (or
    /// null) values is an error; callers treat that as "no prior state".
    pub fn decode(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| PocketPromError::Persistence(format!("invalid json: {e}")))?;
        // Derived struct impls also accept positional arrays; only a map is a document.
        if !value.is_object() {
            return Err(PocketPromError::Persistence("document is not a JSON object".into()));
        }
        serde_json::from_value(value)
            .map_err(|e| PocketPromError::Persistence(format!("invalid document: {e}")))
    }
}

impl From<PersistedDocument> for PersistedCounters {
    fn from(doc: PersistedDocument) -> Self {
        Self {
            joins: clamp_counter(doc.joins),
            quits: clamp_counter(doc.quits),
            last_join_ping: doc.last_join_ping,
        }
    }
}

fn clamp_counter(v: Option<i64>) -> u64 {
    v.map_or(0, |n| u64::try_from(n).unwrap_or(0))
}
