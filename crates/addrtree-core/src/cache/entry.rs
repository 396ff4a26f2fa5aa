use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk layout of a cache entry.
pub const CACHE_ENTRY_VERSION: u32 = 1;

fn default_version() -> u32 {
    CACHE_ENTRY_VERSION
}

/// A timestamped list of strings, stored as JSON.
///
/// Entries written before versioning carry only `data` and `timestamp` and
/// decode as version 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default = "default_version")]
    pub version: u32,
    pub data: Vec<String>,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(data: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_ENTRY_VERSION,
            data,
            timestamp: now.timestamp_millis(),
        }
    }

    /// Fresh while strictly younger than `ttl`. Timestamps in the future
    /// count as fresh; an age that overflows `i64` counts as stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.timestamp_millis()
            .checked_sub(self.timestamp)
            .is_some_and(|age| age < ttl.num_milliseconds())
    }
}
