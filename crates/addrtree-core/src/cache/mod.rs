// ── Department cache ──
//
// A single timestamped entry per key over a pluggable key/value store.
// Every failure degrades to a cache miss; nothing here is fatal to a load.

mod entry;
mod store;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub use entry::{CACHE_ENTRY_VERSION, CacheEntry};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Key holding the sorted department list.
pub const DEPARTMENTS_CACHE_KEY: &str = "departments_cache";

/// How long a cached department list stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Expiring string-list cache.
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        self.get_at(key, Utc::now())
    }

    /// The cached list if present, decodable, current-version, and younger
    /// than the TTL at `now`. Stale or undecodable entries are deleted.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<String>> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "discarding undecodable cache entry");
                self.invalidate(key);
                return None;
            }
        };

        if entry.version != CACHE_ENTRY_VERSION {
            debug!(key, version = entry.version, "discarding cache entry with unknown version");
            self.invalidate(key);
            return None;
        }

        if !entry.is_fresh_at(now, self.ttl) {
            debug!(key, "cache entry expired");
            self.invalidate(key);
            return None;
        }

        Some(entry.data)
    }

    pub fn put(&self, key: &str, data: &[String]) {
        self.put_at(key, data, Utc::now());
    }

    /// Store `data` stamped with `now`. Failures are logged and swallowed.
    pub fn put_at(&self, key: &str, data: &[String], now: DateTime<Utc>) {
        let entry = CacheEntry::new(data.to_vec(), now);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache entry serialization failed");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &raw) {
            warn!(key, error = %e, "cache write failed");
        }
    }

    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, error = %e, "cache remove failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn setup() -> (Arc<MemoryStore>, CacheStore) {
        let backend = Arc::new(MemoryStore::new());
        let cache = CacheStore::new(backend.clone(), DEFAULT_CACHE_TTL);
        (backend, cache)
    }

    fn depts() -> Vec<String> {
        vec!["Engineering".into(), "Sales Japan".into()]
    }

    #[test]
    fn put_then_get_within_ttl() {
        let (_, cache) = setup();
        let now = Utc::now();
        cache.put_at(DEPARTMENTS_CACHE_KEY, &depts(), now);

        let later = now + chrono::Duration::hours(23);
        assert_eq!(cache.get_at(DEPARTMENTS_CACHE_KEY, later), Some(depts()));
    }

    #[test]
    fn expired_entry_is_purged() {
        let (backend, cache) = setup();
        let now = Utc::now();
        cache.put_at(DEPARTMENTS_CACHE_KEY, &depts(), now);

        let later = now + chrono::Duration::hours(24);
        assert_eq!(cache.get_at(DEPARTMENTS_CACHE_KEY, later), None);
        assert_eq!(backend.get(DEPARTMENTS_CACHE_KEY).unwrap(), None);
        // Still absent even when read back at the original time.
        assert_eq!(cache.get_at(DEPARTMENTS_CACHE_KEY, now), None);
    }

    #[test]
    fn malformed_entry_is_a_miss_and_removed() {
        let (backend, cache) = setup();
        backend.set(DEPARTMENTS_CACHE_KEY, "{not json").unwrap();

        assert_eq!(cache.get(DEPARTMENTS_CACHE_KEY), None);
        assert_eq!(backend.get(DEPARTMENTS_CACHE_KEY).unwrap(), None);
    }

    #[test]
    fn unversioned_blob_decodes_as_v1() {
        let (backend, cache) = setup();
        let now = Utc::now();
        backend
            .set(
                DEPARTMENTS_CACHE_KEY,
                &format!(r#"{{"data":["HR"],"timestamp":{}}}"#, now.timestamp_millis()),
            )
            .unwrap();

        assert_eq!(cache.get_at(DEPARTMENTS_CACHE_KEY, now), Some(vec!["HR".to_owned()]));
    }

    #[test]
    fn unknown_version_is_a_miss() {
        let (backend, cache) = setup();
        let now = Utc::now();
        backend
            .set(
                DEPARTMENTS_CACHE_KEY,
                &format!(r#"{{"version":7,"data":["HR"],"timestamp":{}}}"#, now.timestamp_millis()),
            )
            .unwrap();

        assert_eq!(cache.get_at(DEPARTMENTS_CACHE_KEY, now), None);
    }

    #[test]
    fn extreme_timestamp_is_a_miss_and_removed() {
        let (backend, cache) = setup();
        backend
            .set(
                DEPARTMENTS_CACHE_KEY,
                &format!(r#"{{"data":["HR"],"timestamp":{}}}"#, i64::MIN),
            )
            .unwrap();

        assert_eq!(cache.get(DEPARTMENTS_CACHE_KEY), None);
        assert_eq!(backend.get(DEPARTMENTS_CACHE_KEY).unwrap(), None);
    }

    #[test]
    fn invalidate_removes_entry() {
        let (_, cache) = setup();
        cache.put(DEPARTMENTS_CACHE_KEY, &depts());
        cache.invalidate(DEPARTMENTS_CACHE_KEY);
        assert_eq!(cache.get(DEPARTMENTS_CACHE_KEY), None);
    }

    #[test]
    fn file_backed_cache_survives_new_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let now = Utc::now();
        CacheStore::new(Arc::new(FileStore::new(tmp.path())), DEFAULT_CACHE_TTL)
            .put_at(DEPARTMENTS_CACHE_KEY, &depts(), now);

        let reopened = CacheStore::new(Arc::new(FileStore::new(tmp.path())), DEFAULT_CACHE_TTL);
        assert_eq!(reopened.get_at(DEPARTMENTS_CACHE_KEY, now), Some(depts()));
        assert!(tmp.path().join("departments_cache.json").exists());
    }
}
