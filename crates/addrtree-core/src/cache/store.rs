// ── Key/value backends ──

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CoreError;

/// A string-keyed store of string values.
///
/// Implementations must tolerate concurrent callers but need not order them:
/// the last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

// ── File-backed ─────────────────────────────────────────────────────

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CoreError::Cache(format!("invalid cache key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(action: &str, path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::Cache(format!("failed to {action} {}: {e}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err("read", &path, &e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err("create", &self.dir, &e))?;

        // Readers never observe a half-written file.
        let temp_path = path.with_extension("json.tmp");
        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| io_err("create", &temp_path, &e))?;
        file.write_all(value.as_bytes())
            .map_err(|e| io_err("write", &temp_path, &e))?;
        file.sync_all().map_err(|e| io_err("sync", &temp_path, &e))?;
        drop(file);

        std::fs::rename(&temp_path, &path).map_err(|e| io_err("replace", &path, &e))
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err("remove", &path, &e)),
        }
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// Process-local store, for tests and `--no-cache`-style ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Internal("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("nested"));

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "{\"a\":1}").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(tmp.path().join("nested/k.json").exists());
        assert!(!tmp.path().join("nested/k.json.tmp").exists());

        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
