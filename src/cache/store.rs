// Cache store abstraction and its filesystem implementation.
// Handles JSON serialization, expiry checking, and atomic file writes.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Result;

use super::keys::file_name_for;

/// A shared key-value store for cached JSON documents.
///
/// A `ttl` of `None` stores the entry without expiry. Writes overwrite any
/// existing value for the key.
pub trait CacheStore {
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set_many(&self, entries: &BTreeMap<String, Value>, ttl: Option<Duration>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value, ttl)?;
        }
        Ok(())
    }
}

/// Read an entry and deserialize it into `T`.
pub fn get_as<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being served. `None` never expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry.
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        let cached_at = Utc::now();
        // A TTL too large to represent is treated as no expiry.
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| cached_at.checked_add_signed(ttl));
        Self {
            data,
            cached_at,
            expires_at,
        }
    }

    /// Check if this cached data has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Filesystem cache: one JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(file_name_for(key))
    }
}

impl CacheStore for FileCache {
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        write_cached(&self.path_for(key), value, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        match read_cached::<Value>(&self.path_for(key))? {
            Some(cached) if !cached.is_expired(Utc::now()) => Ok(Some(cached.data)),
            _ => Ok(None),
        }
    }
}

/// Get the platform cache directory for this tool.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "program-cache").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Read cached JSON data from a file.
pub fn read_cached<T: DeserializeOwned>(path: &Path) -> Result<Option<CachedData<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let cached: CachedData<T> = serde_json::from_str(&contents)?;
    Ok(Some(cached))
}

/// Write data to cache as JSON.
pub fn write_cached<T: Serialize>(path: &Path, data: &T, ttl: Option<Duration>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let cached = CachedData::new(data, ttl);
    let json = serde_json::to_string_pretty(&cached)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        let value = json!({"title": "Data Science", "status": "active"});
        cache.set("program-abc", &value, None).unwrap();

        assert_eq!(cache.get("program-abc").unwrap(), Some(value));
        assert!(cache.path_for("program-abc").exists());
    }

    #[test]
    fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());
        assert_eq!(cache.get("program-uuids").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache.set("program-uuids", &json!(["a"]), None).unwrap();
        cache.set("program-uuids", &json!(["a", "b"]), None).unwrap();

        assert_eq!(cache.get("program-uuids").unwrap(), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_set_many() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path().join("nested"));

        let mut entries = BTreeMap::new();
        entries.insert("program-1".to_string(), json!({"n": 1}));
        entries.insert("program-2".to_string(), json!({"n": 2}));
        cache.set_many(&entries, None).unwrap();

        assert_eq!(cache.get("program-1").unwrap(), Some(json!({"n": 1})));
        assert_eq!(cache.get("program-2").unwrap(), Some(json!({"n": 2})));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let mut data = CachedData::new("test", None);
        data.cached_at = Utc::now() - chrono::Duration::days(3650);

        assert!(data.expires_at.is_none());
        assert!(!data.is_expired(Utc::now()));
    }

    #[test]
    fn test_ttl_expires() {
        let data = CachedData::new("test", Some(Duration::from_secs(300)));

        assert!(!data.is_expired(Utc::now()));
        assert!(data.is_expired(Utc::now() + chrono::Duration::seconds(600)));
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache
            .set("program-short", &json!(1), Some(Duration::ZERO))
            .unwrap();
        assert_eq!(cache.get("program-short").unwrap(), None);
    }

    #[test]
    fn test_similar_site_keys_kept_apart() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache
            .set("program-uuids-localhost:8000", &json!(["a"]), None)
            .unwrap();
        cache
            .set("program-uuids-localhost_8000", &json!(["b"]), None)
            .unwrap();

        assert_eq!(
            cache.get("program-uuids-localhost:8000").unwrap(),
            Some(json!(["a"]))
        );
        assert_eq!(
            cache.get("program-uuids-localhost_8000").unwrap(),
            Some(json!(["b"]))
        );
    }

    #[test]
    fn test_get_as_typed() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache
            .set("program-uuids", &json!(["x", "y"]), None)
            .unwrap();
        let uuids: Option<Vec<String>> = get_as(&cache, "program-uuids").unwrap();
        assert_eq!(uuids, Some(vec!["x".to_string(), "y".to_string()]));
    }
}
