// In-memory cache store.
// Same semantics as the filesystem store; used by tests and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::error::{ProgramCacheError, Result};

use super::store::{CacheStore, CachedData};

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedData<Value>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, expired or not, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw entry including its metadata.
    #[cfg(test)]
    pub(crate) fn entry(&self, key: &str) -> Option<CachedData<Value>> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl CacheStore for MemoryCache {
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ProgramCacheError::Other("memory cache lock poisoned".to_string()))?;
        entries.insert(key.to_string(), CachedData::new(value.clone(), ttl));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ProgramCacheError::Other("memory cache lock poisoned".to_string()))?;
        Ok(entries
            .get(key)
            .filter(|cached| !cached.is_expired(Utc::now()))
            .map(|cached| cached.data.clone()))
    }
}
