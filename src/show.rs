// Cached index inspection.
// Reads an index entry back and pairs each UUID with its cached program title.

use std::fmt;

use serde_json::Value;

use crate::cache::{CacheStore, get_as, index_key, record_key};
use crate::catalog::{program_status, program_title};
use crate::error::{ProgramCacheError, Result};
use crate::sites::TenancyMode;

/// One UUID from a cached index and what the cache holds for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLine {
    pub uuid: String,
    /// `None` when the detail entry is missing.
    pub detail: Option<CachedProgram>,
}

/// Display fields read from a cached detail document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedProgram {
    pub title: Option<String>,
    pub status: Option<String>,
}

impl fmt::Display for IndexLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(program) => write!(
                f,
                "{}  {:<8}  {}",
                self.uuid,
                program.status.as_deref().unwrap_or("-"),
                program.title.as_deref().unwrap_or("<untitled>")
            ),
            None => write!(f, "{}  <missing>", self.uuid),
        }
    }
}

/// Read the cached index for `mode`/`site` and look up each program.
pub fn read_index(
    cache: &dyn CacheStore,
    mode: TenancyMode,
    site: Option<&str>,
) -> Result<Vec<IndexLine>> {
    let key = index_key(mode, site);
    let uuids: Vec<String> = get_as(cache, &key)?
        .ok_or_else(|| ProgramCacheError::NotFound(format!("cache entry {}", key)))?;

    uuids
        .into_iter()
        .map(|uuid| -> Result<IndexLine> {
            let document: Option<Value> = cache.get(&record_key(&uuid))?;
            Ok(IndexLine {
                detail: document.map(|document| CachedProgram {
                    title: program_title(&document).map(str::to_string),
                    status: program_status(&document).map(str::to_string),
                }),
                uuid,
            })
        })
        .collect()
}
