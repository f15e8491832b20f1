// Cache module for the shared program cache.
// Key derivation plus filesystem and in-memory stores.

pub mod keys;
pub mod memory;
pub mod store;

pub use keys::{index_key, record_key};
pub use memory::MemoryCache;
pub use store::{CacheStore, CachedData, FileCache, default_cache_dir, get_as};
