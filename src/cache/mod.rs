// Cache module for local filesystem caching.
// Stores raw API response bodies keyed by request fingerprint.

pub mod paths;
pub mod store;

pub use paths::{DEFAULT_CACHE_DIR, platform_cache_dir};
pub use store::{CacheStore, CachedBody, DEFAULT_TTL};
