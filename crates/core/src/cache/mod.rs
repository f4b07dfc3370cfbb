//! In-memory result cache for resilient search.
//!
//! Entries are keyed by a hash of the normalized query and filter state and
//! expire after a fixed TTL. Expired entries are evicted lazily on access and
//! swept periodically by a background task.

pub mod hash;
pub mod results;

pub use hash::{compute_cache_key, normalize_query};
pub use results::{CacheEntry, ResultCache};
