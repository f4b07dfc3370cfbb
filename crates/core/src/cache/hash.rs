//! Cache key generation for (query, filters) pairs.

use sha2::{Digest, Sha256};

use crate::filters::FilterState;

/// Fold case and whitespace so trivially different spellings share a key.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

/// Compute the cache key for a search.
///
/// The key is a SHA-256 hash of the normalized query and the serialized filter
/// state, so structurally equal filters always land on the same entry.
pub fn compute_cache_key(query: &str, filters: &FilterState) -> String {
    let filters_json = serde_json::to_string(filters).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(normalize_query(query).as_bytes());
    hasher.update(b"\n");
    hasher.update(filters_json.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("wedding", &FilterState::default());
        let hash2 = compute_cache_key("wedding", &FilterState::default());
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_structurally_equal_filters() {
        let a = FilterState { languages: ["en".to_string(), "es".to_string()].into(), ..Default::default() };
        let b = FilterState { languages: ["es".to_string(), "en".to_string()].into(), ..Default::default() };
        assert_eq!(compute_cache_key("roast", &a), compute_cache_key("roast", &b));
    }

    #[test]
    fn test_hash_normalizes_query() {
        let filters = FilterState::default();
        assert_eq!(compute_cache_key("  Birthday   Shoutout ", &filters), compute_cache_key("birthday shoutout", &filters));
    }

    #[test]
    fn test_hash_different_filters() {
        let verified = FilterState { verified_only: true, ..Default::default() };
        assert_ne!(compute_cache_key("wedding", &verified), compute_cache_key("wedding", &FilterState::default()));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("wedding", &FilterState::default());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
