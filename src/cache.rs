//! Cache of previously healed selectors
//!
//! Plain data structure; the engine wraps it in a lock. Entries are
//! created on successful strategy heals only and live until an explicit
//! `clear` or engine teardown. No TTL, no size bound.

use std::collections::HashMap;

use crate::types::CacheUse;

/// Mapping from broken selector to healed selector, with hit accounting
#[derive(Debug, Default)]
pub struct HealingCache {
    entries: HashMap<String, String>,
    uses: HashMap<String, u64>,
}

impl HealingCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously healed selector
    pub fn get(&self, selector: &str) -> Option<&str> {
        self.entries.get(selector).map(|s| s.as_str())
    }

    /// Store a healed selector for a broken one
    pub fn put(&mut self, selector: impl Into<String>, healed: impl Into<String>) {
        self.entries.insert(selector.into(), healed.into());
    }

    /// Record one cache hit for the selector
    pub fn record_use(&mut self, selector: &str) {
        *self.uses.entry(selector.to_string()).or_insert(0) += 1;
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and hit counts
    pub fn clear(&mut self) {
        self.entries.clear();
        self.uses.clear();
    }

    /// Most-used entries, descending hit count
    pub fn top_used(&self, n: usize) -> Vec<CacheUse> {
        let mut ranked: Vec<CacheUse> = self
            .uses
            .iter()
            .map(|(selector, &uses)| CacheUse {
                selector: selector.clone(),
                uses,
            })
            .collect();
        ranked.sort_by(|a, b| b.uses.cmp(&a.uses));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut cache = HealingCache::new();
        assert!(cache.get("#old").is_none());
        cache.put("#old", "#new");
        assert_eq!(cache.get("#old"), Some("#new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_uses() {
        let mut cache = HealingCache::new();
        cache.put("#a", "#b");
        cache.record_use("#a");
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.top_used(5).is_empty());
    }

    #[test]
    fn test_top_used_ordering() {
        let mut cache = HealingCache::new();
        cache.put("#a", "#a2");
        cache.put("#b", "#b2");
        for _ in 0..3 {
            cache.record_use("#b");
        }
        cache.record_use("#a");

        let top = cache.top_used(5);
        assert_eq!(top[0].selector, "#b");
        assert_eq!(top[0].uses, 3);
        assert_eq!(top[1].selector, "#a");
        assert_eq!(top[1].uses, 1);
    }

    #[test]
    fn test_top_used_truncates() {
        let mut cache = HealingCache::new();
        for i in 0..10 {
            let key = format!("#s{}", i);
            cache.put(key.clone(), "#x");
            cache.record_use(&key);
        }
        assert_eq!(cache.top_used(5).len(), 5);
    }
}
