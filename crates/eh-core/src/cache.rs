//! Style sheet caching
//!
//! Two kinds of cache back the engine: a bounded LRU map of per-domain style
//! sheets, and single-value tiers that are rebuilt lazily after invalidation.

use std::num::NonZeroUsize;

use lru::LruCache;

/// Default number of domain-specific style sheets kept in memory.
pub const STYLE_SHEET_CACHE_CAPACITY: usize = 100;

// =============================================================================
// LRU Cache
// =============================================================================

/// Bounded cache of generated style sheets by known domain suffix.
pub struct StyleSheetCache {
    entries: LruCache<String, String>,
}

impl StyleSheetCache {
    /// Create a new cache with the given capacity (at least one entry).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    /// Get a style sheet from the cache, marking it most recently used.
    pub fn get(&mut self, domain: &str) -> Option<&str> {
        self.entries.get(domain).map(String::as_str)
    }

    /// Insert a style sheet, evicting the least recently used one when full.
    pub fn set(&mut self, domain: String, style_sheet: String) {
        self.entries.put(domain, style_sheet);
    }

    /// Clear the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for StyleSheetCache {
    fn default() -> Self {
        Self::new(STYLE_SHEET_CACHE_CAPACITY)
    }
}

// =============================================================================
// Lazily Rebuilt Tiers
// =============================================================================

/// A derived value that is either up to date or needs a rebuild.
///
/// An empty `Fresh` value (no selectors at all) is distinct from `Stale`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tier<T> {
    Fresh(T),
    #[default]
    Stale,
}

impl<T> Tier<T> {
    /// Return the fresh value, building it first if the tier is stale.
    pub fn get_or_insert_with(&mut self, build: impl FnOnce() -> T) -> &T {
        if let Tier::Stale = self {
            *self = Tier::Fresh(build());
        }

        match self {
            Tier::Fresh(value) => value,
            Tier::Stale => unreachable!("tier was just rebuilt"),
        }
    }

    /// The value, if it is up to date.
    pub fn get(&self) -> Option<&T> {
        match self {
            Tier::Fresh(value) => Some(value),
            Tier::Stale => None,
        }
    }

    /// Mark the tier for rebuild.
    #[inline]
    pub fn invalidate(&mut self) {
        *self = Tier::Stale;
    }

    #[inline]
    pub fn is_fresh(&self) -> bool {
        matches!(self, Tier::Fresh(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_get_set() {
        let mut cache = StyleSheetCache::new(2);
        cache.set("example.com".to_string(), "a {display: none !important;}\n".to_string());
        assert_eq!(cache.get("example.com"), Some("a {display: none !important;}\n"));
        assert_eq!(cache.get("example.org"), None);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let mut cache = StyleSheetCache::new(2);
        cache.set("a.com".to_string(), "a".to_string());
        cache.set("b.com".to_string(), "b".to_string());
        assert!(cache.get("a.com").is_some());
        cache.set("c.com".to_string(), "c".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b.com").is_none());
        assert!(cache.get("a.com").is_some());
        assert!(cache.get("c.com").is_some());
    }

    #[test]
    fn test_cache_zero_capacity_holds_one() {
        let cache = StyleSheetCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = StyleSheetCache::default();
        cache.set("a.com".to_string(), String::new());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), STYLE_SHEET_CACHE_CAPACITY);
    }

    #[test]
    fn test_tier_rebuilds_only_when_stale() {
        let mut tier: Tier<String> = Tier::Stale;
        let mut builds = 0;

        tier.get_or_insert_with(|| {
            builds += 1;
            String::new()
        });
        tier.get_or_insert_with(|| {
            builds += 1;
            String::new()
        });
        assert_eq!(builds, 1);
        assert_eq!(tier.get().map(String::as_str), Some(""));

        tier.invalidate();
        assert!(!tier.is_fresh());
        assert_eq!(tier.get_or_insert_with(|| "x".to_string()), "x");
    }
}
