//! Memo of prior resolutions, keyed by feature then variable

use std::collections::HashMap;

use crate::tweak::Tweak;

/// A resolved tweak together with the provider that first contributed it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTweak {
    pub tweak: Tweak,
    /// Name of the highest-priority provider that matched. Diagnostic only.
    pub source: String,
}

/// Two-level map from (feature, variable) to the last resolution.
///
/// Entries are only ever discarded all at once. Each wholesale clear bumps
/// the generation so that a resolution computed against an older generation
/// can be recognized and dropped instead of stored.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, HashMap<String, CachedTweak>>,
    generation: u64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feature: &str, variable: &str) -> Option<&CachedTweak> {
        self.entries.get(feature)?.get(variable)
    }

    /// Store a resolution computed during `generation`.
    ///
    /// Returns false (and stores nothing) if the cache was cleared since.
    pub fn insert(
        &mut self,
        generation: u64,
        feature: &str,
        variable: &str,
        entry: CachedTweak,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.entries
            .entry(feature.to_string())
            .or_default()
            .insert(variable.to_string(), entry);
        true
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of cached (feature, variable) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(variable: &str) -> CachedTweak {
        CachedTweak {
            tweak: Tweak::new(variable).with_value(true),
            source: "memory".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = ResolutionCache::new();
        let generation = cache.generation();

        assert!(cache.insert(generation, "general", "greet", entry("greet")));

        let cached = cache.get("general", "greet").unwrap();
        assert_eq!(cached.source, "memory");
        assert!(cache.get("general", "other").is_none());
        assert!(cache.get("other", "greet").is_none());
    }

    #[test]
    fn test_same_variable_in_two_features() {
        let mut cache = ResolutionCache::new();
        let generation = cache.generation();
        cache.insert(generation, "a", "v", entry("v"));
        cache.insert(generation, "b", "v", entry("v"));

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut cache = ResolutionCache::new();
        let generation = cache.generation();
        cache.insert(generation, "a", "x", entry("x"));
        cache.insert(generation, "b", "y", entry("y"));

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get("a", "x").is_none());
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut cache = ResolutionCache::new();
        let stale = cache.generation();
        cache.clear();

        assert!(!cache.insert(stale, "a", "x", entry("x")));
        assert!(cache.is_empty());
    }
}
