//! Persistent memo of successful combinations.
//!
//! Keyed by the unordered input pair plus the output language, so A+B and
//! B+A are the same entry and the same pair may cache different results per
//! language. Only successes are stored — a "no relation" outcome is asked
//! again on every attempt, by design. The cache has its own storage key and
//! survives a session hard-reset: it models oracle knowledge, not player
//! progress.

use std::collections::HashMap;

use crate::oracle::parse::Combination;
use crate::store::{warn, KvStore};

/// Storage key, versioned independently of the session record.
pub const CACHE_STORAGE_KEY: &str = "ccg_recipe_cache_v1";

/// Build the cache key for an unordered pair in a target language.
/// Sorting makes the pair order-independent; the language suffix isolates
/// translations of the same pair from each other.
pub fn pair_key(a: &str, b: &str, language: &str) -> String {
    let (x, y) = if a <= b { (a, b) } else { (b, a) };
    format!("{x}|{y}|{language}")
}

pub struct RecipeCache<S: KvStore> {
    entries: HashMap<String, Combination>,
    store: S,
}

impl<S: KvStore> RecipeCache<S> {
    /// Load the cache once at startup. A missing or corrupt record starts
    /// empty — cached knowledge is nice to have, never load-bearing.
    pub fn load(store: S) -> Self {
        let entries = match store.get(CACHE_STORAGE_KEY) {
            Some(json) => match serde_json::from_str::<Vec<(String, Combination)>>(&json) {
                Ok(tuples) => tuples.into_iter().collect(),
                Err(e) => {
                    warn(&format!("recipe cache unreadable, starting empty: {e}"));
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        Self { entries, store }
    }

    pub fn lookup(&self, key: &str) -> Option<&Combination> {
        self.entries.get(key)
    }

    /// Record a successful outcome and write the cache back immediately.
    pub fn store(&mut self, key: String, outcome: Combination) {
        self.entries.insert(key, outcome);
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let mut tuples: Vec<(&String, &Combination)> = self.entries.iter().collect();
        // Stable output keeps repeated saves byte-identical.
        tuples.sort_by(|a, b| a.0.cmp(b.0));
        match serde_json::to_string(&tuples) {
            Ok(json) => self.store.set(CACHE_STORAGE_KEY, &json),
            Err(e) => warn(&format!("recipe cache serialization failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    fn lava() -> Combination {
        Combination {
            result: "Lava".into(),
            emoji: "🌋".into(),
            colors: ["#FF4500".into(), "#8B0000".into()],
        }
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(pair_key("Fire", "Water", "English"), pair_key("Water", "Fire", "English"));
        assert_eq!(pair_key("Fire", "Water", "English"), "Fire|Water|English");
    }

    #[test]
    fn pair_key_isolates_languages() {
        assert_ne!(pair_key("Fire", "Water", "English"), pair_key("Fire", "Water", "日本語"));
    }

    #[test]
    fn pair_key_is_case_sensitive() {
        assert_ne!(pair_key("fire", "Water", "English"), pair_key("Fire", "Water", "English"));
    }

    #[test]
    fn lookup_after_store() {
        let mut cache = RecipeCache::load(MemoryStore::new());
        let key = pair_key("Fire", "Earth", "English");
        assert!(cache.lookup(&key).is_none());
        cache.store(key.clone(), lava());
        assert_eq!(cache.lookup(&key), Some(&lava()));
    }

    #[test]
    fn save_load_round_trip_is_identity() {
        let store = MemoryStore::new();
        let mut cache = RecipeCache::load(store.clone());
        cache.store(pair_key("Fire", "Earth", "English"), lava());
        cache.store(
            pair_key("Sea", "Sky", "English"),
            Combination {
                result: "Horizon".into(),
                emoji: "🌅".into(),
                colors: ["#87CEEB".into(), "#1E90FF".into()],
            },
        );

        let reloaded = RecipeCache::load(store);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.lookup(&pair_key("Earth", "Fire", "English")), Some(&lava()));
        assert_eq!(
            reloaded.lookup(&pair_key("Sky", "Sea", "English")).unwrap().result,
            "Horizon"
        );
    }

    #[test]
    fn corrupt_record_starts_empty() {
        let store = MemoryStore::new();
        store.set(CACHE_STORAGE_KEY, "{nonsense");
        let cache = RecipeCache::load(store);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_record_starts_empty() {
        let cache = RecipeCache::load(MemoryStore::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_survives_session_key_removal() {
        let store = MemoryStore::new();
        let mut cache = RecipeCache::load(store.clone());
        cache.store(pair_key("a", "b", "English"), lava());
        // A hard reset removes the session record, never the cache key.
        store.remove(crate::craft::save::SESSION_STORAGE_KEY);
        let reloaded = RecipeCache::load(store);
        assert_eq!(reloaded.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_pair_key_symmetric(a in ".{0,12}", b in ".{0,12}", lang in "[A-Za-z]{0,8}") {
            prop_assert_eq!(pair_key(&a, &b, &lang), pair_key(&b, &a, &lang));
        }
    }
}
