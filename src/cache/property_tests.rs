//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's invariants over arbitrary operation
//! sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::cache::CacheStore;

// == Strategies ==
/// Generates cache keys from a small alphabet so sequences revisit keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]{0,1}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Invalidate { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Counters match a model of every operation applied to an unbounded store
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(None, None);
        let mut model: HashMap<String, String> = HashMap::new();
        let (mut hits, mut misses, mut puts, mut invalidations) = (0u64, 0u64, 0u64, 0u64);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key.clone(), value.clone());
                    model.insert(key, value);
                    puts += 1;
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    prop_assert_eq!(&got, &model.get(&key).cloned());
                    if got.is_some() { hits += 1 } else { misses += 1 }
                }
                CacheOp::Invalidate { key } => {
                    if model.remove(&key).is_some() {
                        invalidations += 1;
                    }
                    store.invalidate(&key);
                }
                CacheOp::Clear => {
                    invalidations += model.len() as u64;
                    model.clear();
                    store.clear();
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.puts, puts);
        prop_assert_eq!(stats.invalidations, invalidations);
        prop_assert_eq!(stats.size, model.len());
        prop_assert!(stats.hit_rate >= 0.0 && stats.hit_rate <= 1.0);
    }

    // The size bound holds after every insert and evicted keys miss
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100),
        max_size in 1usize..10
    ) {
        let mut store = CacheStore::new(None, Some(max_size));
        let mut written = HashSet::new();
        let mut evictions = 0u64;

        for (key, value) in entries {
            // A new key written into a full store pushes exactly one entry out
            if !store.contains_key(&key) && store.len() == max_size {
                evictions += 1;
            }
            store.put(key.clone(), value);
            written.insert(key);
            prop_assert!(
                store.len() <= max_size,
                "Cache size {} exceeds max {}",
                store.len(),
                max_size
            );
        }

        let stats = store.stats();
        prop_assert_eq!(stats.evictions, evictions);
        let evicted: Vec<&String> = written.iter().filter(|k| !store.contains_key(k)).collect();
        prop_assert_eq!(stats.size, written.len() - evicted.len());
        // A key can be evicted, written again and evicted again
        prop_assert!(evicted.len() as u64 <= stats.evictions);
        for key in evicted {
            prop_assert!(store.get(key).is_none());
        }
    }

    // A batch read equals per-key reads with defaults filled in
    #[test]
    fn prop_get_many_matches_single_gets(
        stored in prop::collection::hash_map(key_strategy(), value_strategy(), 0..10),
        requested in prop::collection::hash_set(key_strategy(), 0..10),
        defaults in prop::collection::hash_map(key_strategy(), value_strategy(), 0..10)
    ) {
        let mut store = CacheStore::new(None, None);
        store.put_many(stored.clone());

        let keys: Vec<String> = requested.into_iter().collect();
        let result = store.get_many(&keys, &defaults);

        prop_assert_eq!(result.len(), keys.len());
        for key in &keys {
            let expected = stored.get(key).or_else(|| defaults.get(key)).cloned();
            prop_assert_eq!(&result[key], &expected);
        }

        let hits = keys.iter().filter(|k| stored.contains_key(*k)).count() as u64;
        prop_assert_eq!(store.stats().hits, hits);
        prop_assert_eq!(store.stats().misses, keys.len() as u64 - hits);
    }
}
