//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the byte budget and LRU ordering of [`LruStore`].

use std::collections::VecDeque;

use bytes::Bytes;
use proptest::prelude::*;

use crate::cache::LruStore;

// == Strategies ==
/// Generates short keys so that operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,3}"
}

/// Generates values, including the empty value which must never be stored
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..24)
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| StoreOp::Set { key, value }),
        key_strategy().prop_map(|key| StoreOp::Get { key }),
    ]
}

// == Reference Model ==
/// Straightforward LRU model: front = most recent.
#[derive(Default)]
struct Model {
    entries: VecDeque<(String, Vec<u8>)>,
    capacity: usize,
}

impl Model {
    fn size(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(pos)?;
        let value = entry.1.clone();
        self.entries.push_front(entry);
        Some(value)
    }

    fn set(&mut self, key: String, value: Vec<u8>) {
        if value.is_empty() {
            return;
        }
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        }
        self.entries.push_front((key, value));
        while self.size() > self.capacity {
            self.entries.pop_back();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // *For any* sequence of SET operations, the byte footprint SHALL never exceed capacity.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 0usize..64,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100)
    ) {
        let store = LruStore::new(capacity);

        for (key, value) in entries {
            store.set(&key, Bytes::from(value));
            prop_assert!(
                store.size_bytes() <= capacity,
                "Store size {} exceeds capacity {}",
                store.size_bytes(),
                capacity
            );
        }
    }

    // *For any* sequence of operations, the store SHALL agree with a naive LRU model:
    // the least recently touched entries go first and GET promotes.
    #[test]
    fn prop_matches_reference_lru(
        capacity in 1usize..48,
        ops in prop::collection::vec(store_op_strategy(), 1..120)
    ) {
        let store = LruStore::new(capacity);
        let mut model = Model { capacity, ..Model::default() };

        for op in ops {
            match op {
                StoreOp::Set { key, value } => {
                    store.set(&key, Bytes::from(value.clone()));
                    model.set(key, value);
                }
                StoreOp::Get { key } => {
                    let got = store.get(&key).map(|b| b.to_vec());
                    prop_assert_eq!(got, model.get(&key), "GET mismatch for {}", key);
                }
            }
            prop_assert_eq!(store.len(), model.entries.len());
            prop_assert_eq!(store.size_bytes(), model.size());
        }

        let expected: Vec<String> = model.entries.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(store.keys_by_recency(), expected);
    }

    // *For any* key, storing V1 and then V2 SHALL result in GET returning V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in prop::collection::vec(any::<u8>(), 1..16),
        value2 in prop::collection::vec(any::<u8>(), 1..16)
    ) {
        let store = LruStore::new(1024);

        store.set(&key, Bytes::from(value1));
        store.set(&key, Bytes::from(value2.clone()));

        prop_assert_eq!(store.get(&key), Some(Bytes::from(value2.clone())));
        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.size_bytes(), key.len() + value2.len());
    }
}
