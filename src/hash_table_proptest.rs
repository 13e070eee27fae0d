#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// chain structure directly.

use crate::hash_table::{HashTable, Put, MAX_LOAD_FACTOR};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, u32),
    Remove(usize),
    Get(usize),
    Contains(i64),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<i64>, Vec<OpI>)> {
    (1usize..=8, proptest::collection::vec(any::<i64>(), 1..=24)).prop_flat_map(
        |(capacity, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                6 => (idx.clone(), any::<u32>()).prop_map(|(i, v)| OpI::Put(i, v)),
                2 => idx.clone().prop_map(OpI::Remove),
                2 => idx.clone().prop_map(OpI::Get),
                1 => any::<i64>().prop_map(OpI::Contains),
                1 => Just(OpI::Clear),
                1 => Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..120)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        },
    )
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences, starting from
// tiny capacities so most runs cross several resizes:
// - `put` reports Inserted/Updated exactly as the model predicts.
// - Every stored pair reads back after unrelated inserts and resizes.
// - `remove` changes `len` by one iff the key was present.
// - `clear` empties the table and keeps its capacity.
// - `len` matches the model and the load factor never exceeds the bound.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        let mut sut = HashTable::with_capacity(capacity).unwrap();
        let mut model: HashMap<i64, u32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i];
                    let prev = model.insert(k, v);
                    let got = sut.put(k, v).unwrap();
                    match prev {
                        Some(previous) => prop_assert_eq!(got, Put::Updated { previous }),
                        None => prop_assert_eq!(got, Put::Inserted),
                    }
                    prop_assert!(sut.load_factor() <= MAX_LOAD_FACTOR);
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    let before = sut.len();
                    let present = model.remove(&k).is_some();
                    prop_assert_eq!(sut.remove(k), present);
                    prop_assert_eq!(sut.len(), before - present as usize);
                    prop_assert_eq!(sut.get(k), None);
                }
                OpI::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(k), model.get(&k).copied());
                }
                OpI::Contains(k) => {
                    prop_assert_eq!(sut.contains(k), model.contains_key(&k));
                }
                OpI::Clear => {
                    let cap = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap);
                    prop_assert_eq!(sut.load_factor(), 0.0);
                    for &k in &pool {
                        prop_assert!(!sut.contains(k));
                    }
                }
                OpI::Iterate => {
                    let s: BTreeMap<_, _> = sut.iter().collect();
                    let m: BTreeMap<_, _> = model.iter().map(|(&k, &v)| (k, v)).collect();
                    prop_assert_eq!(s, m);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity() > 0);
        }

        for (&k, &v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
}

// Property: growing from a single bucket through many resizes preserves the
// full set of pairs, with no loss or duplication.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_resize_preserves_pairs(pairs in proptest::collection::vec((any::<i64>(), any::<u32>()), 0..400)) {
        let mut sut = HashTable::with_capacity(1).unwrap();
        let mut model: BTreeMap<i64, u32> = BTreeMap::new();
        for (k, v) in pairs {
            sut.put(k, v).unwrap();
            model.insert(k, v);
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.capacity().is_power_of_two());
        let collected: Vec<(i64, u32)> = sut.iter().collect();
        prop_assert_eq!(collected.len(), model.len());
        let as_map: BTreeMap<i64, u32> = collected.into_iter().collect();
        prop_assert_eq!(&as_map, &model);
        for (&k, &v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
}
