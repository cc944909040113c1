#![cfg(test)]

// Property tests for OpenAddressedMap kept inside the crate so they can
// check raw slot state after every operation.

use crate::open_addressed_map::{InsertError, OpenAddressedMap, DEFAULT_CAPACITY, MAX_LOAD_FACTOR};
use crate::slot::Status;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Keys are small integers reduced by a tiny modulus in the hasher, so homes
// collide constantly and probe chains run through many tombstones.
#[derive(Clone, Default)]
struct ClusteringBuildHasher;
#[derive(Default)]
struct ClusteringHasher(u64);
impl BuildHasher for ClusteringBuildHasher {
    type Hasher = ClusteringHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ClusteringHasher(0)
    }
}
impl Hasher for ClusteringHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
        }
    }
    fn write_u16(&mut self, n: u16) {
        self.0 = u64::from(n % 7);
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, i32),
    TryInsert(u16, i32),
    Access(u16, i32),
    Erase(u16),
    Get(u16),
}

fn arb_ops(key_space: u16) -> impl Strategy<Value = Vec<Op>> {
    let key = 0..key_space;
    let op = prop_oneof![
        (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::TryInsert(k, v)),
        (key.clone(), any::<i32>()).prop_map(|(k, d)| Op::Access(k, d)),
        key.clone().prop_map(Op::Erase),
        key.prop_map(Op::Get),
    ];
    proptest::collection::vec(op, 1..200)
}

fn run_against_model<S: BuildHasher>(
    mut sut: OpenAddressedMap<u16, i32, S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<u16, i32> = HashMap::new();
    for op in ops {
        let len_before = sut.len();
        match op {
            Op::Insert(k, v) => {
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k, v), fresh);
                model.entry(k).or_insert(v);
            }
            Op::TryInsert(k, v) => match sut.try_insert(k, v) {
                Ok(stored) => {
                    prop_assert_eq!(*stored, v);
                    prop_assert!(model.insert(k, v).is_none());
                }
                Err(InsertError::DuplicateKey) => prop_assert!(model.contains_key(&k)),
            },
            Op::Access(k, d) => {
                let v = sut.get_or_insert_default(k);
                *v = v.wrapping_add(d);
                let m = model.entry(k).or_default();
                *m = m.wrapping_add(d);
            }
            Op::Erase(k) => {
                let expected = usize::from(model.remove(&k).is_some());
                prop_assert_eq!(sut.erase(&k), expected);
            }
            Op::Get(k) => prop_assert_eq!(sut.get(&k), model.get(&k)),
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        if sut.len() > len_before {
            prop_assert!(sut.load_factor() <= MAX_LOAD_FACTOR);
        }
        let tombstones = (0..sut.capacity())
            .filter(|&i| sut.slot_status(i) == Some(Status::Deleted))
            .count();
        prop_assert_eq!(tombstones, sut.tombstones());
    }

    let contents: BTreeMap<u16, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: BTreeMap<u16, i32> = model.into_iter().collect();
    prop_assert_eq!(contents, expected);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// After every op the table is structurally valid (counts match slot states,
// keys unique and reachable, capacity is DEFAULT_CAPACITY * 2^n) and the
// load factor bound holds after insertions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops(64)) {
        run_against_model(OpenAddressedMap::new(), ops)?;
    }

    #[test]
    fn prop_state_machine_with_clustering(ops in arb_ops(48)) {
        run_against_model(OpenAddressedMap::with_hasher(ClusteringBuildHasher), ops)?;
    }

    // Property: a rehash keeps exactly the live (key, value) pairs and purges
    // every tombstone.
    #[test]
    fn prop_growth_preserves_content(
        keys in proptest::collection::btree_set(0u16..1000, 11..120),
        erase_every in 2usize..5,
    ) {
        let mut m: OpenAddressedMap<u16, i32, ClusteringBuildHasher> =
            OpenAddressedMap::with_hasher(ClusteringBuildHasher);
        let keys: Vec<u16> = keys.into_iter().collect();
        let (first, rest) = keys.split_at(10);
        for &k in first {
            m.insert(k, i32::from(k));
        }
        for &k in first.iter().step_by(erase_every) {
            m.erase(&k);
        }
        let before: BTreeMap<u16, i32> = m.iter().map(|(k, v)| (*k, *v)).collect();
        let capacity = m.capacity();

        let mut grew_at = None;
        for &k in rest {
            m.insert(k, i32::from(k));
            if m.capacity() != capacity && grew_at.is_none() {
                grew_at = Some(k);
                prop_assert_eq!(m.tombstones(), 0);
            }
        }
        prop_assert!(grew_at.is_some() || m.len() * 2 <= DEFAULT_CAPACITY);
        for (k, v) in &before {
            prop_assert_eq!(m.get(k), Some(v));
        }
        for &k in rest {
            prop_assert_eq!(m.get(&k), Some(&i32::from(k)));
        }
        prop_assert_eq!(m.len(), before.len() + rest.len());
        m.assert_invariants();
    }
}
