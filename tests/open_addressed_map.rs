// OpenAddressedMap integration test suite.
//
// Exercises the public surface only. Invariants checked:
// - Uniqueness: a key is stored at most once; duplicate inserts are no-ops.
// - Round-trip: a stored value is returned unchanged by access-or-insert.
// - Erase: absent keys report 0, present keys report 1 and leave a tombstone
//   that later insertions can reuse.
// - Growth: 11 keys in a fresh map double it to 40 slots; content survives.
use open_addressed_map::{InsertError, OpenAddressedMap, Status, DEFAULT_CAPACITY};
use std::hash::{BuildHasher, Hasher};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Default)]
struct IdentityBuildHasher;
struct IdentityHasher(u64);
impl BuildHasher for IdentityBuildHasher {
    type Hasher = IdentityHasher;
    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher(0)
    }
}
impl Hasher for IdentityHasher {
    fn write(&mut self, _bytes: &[u8]) {
        unimplemented!("identity hasher only accepts u32 keys")
    }
    fn write_u32(&mut self, n: u32) {
        self.0 = u64::from(n);
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

// Test: round trip of insert then access.
// Verifies: the value is returned unchanged and no entry is added.
#[test]
fn insert_then_access_round_trip() {
    init_logging();
    let mut m = OpenAddressedMap::new();
    assert!(m.insert("alpha".to_string(), 42));
    assert_eq!(*m.get_or_insert_default("alpha".to_string()), 42);
    assert_eq!(m.len(), 1);
}

// Test: idempotent erase of an absent key.
#[test]
fn erase_absent_key_is_noop() {
    let mut m: OpenAddressedMap<String, i32> = OpenAddressedMap::new();
    m.insert("present".to_string(), 1);
    assert_eq!(m.erase("absent"), 0);
    assert_eq!(m.erase("absent"), 0);
    assert_eq!(m.len(), 1);
    assert_eq!(m.tombstones(), 0);
}

// Scenario: insert A, erase A, insert A with a new value.
// Verifies: the reinsert succeeds, access sees the new value, len is 1.
#[test]
fn delete_then_reinsert() {
    let mut m = OpenAddressedMap::new();
    assert!(m.insert('A', 1));
    assert_eq!(m.erase(&'A'), 1);
    assert!(m.insert('A', 2));
    assert_eq!(*m.get_or_insert_default('A'), 2);
    assert_eq!(m.len(), 1);
}

// Scenario: 11 distinct keys into a fresh map.
// Verifies: exactly one growth to 40 slots and every key keeps its value.
#[test]
fn eleven_keys_trigger_one_growth() {
    init_logging();
    let mut m = OpenAddressedMap::new();
    for i in 0..11u32 {
        assert!(m.insert(i, i * 100));
    }
    assert_eq!(m.len(), 11);
    assert_eq!(m.capacity(), 2 * DEFAULT_CAPACITY);
    for i in 0..11u32 {
        assert_eq!(m.get(&i), Some(&(i * 100)));
    }
}

// Test: tombstone reuse with deterministic home slots.
// Assumes: identity hashing, so key k has home k % capacity.
// Verifies: the freed slot is marked Deleted, then claimed by the next key
// whose probe sequence reaches it.
#[test]
fn tombstone_is_reused_by_later_insert() {
    let mut m: OpenAddressedMap<u32, &str, IdentityBuildHasher> =
        OpenAddressedMap::with_hasher(IdentityBuildHasher);
    m.insert(5, "five");
    m.insert(25, "twenty-five");
    m.insert(45, "forty-five");
    assert_eq!(m.erase(&25), 1);
    assert_eq!(m.slot_status(6), Some(Status::Deleted));
    assert_eq!(m.tombstones(), 1);

    assert_eq!(m.get(&45), Some(&"forty-five"));
    assert!(m.insert(65, "sixty-five"));
    assert_eq!(m.slot_status(6), Some(Status::Occupied));
    assert_eq!(m.tombstones(), 0);
    assert_eq!(m.len(), 3);
}

// Test: access-or-insert on a key whose home holds a tombstone and which is
// stored further along the probe sequence.
// Verifies: no second copy of the key is created.
#[test]
fn access_past_tombstone_finds_existing_entry() {
    let mut m: OpenAddressedMap<u32, i32, IdentityBuildHasher> =
        OpenAddressedMap::with_hasher(IdentityBuildHasher);
    m.insert(7, 1);
    m.insert(27, 2);
    m.erase(&7);
    *m.get_or_insert_default(27) += 10;
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&27), Some(&12));
    assert_eq!(m.iter().filter(|(k, _)| **k == 27).count(), 1);
}

#[test]
fn try_insert_reports_duplicates() {
    let mut m: OpenAddressedMap<&str, Vec<u8>> = OpenAddressedMap::new();
    m.try_insert("k", vec![1]).expect("fresh key").push(2);
    assert_eq!(m.try_insert("k", vec![9]), Err(InsertError::DuplicateKey));
    assert_eq!(m["k"], vec![1, 2]);
}

// Test: erase never shrinks the table.
#[test]
fn erase_does_not_shrink() {
    let mut m = OpenAddressedMap::new();
    for i in 0..100u32 {
        m.insert(i, ());
    }
    let capacity = m.capacity();
    for i in 0..100u32 {
        assert_eq!(m.erase(&i), 1);
    }
    assert!(m.is_empty());
    assert_eq!(m.capacity(), capacity);
    assert_eq!(m.tombstones(), 100);
}
