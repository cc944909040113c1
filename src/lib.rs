//! open-addressed-map: a single-threaded HashMap storing every entry directly
//! in one slot array, resolving collisions by linear probing and deleting
//! with tombstones.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose open-addressing invariants are simple enough to check
//!   after every operation (the property tests do exactly that).
//! - Layers:
//!   - Slot<K, V>: a three-state cell, `Empty`, `Occupied { key, value }` or
//!     `Deleted`. The tombstone state is explicit so no code path can
//!     confuse it with `Empty`.
//!   - OpenAddressedMap<K, V, S>: the slot array plus a live count and a
//!     tombstone count, with probing, placement and growth.
//!
//! Probing
//! - `home = hash(key) % capacity`; the probe sequence steps by +1 and wraps.
//! - Lookups check `home`, then scan onward: `Deleted` means keep going,
//!   `Empty` means absent, returning to `home` means absent.
//! - Insertions first run the lookup (so an equal key anywhere on the chain is
//!   found before anything is written), then claim the first `Empty` or
//!   `Deleted` slot from `home`.
//! - An insertion scan that wraps all the way around panics. It cannot happen
//!   while the load factor bound holds, so it indicates a corrupted table.
//!
//! Growth
//! - After an insertion, if `len / capacity > 0.5`, the table doubles. Live
//!   entries are moved into a fresh array in index order; tombstones are
//!   dropped. Capacity is therefore always `DEFAULT_CAPACITY * 2^n`.
//! - The table never shrinks; removals only leave tombstones.
//!
//! References under growth
//! - `get_or_insert_default` and `try_insert` track the index of the entry
//!   they touched through a possible growth and borrow into the new array
//!   afterwards. The returned `&mut V` holds the map's mutable borrow, so it
//!   cannot outlive the next mutation.
//!
//! Hashing
//! - The hasher is any `BuildHasher`; the default is hashbrown's
//!   `DefaultHashBuilder`. Equal keys must hash equal; distribution only
//!   affects probe lengths.
//!
//! Notes and non-goals
//! - Single-threaded; no interior mutability and no atomics.
//! - Iteration order follows slot order and is not meaningful.
//! - Capacity is not configurable; every map starts at `DEFAULT_CAPACITY`.

pub mod open_addressed_map;
mod open_addressed_map_proptest;
#[cfg(feature = "serde")]
mod serde_impls;
mod slot;

// Public surface
pub use open_addressed_map::{
    InsertError, IntoIter, Iter, IterMut, Keys, OpenAddressedMap, Values, DEFAULT_CAPACITY,
    MAX_LOAD_FACTOR,
};
pub use slot::Status;
