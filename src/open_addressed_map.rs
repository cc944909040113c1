//! OpenAddressedMap: linear-probing table with tombstone deletion and
//! doubling growth.

use crate::slot::{Slot, Status};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// Number of slots in a freshly constructed table.
pub const DEFAULT_CAPACITY: usize = 20;

/// Growth triggers once `len / capacity` exceeds this after an insertion
/// (checked as `2 * len > capacity`).
pub const MAX_LOAD_FACTOR: f64 = 0.5;

pub struct OpenAddressedMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    slots: Vec<Slot<K, V>>, // length is the capacity, never zero
    live: usize,
    tombstones: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertError {
    DuplicateKey,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("key already present in map"),
        }
    }
}

impl std::error::Error for InsertError {}

/// Outcome of resolving a key against the current table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Probe {
    Found(usize),
    Absent { home: usize },
}

#[inline]
fn home_slot(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[inline]
fn next_slot(index: usize, capacity: usize) -> usize {
    let n = index + 1;
    if n == capacity {
        0
    } else {
        n
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}

/// First `Empty` or `Deleted` slot on the probe sequence starting at `home`.
///
/// Panics after a full cycle: with the load factor bounded there is always a
/// free slot, so reaching `home` again means the table is corrupt.
fn first_insertable<K, V>(slots: &[Slot<K, V>], home: usize) -> usize {
    let capacity = slots.len();
    let mut i = home;
    loop {
        if slots[i].is_insertable() {
            return i;
        }
        i = next_slot(i, capacity);
        assert!(
            i != home,
            "probe sequence wrapped without a free slot: load factor invariant violated"
        );
    }
}

impl<K, V> OpenAddressedMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for OpenAddressedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OpenAddressedMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            slots: empty_slots(DEFAULT_CAPACITY),
            live: 0,
            tombstones: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots in the backing array.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of `Deleted` slots awaiting reuse or the next growth.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        self.live as f64 / self.slots.len() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// State of the slot at `index`, or `None` past the end of the table.
    pub fn slot_status(&self, index: usize) -> Option<Status> {
        self.slots.get(index).map(Slot::status)
    }

    /// Removes every entry. Capacity is kept and all slots become `Empty`.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.live = 0;
        self.tombstones = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.live,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
            remaining: self.live,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    fn value_at_mut(&mut self, index: usize) -> &mut V {
        match self.slots[index].value_mut() {
            Some(value) => value,
            None => unreachable!("slot {} resolved but not occupied", index),
        }
    }
}

impl<K, V, S> OpenAddressedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn home<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        home_slot(self.hasher.hash_one(q), self.slots.len())
    }

    /// Searches past `home` for an occupied slot holding `q`. Tombstones are
    /// skipped; an empty slot or a return to `home` ends the search.
    fn scan_for<Q>(&self, q: &Q, home: usize) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let capacity = self.slots.len();
        let mut i = next_slot(home, capacity);
        while i != home {
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Deleted => {}
                Slot::Occupied { key, .. } => {
                    if key.borrow() == q {
                        return Some(i);
                    }
                }
            }
            i = next_slot(i, capacity);
        }
        None
    }

    fn locate<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let home = self.home(q);
        match &self.slots[home] {
            Slot::Empty => Probe::Absent { home },
            Slot::Occupied { key, .. } if key.borrow() == q => Probe::Found(home),
            _ => match self.scan_for(q, home) {
                Some(i) => Probe::Found(i),
                None => Probe::Absent { home },
            },
        }
    }

    /// Stores a new entry in the first free slot from `home` and returns its
    /// index. The caller has already established that the key is absent.
    fn place(&mut self, home: usize, key: K, value: V) -> usize {
        let i = first_insertable(&self.slots, home);
        if self.slots[i].status() == Status::Deleted {
            log::trace!("reusing tombstone at slot {}", i);
            self.tombstones -= 1;
        }
        self.slots[i] = Slot::Occupied { key, value };
        self.live += 1;
        debug_assert!(self.live + self.tombstones <= self.slots.len());
        i
    }

    /// Grows when the load factor bound is exceeded. Returns the index of the
    /// entry that was at `tracked`, which moves if the table was rebuilt.
    fn grow_if_needed(&mut self, tracked: usize) -> usize {
        // live / capacity > 1/2, kept in integers
        if 2 * self.live <= self.slots.len() {
            return tracked;
        }
        self.grow(tracked)
    }

    fn grow(&mut self, tracked: usize) -> usize {
        let old_capacity = self.slots.len();
        let new_capacity = match old_capacity.checked_mul(2) {
            Some(c) => c,
            None => panic!("capacity overflow"),
        };
        let old = core::mem::replace(&mut self.slots, empty_slots(new_capacity));
        let purged = self.tombstones;
        let mut relocated = tracked;

        for (i, slot) in old.into_iter().enumerate() {
            let Some((key, value)) = slot.into_entry() else {
                continue;
            };
            // The fresh array has no tombstones, so this lands on an Empty slot.
            let home = home_slot(self.hasher.hash_one(&key), new_capacity);
            let j = first_insertable(&self.slots, home);
            self.slots[j] = Slot::Occupied { key, value };
            if i == tracked {
                relocated = j;
            }
        }
        self.tombstones = 0;

        log::debug!(
            "grew table from {} to {} slots ({} live, {} tombstones purged)",
            old_capacity,
            new_capacity,
            self.live,
            purged
        );
        relocated
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key
    /// is absent. May grow the table; the reference points into the live array.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let index = match self.locate(&key) {
            Probe::Found(i) => return self.value_at_mut(i),
            Probe::Absent { home } => {
                let i = self.place(home, key, V::default());
                self.grow_if_needed(i)
            }
        };
        self.value_at_mut(index)
    }

    /// Inserts `key -> value` unless the key is present. Returns whether a new
    /// entry was created; an existing value is never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.try_insert(key, value).is_ok()
    }

    /// Like `insert`, but hands back the newly stored value.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V, InsertError> {
        match self.locate(&key) {
            Probe::Found(_) => Err(InsertError::DuplicateKey),
            Probe::Absent { home } => {
                let i = self.place(home, key, value);
                let i = self.grow_if_needed(i);
                Ok(self.value_at_mut(i))
            }
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Probe::Found(i) => self.slots[i].value(),
            Probe::Absent { .. } => None,
        }
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Probe::Found(i) => self.slots[i].value_mut(),
            Probe::Absent { .. } => None,
        }
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Probe::Found(i) => self.slots[i].entry(),
            Probe::Absent { .. } => None,
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        matches!(self.locate(q), Probe::Found(_))
    }

    /// Removes `q`, leaving a tombstone in its slot, and returns the owned
    /// key and value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Probe::Found(i) = self.locate(q) else {
            return None;
        };
        let entry = self.slots[i].take()?;
        self.live -= 1;
        self.tombstones += 1;
        Some(entry)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Removes `q` and returns the number of entries removed (0 or 1).
    pub fn erase<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        usize::from(self.remove_entry(q).is_some())
    }

    /// Checks every structural invariant of the table, panicking on the
    /// first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.slots.len();
        assert!(capacity > 0);
        assert_eq!(capacity % DEFAULT_CAPACITY, 0);
        assert!((capacity / DEFAULT_CAPACITY).is_power_of_two());

        let occupied = self
            .slots
            .iter()
            .filter(|s| s.status() == Status::Occupied)
            .count();
        let deleted = self
            .slots
            .iter()
            .filter(|s| s.status() == Status::Deleted)
            .count();
        assert_eq!(occupied, self.live, "live count drifted");
        assert_eq!(deleted, self.tombstones, "tombstone count drifted");

        for (i, slot) in self.slots.iter().enumerate() {
            let Some(key) = slot.key() else { continue };
            // Reachable from its home slot, and at exactly this index.
            assert_eq!(self.locate(key), Probe::Found(i), "key at slot {} unreachable", i);
            for other in self.slots[i + 1..].iter().filter_map(Slot::key) {
                assert!(other != key, "duplicate key in table");
            }
        }
    }
}

impl<K, V, S> Clone for OpenAddressedMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            slots: self.slots.clone(),
            live: self.live,
            tombstones: self.tombstones,
        }
    }
}

impl<K, V, S> fmt::Debug for OpenAddressedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for OpenAddressedMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for OpenAddressedMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for OpenAddressedMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in OpenAddressedMap"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for OpenAddressedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts each pair; the first occurrence of a key wins.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OpenAddressedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Iterator over immutable entries in `OpenAddressedMap`.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(entry) = slot.entry() {
                self.remaining -= 1;
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over mutable entries in `OpenAddressedMap`.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(entry) = slot.entry_mut() {
                self.remaining -= 1;
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator, draining the table in slot order.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(entry) = slot.into_entry() {
                self.remaining -= 1;
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a OpenAddressedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OpenAddressedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for OpenAddressedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.slots.into_iter(),
            remaining: self.live,
        }
    }
}
