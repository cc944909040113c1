//! Slot: one cell of the open-addressed table.

/// State tag of a slot, as observed by probe scans.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    Empty,
    Occupied,
    Deleted,
}

/// A table cell. Only `Occupied` carries a key and value; a `Deleted` slot
/// is a tombstone that keeps match scans going but accepts new entries.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied {
        key: K,
        value: V,
    },
    Deleted,
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn status(&self) -> Status {
        match self {
            Slot::Empty => Status::Empty,
            Slot::Occupied { .. } => Status::Occupied,
            Slot::Deleted => Status::Deleted,
        }
    }

    /// True for slots an insertion may claim.
    #[inline]
    pub(crate) fn is_insertable(&self) -> bool {
        !matches!(self, Slot::Occupied { .. })
    }

    #[cfg(test)]
    pub(crate) fn key(&self) -> Option<&K> {
        match self {
            Slot::Occupied { key, .. } => Some(key),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value } => Some((&*key, value)),
            _ => None,
        }
    }

    /// Turns an occupied slot into a tombstone, handing back its contents.
    /// Any other slot is left untouched.
    pub(crate) fn take(&mut self) -> Option<(K, V)> {
        if !matches!(self, Slot::Occupied { .. }) {
            return None;
        }
        match core::mem::replace(self, Slot::Deleted) {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => unreachable!("slot checked occupied above"),
        }
    }

    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        match self {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }
}
