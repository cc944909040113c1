use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt::{self, Formatter};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::OpenAddressedMap;

struct MapVisitor<K, V, S> {
    _marker: PhantomData<OpenAddressedMap<K, V, S>>,
}

impl<K, V, S> Serialize for OpenAddressedMap<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        serializer.collect_map(self)
    }
}

impl<'de, K, V, S> Deserialize<'de> for OpenAddressedMap<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: Default + BuildHasher,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor::new())
    }
}

impl<K, V, S> MapVisitor<K, V, S> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<'de, K, V, S> Visitor<'de> for MapVisitor<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: Default + BuildHasher,
{
    type Value = OpenAddressedMap<K, V, S>;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a map")
    }

    // Duplicate keys in the input keep their first value, as with `insert`.
    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = OpenAddressedMap::with_hasher(S::default());
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod test {
    use crate::OpenAddressedMap;

    #[test]
    fn test_map() {
        let mut map: OpenAddressedMap<u8, u8> = OpenAddressedMap::new();
        map.insert(0, 4);
        map.insert(1, 3);
        map.insert(2, 2);
        map.insert(3, 1);
        map.insert(4, 0);
        map.erase(&2);

        let serialized = serde_json::to_string(&map).unwrap();
        let deserialized: OpenAddressedMap<u8, u8> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(map, deserialized);
        assert_eq!(deserialized.len(), 4);
        assert_eq!(deserialized.tombstones(), 0);
    }

    #[test]
    fn duplicate_keys_keep_first_value() {
        let map: OpenAddressedMap<String, i32> =
            serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&1));
    }
}
