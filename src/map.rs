//! Ordered map type for generic CBOR map destinations.
//!
//! This module provides [`CborMap`], a wrapper around [`IndexMap`] keyed by
//! [`Key`]. Wire order of pairs is preserved on decode, and a duplicate key
//! replaces the earlier entry (last write wins), matching the behaviour of a
//! host-language map populated pair by pair.
//!
//! ## Why IndexMap?
//!
//! - **Order preservation**: generic destinations observe map pairs in wire
//!   order.
//! - **Last-write-wins**: `insert` on an existing key overwrites the value in
//!   place.
//! - **Deterministic output**: re-encoding a decoded map emits pairs in a
//!   stable order.
//!
//! ## Examples
//!
//! ```rust
//! use cbor_codec::{CborMap, Key, Value};
//!
//! let mut map = CborMap::new();
//! map.insert(Key::from("name"), Value::from("Alice"));
//! map.insert(Key::from(3), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&Key::from("name")).and_then(|v| v.as_str()), Some("Alice"));
//! ```

use indexmap::IndexMap;

use crate::CborValue;

/// A CBOR map key.
///
/// CBOR permits any item as a map key; for generic destinations this crate
/// accepts the hashable scalar kinds (booleans, integers, text, and byte
/// strings), which covers every key the encoder can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Integer(i128),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Integer(value as i128)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Integer(value as i128)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Integer(value as i128)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key::Integer(value as i128)
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::Bytes(value)
    }
}

/// An ordered map of CBOR keys to CBOR values.
///
/// A thin wrapper around [`IndexMap`] that preserves insertion (wire) order.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::{CborMap, Key, Value};
///
/// let mut map = CborMap::new();
/// map.insert(Key::from("first"), Value::from(1));
/// map.insert(Key::from("second"), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec![Key::from("first"), Key::from("second")]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CborMap(IndexMap<Key, CborValue>);

impl CborMap {
    /// Creates an empty `CborMap`.
    #[must_use]
    pub fn new() -> Self {
        CborMap(IndexMap::new())
    }

    /// Creates an empty `CborMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        CborMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the value is replaced in place
    /// (the earlier pair's position is kept) and the old value is returned.
    pub fn insert(&mut self, key: Key, value: CborValue) -> Option<CborValue> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&CborValue> {
        self.0.get(key)
    }

    /// Returns a reference to the value stored under a text key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbor_codec::{CborMap, Key, Value};
    ///
    /// let mut map = CborMap::new();
    /// map.insert(Key::from("k"), Value::from(42));
    /// assert_eq!(map.get_text("k").and_then(|v| v.as_i64()), Some(42));
    /// ```
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&CborValue> {
        self.0.get(&Key::Text(key.to_string()))
    }

    /// Returns the number of pairs in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in wire order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, CborValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in wire order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, CborValue> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in wire order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, CborValue> {
        self.0.iter()
    }
}

impl IntoIterator for CborMap {
    type Item = (Key, CborValue);
    type IntoIter = indexmap::map::IntoIter<Key, CborValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Key, CborValue)> for CborMap {
    fn from_iter<T: IntoIterator<Item = (Key, CborValue)>>(iter: T) -> Self {
        CborMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut map = CborMap::new();
        map.insert(Key::from("k"), CborValue::from(1));
        let old = map.insert(Key::from("k"), CborValue::from(2));
        assert_eq!(old, Some(CborValue::from(1)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_text("k").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut map = CborMap::new();
        map.insert(Key::from(2), CborValue::Null);
        map.insert(Key::from("a"), CborValue::Null);
        map.insert(Key::from(1), CborValue::Null);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from(2), Key::from("a"), Key::from(1)]);
    }

    #[test]
    fn mixed_key_kinds_do_not_collide() {
        let mut map = CborMap::new();
        map.insert(Key::Integer(1), CborValue::from("int"));
        map.insert(Key::Text("1".to_string()), CborValue::from("text"));
        assert_eq!(map.len(), 2);
    }
}
