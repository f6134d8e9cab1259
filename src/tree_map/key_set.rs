use alloc::vec::Vec;
use core::fmt;

use super::iter::Keys;
use super::view::SubMap;
use crate::comparator::Comparator;
use crate::error::Result;

/// The keys of a [`TreeMap`](super::TreeMap) or of one of its views, as an ordered set.
///
/// A `KeySet` is a thin projection over a [`SubMap`]: it stores nothing and forwards every
/// operation to the map view underneath, so removing a key from the set removes the entry
/// from the map. Keys cannot be added through a set.
///
/// # Examples
///
/// ```
/// use avl_navmap::TreeMap;
///
/// let map = TreeMap::from([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')]);
/// let mut keys = map.descending_key_set();
///
/// assert_eq!(keys.first(), Ok(4));
/// assert_eq!(keys.ceiling(&0), None);
/// assert_eq!(keys.pop_first(), Some(4));
/// assert!(!map.contains_key(&4));
/// ```
pub struct KeySet<K, V> {
    map: SubMap<K, V>,
}

impl<K, V> KeySet<K, V> {
    pub(crate) fn new(map: SubMap<K, V>) -> Self {
        Self { map }
    }

    /// Returns the comparator giving this set's iteration order.
    #[must_use]
    pub fn comparator(&self) -> Comparator<K> {
        self.map.comparator()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key` and its entry from the map. Returns whether the key was present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`](crate::Error::KeyOutOfRange) if the set is a
    /// bounded view and `key` lies outside it.
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        self.map.remove(key).map(|value| value.is_some())
    }
}

impl<K: Clone, V> KeySet<K, V> {
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`](crate::Error::NoSuchElement) if the set is empty.
    pub fn first(&self) -> Result<K> {
        self.map.first_key()
    }

    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`](crate::Error::NoSuchElement) if the set is empty.
    pub fn last(&self) -> Result<K> {
        self.map.last_key()
    }

    #[must_use]
    pub fn lower(&self, key: &K) -> Option<K> {
        self.map.lower_key(key)
    }

    #[must_use]
    pub fn floor(&self, key: &K) -> Option<K> {
        self.map.floor_key(key)
    }

    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<K> {
        self.map.ceiling_key(key)
    }

    #[must_use]
    pub fn higher(&self, key: &K) -> Option<K> {
        self.map.higher_key(key)
    }

    pub fn pop_first(&mut self) -> Option<K> {
        self.map.pop_first().map(|(key, _)| key)
    }

    pub fn pop_last(&mut self) -> Option<K> {
        self.map.pop_last().map(|(key, _)| key)
    }

    /// Removes every key in the set, and its entry, from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Gets an iterator over the keys, in this set's order.
    #[must_use]
    pub fn iter(&self) -> Keys<K, V> {
        self.map.keys()
    }

    /// Gets an iterator over the keys against this set's order.
    #[must_use]
    pub fn descending_iter(&self) -> Keys<K, V> {
        self.map.descending_map().keys()
    }

    /// Returns the same keys in the opposite order.
    #[must_use]
    pub fn descending_set(&self) -> Self {
        Self::new(self.map.descending_map())
    }

    /// Returns the keys from `from` to `to`, given in this set's order.
    ///
    /// # Errors
    ///
    /// As for [`SubMap::sub_map`].
    pub fn sub_set(&self, from: K, from_inclusive: bool, to: K, to_inclusive: bool) -> Result<Self> {
        self.map.sub_map(from, from_inclusive, to, to_inclusive).map(Self::new)
    }

    /// Returns the keys that come before `to` in this set's order.
    ///
    /// # Errors
    ///
    /// As for [`SubMap::head_map`].
    pub fn head_set(&self, to: K, inclusive: bool) -> Result<Self> {
        self.map.head_map(to, inclusive).map(Self::new)
    }

    /// Returns the keys that come after `from` in this set's order.
    ///
    /// # Errors
    ///
    /// As for [`SubMap::tail_map`].
    pub fn tail_set(&self, from: K, inclusive: bool) -> Result<Self> {
        self.map.tail_map(from, inclusive).map(Self::new)
    }

    /// Copies the keys into a vector, in this set's order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<K> {
        // A fresh iterator cannot be stale before its first step.
        self.iter().map_while(Result::ok).collect()
    }
}

impl<K: Clone, V> Clone for KeySet<K, V> {
    fn clone(&self) -> Self {
        Self::new(self.map.clone())
    }
}

impl<K: Clone + fmt::Debug, V> fmt::Debug for KeySet<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.to_vec()).finish()
    }
}

impl<K: Clone, V> IntoIterator for &KeySet<K, V> {
    type Item = Result<K>;
    type IntoIter = Keys<K, V>;

    fn into_iter(self) -> Keys<K, V> {
        self.iter()
    }
}
