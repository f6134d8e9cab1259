use super::TreeMap;
use crate::comparator::Comparator;
use crate::raw::RawTreeMap;

impl<K: Ord + 'static, V> TreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before the node
    /// arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map: TreeMap<i32, i32> = TreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Comparator::natural())
    }
}

impl<K, V> TreeMap<K, V> {
    /// Creates an empty map ordered by `comparator` with room for at least `capacity`
    /// entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: Comparator<K>) -> Self {
        Self::from_raw(RawTreeMap::with_capacity(comparator, capacity))
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// Slots freed by removals are reused before the arena grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.borrow().capacity()
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let mut map = TreeMap::from([(1, 'a')]);
    /// map.reserve(10);
    /// assert!(map.capacity() >= 11);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.raw.borrow_mut().reserve(additional);
    }

    /// Releases unused trailing slots of the node arena.
    ///
    /// Slots freed in the middle of the arena are kept for reuse, so the capacity may stay
    /// above [`len`](Self::len).
    pub fn shrink_to_fit(&mut self) {
        self.raw.borrow_mut().shrink_to_fit();
    }
}
