use super::TreeMap;

impl<K, V> TreeMap<K, V> {
    /// Returns the zero-based rank of `key` in ascending order, or `None` if the key is
    /// not present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([("a", 10), ("c", 30), ("b", 20)]);
    /// assert_eq!(map.rank_of(&"c"), Some(2));
    /// assert_eq!(map.rank_of(&"d"), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.raw.borrow().rank_of(key)
    }
}

impl<K: Clone, V: Clone> TreeMap<K, V> {
    /// Returns the entry at position `rank` in ascending order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([("a", 10), ("c", 30), ("b", 20)]);
    /// assert_eq!(map.get_by_rank(1), Some(("b", 20)));
    /// assert_eq!(map.get_by_rank(3), None);
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(K, V)> {
        let raw = self.raw.borrow();
        raw.select(rank).map(|handle| raw.entry_of(handle))
    }
}
