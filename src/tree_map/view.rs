use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::ops::Bound;

use tracing::debug;

use super::iter::{Iter, Keys, Values};
use super::key_set::KeySet;
use super::{SharedTree, bound};
use crate::comparator::Comparator;
use crate::error::{Error, Result};
use crate::raw::{Handle, RawTreeMap, Search, Traversal, Window};

/// A live view over a key range of a [`TreeMap`](super::TreeMap), in ascending or
/// descending order.
///
/// A `SubMap` holds no entries. It shares the tree of the map it came from, so every
/// change made through the map, through this view or through any other view is visible
/// here at once. Operations take keys and bounds in the view's own iteration order: on a
/// descending view, [`first_key`](Self::first_key) is the greatest key in range and
/// [`higher_key`](Self::higher_key) moves towards smaller keys.
///
/// Views keep the tree alive: dropping the map does not invalidate them.
///
/// # Examples
///
/// ```
/// use avl_navmap::{Error, TreeMap};
///
/// let map: TreeMap<i32, ()> = (0..10).map(|k| (k, ())).collect();
/// let mut middle = map.sub_map(2, true, 6, true)?.descending_map();
///
/// assert_eq!(middle.first_key(), Ok(6));
/// assert_eq!(middle.higher_key(&4), Some(3));
/// assert_eq!(middle.insert(9, ()), Err(Error::KeyOutOfRange));
///
/// // Bounds of nested views follow the view's order: 5 down to 3.
/// let inner = middle.sub_map(5, true, 3, true)?;
/// assert_eq!(inner.len(), 3);
/// # Ok::<(), Error>(())
/// ```
pub struct SubMap<K, V> {
    tree: SharedTree<K, V>,
    window: Window<K>,
    // (modification count, size) as of the last `len` call.
    len_cache: Cell<Option<(usize, usize)>>,
}

impl<K, V> SubMap<K, V> {
    pub(crate) fn new(tree: SharedTree<K, V>, window: Window<K>) -> Self {
        Self {
            tree,
            window,
            len_cache: Cell::new(None),
        }
    }

    fn check_range(&self, raw: &RawTreeMap<K, V>, key: &K) -> Result<()> {
        if self.window.contains(raw.comparator(), key) {
            Ok(())
        } else {
            debug!(descending = self.window.is_descending(), "rejected key outside view bounds");
            Err(Error::KeyOutOfRange)
        }
    }

    /// Returns the comparator giving this view's iteration order.
    ///
    /// For a descending view this is the map's comparator reversed.
    #[must_use]
    pub fn comparator(&self) -> Comparator<K> {
        let comparator = self.tree.borrow().comparator().clone();
        if self.window.is_descending() { comparator.reversed() } else { comparator }
    }

    /// Returns `true` if this view iterates in descending key order.
    #[must_use]
    pub fn is_descending(&self) -> bool {
        self.window.is_descending()
    }

    /// Returns the number of entries in range.
    ///
    /// Counted from cached subtree sizes in O(log n), and remembered until the tree is
    /// next structurally modified.
    #[must_use]
    pub fn len(&self) -> usize {
        let raw = self.tree.borrow();
        let mod_count = raw.mod_count();
        if let Some((seen, len)) = self.len_cache.get()
            && seen == mod_count
        {
            return len;
        }
        let len = raw.window_len(&self.window);
        self.len_cache.set(Some((mod_count, len)));
        len
    }

    /// Returns `true` if no entry of the map falls in range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.borrow().window_first(&self.window).is_none()
    }

    /// Returns `true` if `key` is in range and present in the map.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        let raw = self.tree.borrow();
        self.window.contains(raw.comparator(), key) && raw.find(key).is_some()
    }

    /// Calls `f` with a reference to the value stored for `key`, if `key` is in range.
    pub fn lookup<R, F>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let raw = self.tree.borrow();
        if !self.window.contains(raw.comparator(), key) {
            return None;
        }
        raw.find(key).map(|handle| f(raw.node(handle).value()))
    }

    /// Inserts a key-value pair into the underlying map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`] if `key` lies outside this view; the map is left
    /// untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let mut raw = self.tree.borrow_mut();
        self.check_range(&raw, &key)?;
        Ok(raw.insert(key, value))
    }

    /// Removes `key` from the underlying map, returning its value if it was present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`] if `key` lies outside this view.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        let mut raw = self.tree.borrow_mut();
        self.check_range(&raw, key)?;
        Ok(raw.remove(key).map(|(_, value)| value))
    }
}

impl<K: Clone, V> SubMap<K, V> {
    fn key_where<F>(&self, locate: F) -> Option<K>
    where
        F: FnOnce(&RawTreeMap<K, V>, &Window<K>) -> Option<Handle>,
    {
        let raw = self.tree.borrow();
        locate(&raw, &self.window).map(|handle| raw.key_of(handle))
    }

    fn nested(&self, from: Bound<K>, to: Bound<K>) -> Result<Self> {
        let window = self.window.narrowed(self.tree.borrow().comparator(), from, to)?;
        Ok(Self::new(Rc::clone(&self.tree), window))
    }

    /// Returns the first key in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`] if the view is empty.
    pub fn first_key(&self) -> Result<K> {
        self.key_where(RawTreeMap::window_first).ok_or(Error::NoSuchElement)
    }

    /// Returns the last key in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`] if the view is empty.
    pub fn last_key(&self) -> Result<K> {
        self.key_where(RawTreeMap::window_last).ok_or(Error::NoSuchElement)
    }

    /// Returns the closest key in range that comes strictly before `key`.
    #[must_use]
    pub fn lower_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw, window| raw.window_search(window, key, Search::Lower))
    }

    /// Returns the closest key in range at or before `key`.
    #[must_use]
    pub fn floor_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw, window| raw.window_search(window, key, Search::Floor))
    }

    /// Returns the closest key in range at or after `key`.
    #[must_use]
    pub fn ceiling_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw, window| raw.window_search(window, key, Search::Ceiling))
    }

    /// Returns the closest key in range that comes strictly after `key`.
    #[must_use]
    pub fn higher_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw, window| raw.window_search(window, key, Search::Higher))
    }

    /// Removes and returns the first entry in iteration order.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.borrow_mut().pop_window(&self.window, false)
    }

    /// Removes and returns the last entry in iteration order.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.borrow_mut().pop_window(&self.window, true)
    }

    /// Removes every entry in range from the underlying map. Entries outside the range
    /// are kept.
    pub fn clear(&mut self) {
        let mut raw = self.tree.borrow_mut();
        if self.window.is_full() {
            raw.clear();
            return;
        }
        let mut removed = 0_usize;
        while raw.pop_window(&self.window, false).is_some() {
            removed += 1;
        }
        debug!(removed, "cleared view");
    }

    /// Gets an iterator over the entries in range, in this view's order.
    #[must_use]
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(Rc::clone(&self.tree), self.window.clone())
    }

    /// Gets an iterator over the entries in range, against this view's order.
    #[must_use]
    pub fn iter_rev(&self) -> Iter<K, V> {
        Iter::new(Rc::clone(&self.tree), self.window.reversed())
    }

    /// Gets an iterator over the keys in range, in this view's order.
    #[must_use]
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(Rc::clone(&self.tree), self.window.clone())
    }

    /// Gets an iterator over the values in range, in this view's order.
    #[must_use]
    pub fn values(&self) -> Values<K, V> {
        Values::new(Rc::clone(&self.tree), self.window.clone())
    }

    /// Returns a view of the part of this view ranging from `from` to `to`, both given in
    /// this view's order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `from` comes after `to` in this view's order,
    /// or if the range does not overlap this view.
    pub fn sub_map(&self, from: K, from_inclusive: bool, to: K, to_inclusive: bool) -> Result<Self> {
        self.nested(bound(from, from_inclusive), bound(to, to_inclusive))
    }

    /// Returns a view of the part of this view that comes before `to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the result would not overlap this view.
    pub fn head_map(&self, to: K, inclusive: bool) -> Result<Self> {
        self.nested(Bound::Unbounded, bound(to, inclusive))
    }

    /// Returns a view of the part of this view that comes after `from`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the result would not overlap this view.
    pub fn tail_map(&self, from: K, inclusive: bool) -> Result<Self> {
        self.nested(bound(from, inclusive), Bound::Unbounded)
    }

    /// Returns the same range in the opposite order.
    #[must_use]
    pub fn descending_map(&self) -> Self {
        Self::new(Rc::clone(&self.tree), self.window.reversed())
    }

    /// Returns the keys of this view as a set, in this view's order.
    #[must_use]
    pub fn navigable_key_set(&self) -> KeySet<K, V> {
        KeySet::new(self.clone())
    }

    /// Alias for [`navigable_key_set`](Self::navigable_key_set).
    #[must_use]
    pub fn key_set(&self) -> KeySet<K, V> {
        self.navigable_key_set()
    }

    /// Returns the keys of this view as a set, in the opposite order.
    #[must_use]
    pub fn descending_key_set(&self) -> KeySet<K, V> {
        KeySet::new(self.descending_map())
    }
}

impl<K: Clone, V: Clone> SubMap<K, V> {
    fn entry_where<F>(&self, locate: F) -> Option<(K, V)>
    where
        F: FnOnce(&RawTreeMap<K, V>, &Window<K>) -> Option<Handle>,
    {
        let raw = self.tree.borrow();
        locate(&raw, &self.window).map(|handle| raw.entry_of(handle))
    }

    /// Returns a copy of the value for `key`, or `None` if `key` is absent or out of range.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.lookup(key, V::clone)
    }

    /// Returns the first entry in iteration order.
    #[must_use]
    pub fn first_entry(&self) -> Option<(K, V)> {
        self.entry_where(RawTreeMap::window_first)
    }

    /// Returns the last entry in iteration order.
    #[must_use]
    pub fn last_entry(&self) -> Option<(K, V)> {
        self.entry_where(RawTreeMap::window_last)
    }

    /// Entry counterpart of [`lower_key`](Self::lower_key).
    #[must_use]
    pub fn lower_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw, window| raw.window_search(window, key, Search::Lower))
    }

    /// Entry counterpart of [`floor_key`](Self::floor_key).
    #[must_use]
    pub fn floor_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw, window| raw.window_search(window, key, Search::Floor))
    }

    /// Entry counterpart of [`ceiling_key`](Self::ceiling_key).
    #[must_use]
    pub fn ceiling_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw, window| raw.window_search(window, key, Search::Ceiling))
    }

    /// Entry counterpart of [`higher_key`](Self::higher_key).
    #[must_use]
    pub fn higher_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw, window| raw.window_search(window, key, Search::Higher))
    }

    /// Copies every entry in range into a vector, in this view's order.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)> {
        let raw = self.tree.borrow();
        let mut traversal = Traversal::seek(&raw, &self.window);
        let mut entries = Vec::with_capacity(self.len_cache.get().map_or(0, |(_, len)| len));
        while let Some(handle) = traversal.step(&raw) {
            entries.push(raw.entry_of(handle));
        }
        entries
    }
}

impl<K: Clone, V> Clone for SubMap<K, V> {
    /// Another view of the same range of the same tree.
    fn clone(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            window: self.window.clone(),
            len_cache: self.len_cache.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SubMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.tree.borrow();
        let mut traversal = Traversal::seek(&raw, &self.window);
        let mut map = f.debug_map();
        while let Some(handle) = traversal.step(&raw) {
            let node = raw.node(handle);
            map.entry(node.key(), node.value());
        }
        map.finish()
    }
}

impl<K: Clone, V: Clone> IntoIterator for &SubMap<K, V> {
    type Item = Result<(K, V)>;
    type IntoIter = Iter<K, V>;

    fn into_iter(self) -> Iter<K, V> {
        self.iter()
    }
}
