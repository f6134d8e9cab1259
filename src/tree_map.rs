//! The owning map and the views and iterators derived from it.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::ops::Bound;

use crate::comparator::Comparator;
use crate::error::{Error, Result};
use crate::raw::{Handle, RawTreeMap, Search, Window};

mod capacity;
mod iter;
mod key_set;
mod order_statistic;
mod view;

pub use iter::{Iter, Keys, Values};
pub use key_set::KeySet;
pub use view::SubMap;

/// The tree behind a map, shared with every view and iterator taken from it.
pub(crate) type SharedTree<K, V> = Rc<RefCell<RawTreeMap<K, V>>>;

/// Turns a key and an inclusivity flag into a range bound.
pub(crate) fn bound<K>(key: K, inclusive: bool) -> Bound<K> {
    if inclusive { Bound::Included(key) } else { Bound::Excluded(key) }
}

/// An ordered map based on an [AVL tree].
///
/// Entries are kept in the order given by the map's [`Comparator`], which defaults to the
/// key's [`Ord`] implementation. Every node caches its height and the number of entries
/// below it, so lookups, navigation ([`floor_key`](Self::floor_key),
/// [`ceiling_key`](Self::ceiling_key) and friends), rank queries and view sizes all run in
/// O(log n).
///
/// Views returned by [`sub_map`](Self::sub_map), [`head_map`](Self::head_map),
/// [`tail_map`](Self::tail_map) and [`descending_map`](Self::descending_map) share this
/// map's tree. They hold no entries of their own: an insert through a view is an insert
/// into the map, and a view always reflects the map's current contents.
///
/// Because the tree is shared, reads hand out clones of keys and values rather than
/// references. Use [`lookup`](Self::lookup) to inspect a value in place.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative
/// to any other key changes while it is in the map, or for the comparator to be
/// inconsistent. The behavior resulting from such a logic error is not specified, but will
/// be encapsulated to the `TreeMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use avl_navmap::TreeMap;
///
/// let mut reviews = TreeMap::new();
/// reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// reviews.insert("Pulp Fiction", "Masterpiece.");
/// reviews.insert("The Godfather", "Very enjoyable.");
///
/// if !reviews.contains_key(&"Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.", reviews.len());
/// }
///
/// // Everything from "P" onwards, as a live view.
/// let later = reviews.tail_map("P", true);
/// assert_eq!(later.len(), 2);
/// reviews.remove(&"Pulp Fiction");
/// assert_eq!(later.len(), 1);
/// ```
///
/// Keys without an [`Ord`] implementation, such as floating-point numbers, need a
/// comparator:
///
/// ```
/// use avl_navmap::{Comparator, TreeMap};
///
/// let by_distance = Comparator::new(|a: &f64, b: &f64| a.total_cmp(b));
/// let mut planets = TreeMap::with_comparator(by_distance);
/// planets.insert(0.4, "Mercury");
/// planets.insert(1.0, "Earth");
/// planets.insert(0.7, "Venus");
/// planets.insert(1.5, "Mars");
///
/// assert_eq!(planets.floor_entry(&1.2), Some((1.0, "Earth")));
/// assert_eq!(planets.higher_key(&1.5), None);
/// ```
///
/// A `TreeMap` with a known list of items can be initialized from an array:
///
/// ```
/// use avl_navmap::TreeMap;
///
/// let map = TreeMap::from([(3, 'c'), (1, 'a'), (2, 'b')]);
/// assert_eq!(map.first_key(), Ok(1));
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct TreeMap<K, V> {
    raw: SharedTree<K, V>,
}

impl<K: Ord + 'static, V> TreeMap<K, V> {
    /// Makes a new, empty `TreeMap` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }

    /// Builds a map from entries that are already in strictly ascending key order.
    ///
    /// The tree is built directly in perfectly balanced shape, with no comparisons beyond
    /// the ordering check and no rotations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsorted`] with the position of the first entry whose key does not
    /// sort strictly after its predecessor.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::{Error, TreeMap};
    ///
    /// let map = TreeMap::from_sorted([(1, "a"), (2, "b"), (3, "c"), (4, "d")])?;
    /// assert_eq!(map.height(), 3);
    ///
    /// let err = TreeMap::from_sorted([(1, "a"), (1, "b")]).unwrap_err();
    /// assert_eq!(err, Error::Unsorted { index: 1 });
    /// # Ok::<(), Error>(())
    /// ```
    pub fn from_sorted<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_sorted_with(Comparator::natural(), entries)
    }
}

impl<K, V> TreeMap<K, V> {
    /// Makes a new, empty `TreeMap` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::{Comparator, TreeMap};
    ///
    /// let mut map = TreeMap::with_comparator(Comparator::<i32>::natural().reversed());
    /// map.extend([(1, "a"), (2, "b")]);
    /// assert_eq!(map.first_key(), Ok(2));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: Comparator<K>) -> Self {
        Self::from_raw(RawTreeMap::new(comparator))
    }

    /// Builds a map ordered by `comparator` from entries already strictly ascending under
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsorted`] if the entries are not strictly ascending.
    pub fn from_sorted_with<I>(comparator: Comparator<K>, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let raw = RawTreeMap::from_sorted(comparator, entries.into_iter().collect())?;
        Ok(Self::from_raw(raw))
    }

    /// Builds a map ordered by `comparator` from entries in any order.
    ///
    /// The entries are sorted once and the tree is bulk-loaded. When a key repeats, the
    /// map keeps the first key and the last value, as a sequence of inserts would.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    pub fn from_unordered_with<I>(comparator: Comparator<K>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_raw(RawTreeMap::from_unordered(comparator, entries.into_iter().collect()))
    }

    fn from_raw(raw: RawTreeMap<K, V>) -> Self {
        Self {
            raw: Rc::new(RefCell::new(raw)),
        }
    }

    /// Returns the comparator that orders this map.
    #[must_use]
    pub fn comparator(&self) -> Comparator<K> {
        self.raw.borrow().comparator().clone()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let mut a = TreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.borrow().len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.borrow().is_empty()
    }

    /// Clears the map, removing all elements.
    ///
    /// Every view of the map becomes empty, and every live iterator goes stale.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.borrow_mut().clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned. If it did, the value
    /// is updated and the old value is returned; the stored key is left untouched and the
    /// change does not count as a structural modification, so live iterators stay valid.
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
    /// let mut map = TreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map.get(&37), Some("c"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.borrow_mut().insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key was
    /// previously in the map.
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
    /// let mut map = TreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key was
    /// previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.raw.borrow_mut().remove(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// This is the reliable existence check: [`get`](Self::get) returning `None` means the
    /// same thing, but a map whose values are themselves `Option`s can store `None`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.borrow().find(key).is_some()
    }

    /// Calls `f` with a reference to the value stored for `key`, without cloning it.
    ///
    /// The map is borrowed while `f` runs; calling back into the same map or any of its
    /// views from `f` to mutate it panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([(1, String::from("one"))]);
    /// assert_eq!(map.lookup(&1, String::len), Some(3));
    /// assert_eq!(map.lookup(&2, String::len), None);
    /// ```
    pub fn lookup<R, F>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let raw = self.raw.borrow();
        raw.find(key).map(|handle| f(raw.node(handle).value()))
    }

    /// Calls `f` with a mutable reference to the value stored for `key`.
    ///
    /// Changing a value in place is not a structural modification.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let mut map = TreeMap::from([("hits", 1)]);
    /// map.lookup_mut(&"hits", |hits| *hits += 1);
    /// assert_eq!(map.get(&"hits"), Some(2));
    /// ```
    pub fn lookup_mut<R, F>(&mut self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut raw = self.raw.borrow_mut();
        let handle = raw.find(key)?;
        Some(f(raw.node_mut(handle).value_mut()))
    }

    /// Removes and returns the first element in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let mut map = TreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.borrow_mut().pop_edge(false)
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.borrow_mut().pop_edge(true)
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    ///
    /// An AVL tree of `n` entries is never taller than about `1.44 * log2(n + 2)`.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.borrow().height()
    }

    /// Checks the tree's ordering, balance and cached subtree metrics.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violation found.
    pub fn assert_invariants(&self) {
        self.raw.borrow().assert_invariants();
    }

    // ─── Views ──────────────────────────────────────────────────────────────

    fn view(&self, window: Window<K>) -> SubMap<K, V> {
        SubMap::new(Rc::clone(&self.raw), window)
    }

    /// Returns a view of the entries whose keys range from `from` to `to`.
    ///
    /// The view shares this map's tree. Inserting or removing a key outside the range
    /// through the view fails with [`Error::KeyOutOfRange`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `from` sorts after `to`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map: TreeMap<i32, char> = (1..=9).zip('a'..).collect();
    /// let view = map.sub_map(3, true, 7, false)?;
    /// assert_eq!(view.len(), 4);
    /// assert_eq!(view.first_key(), Ok(3));
    /// assert_eq!(view.last_key(), Ok(6));
    /// assert!(map.sub_map(7, true, 3, true).is_err());
    /// # Ok::<(), avl_navmap::Error>(())
    /// ```
    pub fn sub_map(&self, from: K, from_inclusive: bool, to: K, to_inclusive: bool) -> Result<SubMap<K, V>> {
        let window = {
            let raw = self.raw.borrow();
            Window::bounded(raw.comparator(), bound(from, from_inclusive), bound(to, to_inclusive), false)?
        };
        Ok(self.view(window))
    }

    /// Returns a view of the entries whose keys sort before `to`, or at it when
    /// `inclusive` is set.
    #[must_use]
    pub fn head_map(&self, to: K, inclusive: bool) -> SubMap<K, V> {
        self.view(Window::below(bound(to, inclusive), false))
    }

    /// Returns a view of the entries whose keys sort after `from`, or at it when
    /// `inclusive` is set.
    #[must_use]
    pub fn tail_map(&self, from: K, inclusive: bool) -> SubMap<K, V> {
        self.view(Window::above(bound(from, inclusive), false))
    }

    /// Returns a view of the whole map in descending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
    /// let reversed = map.descending_map();
    /// assert_eq!(reversed.first_key(), Ok(3));
    /// assert_eq!(reversed.higher_key(&2), Some(1));
    /// ```
    #[must_use]
    pub fn descending_map(&self) -> SubMap<K, V> {
        self.view(Window::full(true))
    }

    /// Returns a view of the map's keys in ascending order.
    ///
    /// Removing a key from the set removes its entry from the map.
    #[must_use]
    pub fn navigable_key_set(&self) -> KeySet<K, V> {
        KeySet::new(self.view(Window::full(false)))
    }

    /// Alias for [`navigable_key_set`](Self::navigable_key_set).
    #[must_use]
    pub fn key_set(&self) -> KeySet<K, V> {
        self.navigable_key_set()
    }

    /// Returns a view of the map's keys in descending order.
    #[must_use]
    pub fn descending_key_set(&self) -> KeySet<K, V> {
        KeySet::new(self.view(Window::full(true)))
    }

    // ─── Iteration ──────────────────────────────────────────────────────────

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// Items are `Err` once the map has been structurally modified other than through
    /// this iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let entries: Vec<_> = map.iter().collect::<Result<_, _>>()?;
    /// assert_eq!(entries, [(1, "a"), (2, "b"), (3, "c")]);
    /// # Ok::<(), avl_navmap::Error>(())
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(Rc::clone(&self.raw), Window::full(false))
    }

    /// Gets an iterator over the entries of the map in descending key order.
    #[must_use]
    pub fn iter_rev(&self) -> Iter<K, V> {
        Iter::new(Rc::clone(&self.raw), Window::full(true))
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    #[must_use]
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(Rc::clone(&self.raw), Window::full(false))
    }

    /// Gets an iterator over the values of the map, in order by key.
    #[must_use]
    pub fn values(&self) -> Values<K, V> {
        Values::new(Rc::clone(&self.raw), Window::full(false))
    }
}

impl<K: Clone, V> TreeMap<K, V> {
    fn key_where<F>(&self, locate: F) -> Option<K>
    where
        F: FnOnce(&RawTreeMap<K, V>) -> Option<Handle>,
    {
        let raw = self.raw.borrow();
        locate(&raw).map(|handle| raw.key_of(handle))
    }

    /// Returns the lowest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`] if the map is empty.
    pub fn first_key(&self) -> Result<K> {
        self.key_where(|raw| raw.edge(false)).ok_or(Error::NoSuchElement)
    }

    /// Returns the highest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`] if the map is empty.
    pub fn last_key(&self) -> Result<K> {
        self.key_where(|raw| raw.edge(true)).ok_or(Error::NoSuchElement)
    }

    /// Returns the greatest key strictly less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map = TreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.lower_key(&20), Some(10));
    /// assert_eq!(map.floor_key(&20), Some(20));
    /// assert_eq!(map.ceiling_key(&25), Some(30));
    /// assert_eq!(map.higher_key(&30), None);
    /// ```
    #[must_use]
    pub fn lower_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw| raw.search(key, Search::Lower, false))
    }

    /// Returns the greatest key less than or equal to `key`.
    #[must_use]
    pub fn floor_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw| raw.search(key, Search::Floor, false))
    }

    /// Returns the least key greater than or equal to `key`.
    #[must_use]
    pub fn ceiling_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw| raw.search(key, Search::Ceiling, false))
    }

    /// Returns the least key strictly greater than `key`.
    #[must_use]
    pub fn higher_key(&self, key: &K) -> Option<K> {
        self.key_where(|raw| raw.search(key, Search::Higher, false))
    }
}

impl<K: Clone, V: Clone> TreeMap<K, V> {
    fn entry_where<F>(&self, locate: F) -> Option<(K, V)>
    where
        F: FnOnce(&RawTreeMap<K, V>) -> Option<Handle>,
    {
        let raw = self.raw.borrow();
        locate(&raw).map(|handle| raw.entry_of(handle))
    }

    /// Returns a copy of the value corresponding to the key.
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
    /// let mut map = TreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some("a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.lookup(key, V::clone)
    }

    /// Returns the stored key and a copy of the value corresponding to `key`.
    ///
    /// Useful when distinct keys can compare equal under the map's comparator.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw| raw.find(key))
    }

    /// Returns the entry with the lowest key.
    #[must_use]
    pub fn first_entry(&self) -> Option<(K, V)> {
        self.entry_where(|raw| raw.edge(false))
    }

    /// Returns the entry with the highest key.
    #[must_use]
    pub fn last_entry(&self) -> Option<(K, V)> {
        self.entry_where(|raw| raw.edge(true))
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    #[must_use]
    pub fn lower_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw| raw.search(key, Search::Lower, false))
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    #[must_use]
    pub fn floor_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw| raw.search(key, Search::Floor, false))
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    #[must_use]
    pub fn ceiling_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw| raw.search(key, Search::Ceiling, false))
    }

    /// Returns the entry with the least key strictly greater than `key`.
    #[must_use]
    pub fn higher_entry(&self, key: &K) -> Option<(K, V)> {
        self.entry_where(|raw| raw.search(key, Search::Higher, false))
    }

    /// Copies every entry into a vector, in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)> {
        let raw = self.raw.borrow();
        raw.in_order().map(|node| (node.key().clone(), node.value().clone())).collect()
    }
}

impl<K, V: PartialEq> TreeMap<K, V> {
    /// Returns `true` if any entry holds a value equal to `value`.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.raw.borrow().in_order().any(|node| node.value() == value)
    }
}

impl<K: Clone, V: Clone> Clone for TreeMap<K, V> {
    /// Copies the whole tree. The clone shares the comparator but nothing else: views and
    /// iterators of the original do not see the copy.
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.borrow().clone())
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for TreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.raw.borrow(), other.raw.borrow());
        a.len() == b.len()
            && a.in_order().zip(b.in_order()).all(|(x, y)| x.key() == y.key() && x.value() == y.value())
    }
}

impl<K: Eq, V: Eq> Eq for TreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw.borrow();
        f.debug_map().entries(raw.in_order().map(|node| (node.key(), node.value()))).finish()
    }
}

impl<K: Ord + 'static, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + 'static, V> FromIterator<(K, V)> for TreeMap<K, V> {
    /// Sorts the entries once and bulk-loads them. Later duplicates overwrite earlier
    /// values.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_unordered_with(Comparator::natural(), iter)
    }
}

impl<K, V> Extend<(K, V)> for TreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let mut raw = self.raw.borrow_mut();
        for (key, value) in iter {
            raw.insert(key, value);
        }
    }
}

impl<K: Ord + 'static, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K: Clone, V: Clone> IntoIterator for &TreeMap<K, V> {
    type Item = Result<(K, V)>;
    type IntoIter = Iter<K, V>;

    fn into_iter(self) -> Iter<K, V> {
        self.iter()
    }
}
