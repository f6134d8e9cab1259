use core::fmt;
use core::iter::FusedIterator;

use tracing::debug;

use super::SharedTree;
use crate::error::{Error, Result};
use crate::raw::{Node, Traversal, Window};

fn check_fresh(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        debug!(expected, found, "iterator observed a concurrent modification");
        Err(Error::ConcurrentModification { expected, found })
    }
}

/// Shared state of the map iterators: a walk over one window of the tree plus the
/// bookkeeping for fail-fast checks and iterator-initiated removal.
struct Cursor<K, V> {
    tree: SharedTree<K, V>,
    window: Window<K>,
    traversal: Traversal,
    expected_mod_count: usize,
    // Key of the last emitted entry, until it is removed.
    last: Option<K>,
}

impl<K, V> Cursor<K, V> {
    fn new(tree: SharedTree<K, V>, window: Window<K>) -> Self {
        let (traversal, expected_mod_count) = {
            let raw = tree.borrow();
            (Traversal::seek(&raw, &window), raw.mod_count())
        };
        Self {
            tree,
            window,
            traversal,
            expected_mod_count,
            last: None,
        }
    }

    fn has_next(&self) -> bool {
        !self.traversal.is_exhausted()
    }
}

impl<K: Clone, V> Cursor<K, V> {
    fn advance<T, F>(&mut self, export: F) -> Result<T>
    where
        F: FnOnce(&Node<K, V>) -> T,
    {
        if self.traversal.is_exhausted() {
            return Err(Error::NoSuchElement);
        }
        let raw = self.tree.borrow();
        check_fresh(self.expected_mod_count, raw.mod_count())?;
        let handle = self.traversal.step(&raw).ok_or(Error::NoSuchElement)?;
        let node = raw.node(handle);
        self.last = Some(node.key().clone());
        Ok(export(node))
    }

    /// Like `advance`, but ends the walk after the first error.
    fn next_with<T, F>(&mut self, export: F) -> Option<Result<T>>
    where
        F: FnOnce(&Node<K, V>) -> T,
    {
        if self.traversal.is_exhausted() {
            return None;
        }
        let item = self.advance(export);
        if item.is_err() {
            self.traversal.finish();
        }
        Some(item)
    }

    fn remove(&mut self) -> Result<(K, V)> {
        let Some(key) = self.last.take() else {
            return Err(Error::IllegalState);
        };
        let mut raw = self.tree.borrow_mut();
        if let Err(error) = check_fresh(self.expected_mod_count, raw.mod_count()) {
            self.last = Some(key);
            return Err(error);
        }
        let removed = raw.remove(&key).ok_or(Error::IllegalState)?;
        if !self.traversal.is_exhausted() {
            self.traversal = Traversal::resume_after(&raw, &self.window, &key);
        }
        self.expected_mod_count = raw.mod_count();
        Ok(removed)
    }
}

impl<K, V> fmt::Debug for Cursor<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("has_next", &self.has_next())
            .field("descending", &self.window.is_descending())
            .field("expected_mod_count", &self.expected_mod_count)
            .finish_non_exhaustive()
    }
}

/// An iterator over the entries of a [`TreeMap`](super::TreeMap) or one of its views.
///
/// This `struct` is created by the `iter` and `iter_rev` methods on
/// [`TreeMap`](super::TreeMap) and [`SubMap`](super::SubMap). Items are copies of the
/// entries, wrapped in `Ok`. If the tree is structurally modified by anything other than
/// [`Iter::remove`], the next item is [`Error::ConcurrentModification`] and the iterator
/// ends.
///
/// # Examples
///
/// ```
/// use avl_navmap::TreeMap;
///
/// let mut map = TreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some(Ok((1, "a"))));
///
/// map.insert(4, "d");
/// assert!(iter.next().unwrap().is_err());
/// assert_eq!(iter.next(), None);
/// ```
pub struct Iter<K, V> {
    cursor: Cursor<K, V>,
}

impl<K, V> Iter<K, V> {
    pub(crate) fn new(tree: SharedTree<K, V>, window: Window<K>) -> Self {
        Self {
            cursor: Cursor::new(tree, window),
        }
    }

    /// Returns `true` if the walk has not reached the end of its range.
    ///
    /// This does not check for concurrent modification.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }
}

impl<K: Clone, V: Clone> Iter<K, V> {
    /// Returns the next entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchElement`] once the range is exhausted, and
    /// [`Error::ConcurrentModification`] if the tree changed under the iterator.
    pub fn advance(&mut self) -> Result<(K, V)> {
        self.cursor.advance(|node| (node.key().clone(), node.value().clone()))
    }
}

impl<K: Clone, V> Iter<K, V> {
    /// Removes the entry most recently returned by this iterator from the map.
    ///
    /// The iterator stays valid and continues with the entry after the removed one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if nothing has been returned yet or the entry was
    /// already removed, and [`Error::ConcurrentModification`] if the tree changed under
    /// the iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_navmap::TreeMap;
    ///
    /// let map: TreeMap<i32, i32> = (1..=6).map(|k| (k, k * k)).collect();
    /// let mut iter = map.iter();
    /// while let Some(entry) = iter.next() {
    ///     let (key, _) = entry?;
    ///     if key % 2 == 0 {
    ///         iter.remove()?;
    ///     }
    /// }
    /// assert_eq!(map.keys().collect::<Result<Vec<_>, _>>()?, [1, 3, 5]);
    /// # Ok::<(), avl_navmap::Error>(())
    /// ```
    pub fn remove(&mut self) -> Result<(K, V)> {
        self.cursor.remove()
    }
}

impl<K: Clone, V: Clone> Iterator for Iter<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_with(|node| (node.key().clone(), node.value().clone()))
    }
}

impl<K: Clone, V: Clone> FusedIterator for Iter<K, V> {}

impl<K, V> fmt::Debug for Iter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.cursor).finish()
    }
}

/// An iterator over the keys of a [`TreeMap`](super::TreeMap), a view, or a
/// [`KeySet`](super::KeySet).
///
/// Fail-fast in the same way as [`Iter`].
pub struct Keys<K, V> {
    cursor: Cursor<K, V>,
}

impl<K, V> Keys<K, V> {
    pub(crate) fn new(tree: SharedTree<K, V>, window: Window<K>) -> Self {
        Self {
            cursor: Cursor::new(tree, window),
        }
    }

    /// Returns `true` if the walk has not reached the end of its range.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }
}

impl<K: Clone, V> Keys<K, V> {
    /// Returns the next key.
    ///
    /// # Errors
    ///
    /// As for [`Iter::advance`].
    pub fn advance(&mut self) -> Result<K> {
        self.cursor.advance(|node| node.key().clone())
    }

    /// Removes the entry whose key was most recently returned, and returns its value.
    ///
    /// # Errors
    ///
    /// As for [`Iter::remove`].
    pub fn remove(&mut self) -> Result<V> {
        self.cursor.remove().map(|(_, value)| value)
    }
}

impl<K: Clone, V> Iterator for Keys<K, V> {
    type Item = Result<K>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_with(|node| node.key().clone())
    }
}

impl<K: Clone, V> FusedIterator for Keys<K, V> {}

impl<K, V> fmt::Debug for Keys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keys").field(&self.cursor).finish()
    }
}

/// An iterator over the values of a [`TreeMap`](super::TreeMap) or a view, in key order.
///
/// Fail-fast in the same way as [`Iter`].
pub struct Values<K, V> {
    cursor: Cursor<K, V>,
}

impl<K, V> Values<K, V> {
    pub(crate) fn new(tree: SharedTree<K, V>, window: Window<K>) -> Self {
        Self {
            cursor: Cursor::new(tree, window),
        }
    }

    /// Returns `true` if the walk has not reached the end of its range.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }
}

impl<K: Clone, V: Clone> Values<K, V> {
    /// Returns the next value.
    ///
    /// # Errors
    ///
    /// As for [`Iter::advance`].
    pub fn advance(&mut self) -> Result<V> {
        self.cursor.advance(|node| node.value().clone())
    }
}

impl<K: Clone, V> Values<K, V> {
    /// Removes the entry whose value was most recently returned, and returns its key.
    ///
    /// # Errors
    ///
    /// As for [`Iter::remove`].
    pub fn remove(&mut self) -> Result<K> {
        self.cursor.remove().map(|(key, _)| key)
    }
}

impl<K: Clone, V: Clone> Iterator for Values<K, V> {
    type Item = Result<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_with(|node| node.value().clone())
    }
}

impl<K: Clone, V: Clone> FusedIterator for Values<K, V> {}

impl<K, V> fmt::Debug for Values<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Values").field(&self.cursor).finish()
    }
}
