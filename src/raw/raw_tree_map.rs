use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::Bound;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use super::size::Size;
use super::window::Window;
use crate::comparator::Comparator;
use crate::error::{Error, Result};

/// Stack of ancestor handles, deepest last.
///
/// Sized inline for trees of a few million entries; deeper trees spill to the heap.
pub(crate) type Path = SmallVec<[Handle; 32]>;

/// A positional lookup relative to a probe key, read in iteration order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Search {
    /// Greatest entry strictly before the key.
    Lower,
    /// Greatest entry at or before the key.
    Floor,
    /// Least entry at or after the key.
    Ceiling,
    /// Least entry strictly after the key.
    Higher,
}

impl Search {
    const fn forward(self) -> bool {
        matches!(self, Search::Ceiling | Search::Higher)
    }

    const fn inclusive(self) -> bool {
        matches!(self, Search::Floor | Search::Ceiling)
    }
}

/// The entry a delete should splice out.
enum Target<'a, K> {
    Key(&'a K),
    First,
    Last,
}

/// The AVL tree shared by a `TreeMap` and all of its views.
#[derive(Clone)]
pub(crate) struct RawTreeMap<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Option<Handle>,
    comparator: Comparator<K>,
    /// Bumped on every structural change: a new key, a removal, a clear.
    mod_count: usize,
}

impl<K, V> RawTreeMap<K, V> {
    pub(crate) const fn new(comparator: Comparator<K>) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            comparator,
            mod_count: 0,
        }
    }

    pub(crate) fn with_capacity(comparator: Comparator<K>, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            comparator,
            mod_count: 0,
        }
    }

    /// Builds a tree from entries that are already strictly ascending.
    pub(crate) fn from_sorted(comparator: Comparator<K>, entries: Vec<(K, V)>) -> Result<Self> {
        if let Some(index) =
            entries.windows(2).position(|pair| comparator.compare(&pair[0].0, &pair[1].0) != Ordering::Less)
        {
            return Err(Error::Unsorted { index: index + 1 });
        }
        Ok(Self::bulk_load(comparator, entries))
    }

    /// Builds a tree from entries in any order. For duplicate keys the first key and the
    /// last value win, as if the entries had been inserted one by one.
    pub(crate) fn from_unordered(comparator: Comparator<K>, mut entries: Vec<(K, V)>) -> Self {
        // Stable: equal keys keep their input order.
        entries.sort_by(|a, b| comparator.compare(&a.0, &b.0));
        let mut unique: Vec<(K, V)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match unique.last_mut() {
                Some(last) if comparator.compare(&last.0, &key) == Ordering::Equal => last.1 = value,
                _ => unique.push((key, value)),
            }
        }
        Self::bulk_load(comparator, unique)
    }

    fn bulk_load(comparator: Comparator<K>, entries: Vec<(K, V)>) -> Self {
        let len = entries.len();
        let mut tree = Self::with_capacity(comparator, len);
        let mut entries = entries.into_iter();
        tree.root = tree.build(&mut entries, len);
        debug!(len, height = tree.height(), "bulk-loaded tree");
        tree
    }

    /// Builds a perfectly balanced subtree from the next `len` entries. The root is the
    /// entry at index `(lo + hi) / 2` of the slice being consumed.
    fn build<I>(&mut self, entries: &mut I, len: usize) -> Option<Handle>
    where
        I: Iterator<Item = (K, V)>,
    {
        if len == 0 {
            return None;
        }
        let left_len = (len - 1) / 2;
        let left = self.build(entries, left_len);
        let (key, value) = entries.next()?;
        let right = self.build(entries, len - 1 - left_len);

        let handle = self.nodes.alloc(Node::new(key, value));
        let node = self.nodes.get_mut(handle);
        node.set_left(left);
        node.set_right(right);
        self.update(handle);
        Some(handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.size_of(self.root).to_usize()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    pub(crate) const fn mod_count(&self) -> usize {
        self.mod_count
    }

    pub(crate) const fn comparator(&self) -> &Comparator<K> {
        &self.comparator
    }

    /// Height of the whole tree: 0 when empty, 1 for a single node.
    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    pub(crate) fn clear(&mut self) {
        debug!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
        self.bump();
    }

    fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }

    /// Compares two keys in iteration order.
    #[inline]
    pub(crate) fn compare_oriented(&self, a: &K, b: &K, descending: bool) -> Ordering {
        let ordering = self.comparator.compare(a, b);
        if descending { ordering.reverse() } else { ordering }
    }

    // ─── Balancing core ─────────────────────────────────────────────────────

    #[inline]
    fn height_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.node(h).height())
    }

    #[inline]
    fn size_of(&self, handle: Option<Handle>) -> Size {
        handle.map_or(Size::ZERO, |h| self.node(h).size())
    }

    fn update(&mut self, handle: Handle) {
        let node = self.node(handle);
        let left = (self.height_of(node.left()), self.size_of(node.left()));
        let right = (self.height_of(node.right()), self.size_of(node.right()));
        self.nodes.get_mut(handle).set_metrics(left, right);
    }

    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.node(handle);
        i16::from(self.height_of(node.right())) - i16::from(self.height_of(node.left()))
    }

    /// Promotes the right child of `handle` and returns it.
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let Some(pivot) = self.node(handle).right() else {
            return handle;
        };
        let inner = self.node(pivot).left();
        self.nodes.get_mut(handle).set_right(inner);
        self.nodes.get_mut(pivot).set_left(Some(handle));
        self.update(handle);
        self.update(pivot);
        trace!(demoted = handle.to_index(), promoted = pivot.to_index(), "rotated left");
        pivot
    }

    /// Promotes the left child of `handle` and returns it.
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let Some(pivot) = self.node(handle).left() else {
            return handle;
        };
        let inner = self.node(pivot).right();
        self.nodes.get_mut(handle).set_left(inner);
        self.nodes.get_mut(pivot).set_right(Some(handle));
        self.update(handle);
        self.update(pivot);
        trace!(demoted = handle.to_index(), promoted = pivot.to_index(), "rotated right");
        pivot
    }

    /// Refreshes the caches of `handle` and restores the AVL invariant at it.
    /// Returns the root of the (possibly rotated) subtree.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.update(handle);
        match self.balance_factor(handle) {
            2 => {
                if let Some(right) = self.node(handle).right()
                    && self.balance_factor(right) < 0
                {
                    let right = self.rotate_right(right);
                    self.nodes.get_mut(handle).set_right(Some(right));
                }
                self.rotate_left(handle)
            }
            -2 => {
                if let Some(left) = self.node(handle).left()
                    && self.balance_factor(left) > 0
                {
                    let left = self.rotate_left(left);
                    self.nodes.get_mut(handle).set_left(Some(left));
                }
                self.rotate_right(handle)
            }
            _ => handle,
        }
    }

    /// Inserts or replaces. Only a new key counts as a structural modification.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, previous) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        if previous.is_none() {
            self.bump();
        }
        previous
    }

    fn insert_at(&mut self, node: Option<Handle>, key: K, value: V) -> (Handle, Option<V>) {
        let Some(handle) = node else {
            return (self.nodes.alloc(Node::new(key, value)), None);
        };
        match self.comparator.compare(&key, self.node(handle).key()) {
            Ordering::Equal => {
                let previous = self.nodes.get_mut(handle).replace_value(value);
                (handle, Some(previous))
            }
            Ordering::Less => {
                let left = self.node(handle).left();
                let (child, previous) = self.insert_at(left, key, value);
                if previous.is_some() {
                    return (handle, previous);
                }
                self.nodes.get_mut(handle).set_left(Some(child));
                (self.rebalance(handle), None)
            }
            Ordering::Greater => {
                let right = self.node(handle).right();
                let (child, previous) = self.insert_at(right, key, value);
                if previous.is_some() {
                    return (handle, previous);
                }
                self.nodes.get_mut(handle).set_right(Some(child));
                (self.rebalance(handle), None)
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<(K, V)> {
        self.remove_target(&Target::Key(key))
    }

    /// Removes the first entry in iteration order.
    pub(crate) fn pop_edge(&mut self, descending: bool) -> Option<(K, V)> {
        if descending { self.remove_target(&Target::Last) } else { self.remove_target(&Target::First) }
    }

    fn remove_target(&mut self, target: &Target<'_, K>) -> Option<(K, V)> {
        let mut removed = None;
        let root = self.delete_at(self.root, target, &mut removed);
        let handle = removed?;
        self.root = root;
        self.bump();
        Some(self.nodes.take(handle).into_entry())
    }

    /// Which way `target` lies from the node at `handle`.
    fn locate(&self, target: &Target<'_, K>, handle: Handle) -> Ordering {
        let node = self.node(handle);
        match target {
            Target::Key(key) => self.comparator.compare(key, node.key()),
            Target::First if node.left().is_some() => Ordering::Less,
            Target::Last if node.right().is_some() => Ordering::Greater,
            Target::First | Target::Last => Ordering::Equal,
        }
    }

    /// Unlinks `target` from the subtree at `node` and returns the new subtree root.
    /// The unlinked node is left in the arena and reported through `removed`.
    fn delete_at(&mut self, node: Option<Handle>, target: &Target<'_, K>, removed: &mut Option<Handle>) -> Option<Handle> {
        let handle = node?;
        match self.locate(target, handle) {
            Ordering::Less => {
                let left = self.node(handle).left();
                let child = self.delete_at(left, target, removed);
                if removed.is_none() {
                    return Some(handle);
                }
                self.nodes.get_mut(handle).set_left(child);
                Some(self.rebalance(handle))
            }
            Ordering::Greater => {
                let right = self.node(handle).right();
                let child = self.delete_at(right, target, removed);
                if removed.is_none() {
                    return Some(handle);
                }
                self.nodes.get_mut(handle).set_right(child);
                Some(self.rebalance(handle))
            }
            Ordering::Equal => {
                *removed = Some(handle);
                let node = self.node(handle);
                let left = node.left();
                match node.right() {
                    None => left,
                    Some(right) => Some(self.splice_successor(left, right)),
                }
            }
        }
    }

    /// Detaches the left-most node of the subtree at `right` and makes it the parent of
    /// `left` and of what remains of `right`. Returns the rebalanced replacement.
    fn splice_successor(&mut self, left: Option<Handle>, right: Handle) -> Handle {
        let mut path = Path::new();
        let mut successor = right;
        while let Some(next) = self.node(successor).left() {
            path.push(successor);
            successor = next;
        }

        let mut remainder = self.node(successor).right();
        while let Some(parent) = path.pop() {
            self.nodes.get_mut(parent).set_left(remainder);
            remainder = Some(self.rebalance(parent));
        }

        let node = self.nodes.get_mut(successor);
        node.set_left(left);
        node.set_right(remainder);
        trace!(successor = successor.to_index(), "spliced in-order successor");
        self.rebalance(successor)
    }

    // ─── Positional search ──────────────────────────────────────────────────

    /// Exact lookup.
    pub(crate) fn find(&self, key: &K) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match self.comparator.compare(key, node.key()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// The first entry in iteration order.
    pub(crate) fn edge(&self, descending: bool) -> Option<Handle> {
        let side = Side::Left.oriented(descending);
        let mut current = self.root?;
        while let Some(next) = self.node(current).child(side) {
            current = next;
        }
        Some(current)
    }

    /// Floor, ceiling, lower and higher in one descent. `descending` mirrors the tree, so
    /// a descending ceiling is an ascending floor.
    pub(crate) fn search(&self, key: &K, search: Search, descending: bool) -> Option<Handle> {
        let before = Side::Left.oriented(descending);
        let after = Side::Right.oriented(descending);
        let forward = search.forward();
        let mut candidate = None;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.node(handle);
            let ordering = self.compare_oriented(key, node.key(), descending);
            if ordering == Ordering::Equal && search.inclusive() {
                return Some(handle);
            }
            current = match (ordering, forward) {
                (Ordering::Less, true) => {
                    candidate = Some(handle);
                    node.child(before)
                }
                (Ordering::Greater, false) => {
                    candidate = Some(handle);
                    node.child(after)
                }
                (Ordering::Less, false) | (Ordering::Equal, false) => node.child(before),
                (Ordering::Greater | Ordering::Equal, true) => node.child(after),
            };
        }
        candidate
    }

    /// The first entry at or after `bound` (`forward`), or the last entry at or before it,
    /// in iteration order.
    pub(crate) fn seek(&self, bound: Bound<&K>, descending: bool, forward: bool) -> Option<Handle> {
        match (bound, forward) {
            (Bound::Unbounded, true) => self.edge(descending),
            (Bound::Unbounded, false) => self.edge(!descending),
            (Bound::Included(key), true) => self.search(key, Search::Ceiling, descending),
            (Bound::Excluded(key), true) => self.search(key, Search::Higher, descending),
            (Bound::Included(key), false) => self.search(key, Search::Floor, descending),
            (Bound::Excluded(key), false) => self.search(key, Search::Lower, descending),
        }
    }

    /// Ancestors of the first entry past `bound` whose "before" subtree lies behind the
    /// bound, deepest last. Popping the stack yields entries in iteration order.
    pub(crate) fn path_to_bound(&self, bound: Bound<&K>, descending: bool) -> Path {
        let before = Side::Left.oriented(descending);
        let after = Side::Right.oriented(descending);
        let mut path = Path::new();
        let mut current = self.root;

        let (key, inclusive) = match bound {
            Bound::Unbounded => {
                while let Some(handle) = current {
                    path.push(handle);
                    current = self.node(handle).child(before);
                }
                return path;
            }
            Bound::Included(key) => (key, true),
            Bound::Excluded(key) => (key, false),
        };

        while let Some(handle) = current {
            let node = self.node(handle);
            match self.compare_oriented(key, node.key(), descending) {
                Ordering::Less => {
                    path.push(handle);
                    current = node.child(before);
                }
                Ordering::Equal if inclusive => {
                    path.push(handle);
                    break;
                }
                Ordering::Equal | Ordering::Greater => current = node.child(after),
            }
        }
        path
    }

    /// Number of entries that a start-side `bound` cuts off, in iteration order.
    ///
    /// Every ancestor the descent passes on its "after" side is excluded together with its
    /// whole "before" subtree, so the count needs no enumeration.
    pub(crate) fn count_before(&self, bound: Bound<&K>, descending: bool) -> usize {
        let (key, inclusive) = match bound {
            Bound::Unbounded => return 0,
            Bound::Included(key) => (key, true),
            Bound::Excluded(key) => (key, false),
        };
        let before = Side::Left.oriented(descending);
        let after = Side::Right.oriented(descending);
        let mut count = 0;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.node(handle);
            let excluded_subtree = self.size_of(node.child(before)).to_usize();
            match self.compare_oriented(key, node.key(), descending) {
                Ordering::Greater => {
                    count += excluded_subtree + 1;
                    current = node.child(after);
                }
                Ordering::Equal => {
                    count += excluded_subtree + usize::from(!inclusive);
                    break;
                }
                Ordering::Less => current = node.child(before),
            }
        }
        count
    }

    // ─── Window helpers ─────────────────────────────────────────────────────

    /// Number of entries inside `window`.
    pub(crate) fn window_len(&self, window: &Window<K>) -> usize {
        let below = self.count_before(window.lo(), false);
        let above = self.count_before(window.hi(), true);
        self.len().saturating_sub(below + above)
    }

    /// First entry of `window` in its iteration order.
    pub(crate) fn window_first(&self, window: &Window<K>) -> Option<Handle> {
        self.seek(window.start(), window.is_descending(), true)
            .filter(|&h| !window.after_end(&self.comparator, self.node(h).key()))
    }

    /// Last entry of `window` in its iteration order.
    pub(crate) fn window_last(&self, window: &Window<K>) -> Option<Handle> {
        self.seek(window.end(), window.is_descending(), false)
            .filter(|&h| !window.before_start(&self.comparator, self.node(h).key()))
    }

    /// Positional lookup restricted to `window`, in the window's iteration order.
    pub(crate) fn window_search(&self, window: &Window<K>, key: &K, search: Search) -> Option<Handle> {
        if search.forward() && window.before_start(&self.comparator, key) {
            return self.window_first(window);
        }
        if !search.forward() && window.after_end(&self.comparator, key) {
            return self.window_last(window);
        }
        self.search(key, search, window.is_descending())
            .filter(|&h| window.contains(&self.comparator, self.node(h).key()))
    }

    // ─── Order statistics ───────────────────────────────────────────────────

    /// Zero-based position of `key` in ascending order.
    pub(crate) fn rank_of(&self, key: &K) -> Option<usize> {
        let mut rank = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            let left_size = self.size_of(node.left()).to_usize();
            current = match self.comparator.compare(key, node.key()) {
                Ordering::Equal => return Some(rank + left_size),
                Ordering::Less => node.left(),
                Ordering::Greater => {
                    rank += left_size + 1;
                    node.right()
                }
            };
        }
        None
    }

    /// The entry at zero-based position `rank` in ascending order.
    pub(crate) fn select(&self, mut rank: usize) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            let left_size = self.size_of(node.left()).to_usize();
            current = match rank.cmp(&left_size) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => {
                    rank -= left_size + 1;
                    node.right()
                }
            };
        }
        None
    }

    // ─── Diagnostics ────────────────────────────────────────────────────────

    /// Checks ordering, balance and the cached heights and sizes of every node.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violation found.
    pub(crate) fn assert_invariants(&self) {
        let (_, size) = self.check_subtree(self.root, None, None);
        assert_eq!(self.nodes.len(), size, "arena holds {} nodes but the tree reaches {size}", self.nodes.len());
    }

    fn check_subtree(&self, node: Option<Handle>, lo: Option<&K>, hi: Option<&K>) -> (u8, usize) {
        let Some(handle) = node else {
            return (0, 0);
        };
        let slot = handle.to_index();
        let node = self.node(handle);
        if let Some(lo) = lo {
            assert!(self.comparator.compare(lo, node.key()) == Ordering::Less, "key at slot {slot} sorts before its lower ancestor");
        }
        if let Some(hi) = hi {
            assert!(self.comparator.compare(node.key(), hi) == Ordering::Less, "key at slot {slot} sorts after its upper ancestor");
        }

        let (left_height, left_size) = self.check_subtree(node.left(), lo, Some(node.key()));
        let (right_height, right_size) = self.check_subtree(node.right(), Some(node.key()), hi);
        assert!(
            left_height.abs_diff(right_height) <= 1,
            "slot {slot} is unbalanced: left height {left_height}, right height {right_height}"
        );
        assert_eq!(node.height(), left_height.max(right_height) + 1, "slot {slot} caches a stale height");
        assert_eq!(node.size().to_usize(), left_size + right_size + 1, "slot {slot} caches a stale size");
        (node.height(), left_size + right_size + 1)
    }
}

impl<K: Clone, V> RawTreeMap<K, V> {
    pub(crate) fn key_of(&self, handle: Handle) -> K {
        self.node(handle).key().clone()
    }

    /// Removes the first (or, with `from_end`, the last) entry of `window`.
    pub(crate) fn pop_window(&mut self, window: &Window<K>, from_end: bool) -> Option<(K, V)> {
        let handle = if from_end { self.window_last(window) } else { self.window_first(window) }?;
        let key = self.key_of(handle);
        self.remove(&key)
    }
}

impl<K: Clone, V: Clone> RawTreeMap<K, V> {
    pub(crate) fn entry_of(&self, handle: Handle) -> (K, V) {
        let node = self.node(handle);
        (node.key().clone(), node.value().clone())
    }
}
