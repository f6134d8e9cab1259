use core::cmp::Ordering;
use core::ops::Bound;

use super::handle::Handle;
use super::node::{Node, Side};
use super::raw_tree_map::{Path, RawTreeMap};
use super::window::Window;

/// Explicit-stack in-order walk over the entries of a window.
///
/// The stack holds the handles still to be emitted, next entry on top. A `Traversal` keeps
/// no borrow of the tree, so the handles are only meaningful while the tree's modification
/// counter is unchanged; callers re-seed after any structural change.
#[derive(Clone, Debug)]
pub(crate) struct Traversal {
    path: Path,
    // Last entry of the window; emitting it ends the walk.
    terminal: Option<Handle>,
    descending: bool,
}

impl Traversal {
    /// Positions a walk at the start of `window`.
    pub(crate) fn seek<K, V>(tree: &RawTreeMap<K, V>, window: &Window<K>) -> Self {
        Self::starting_at(tree, window, window.start())
    }

    /// Positions a walk at the first entry of `window` strictly after `key`.
    pub(crate) fn resume_after<K, V>(tree: &RawTreeMap<K, V>, window: &Window<K>, key: &K) -> Self {
        Self::starting_at(tree, window, Bound::Excluded(key))
    }

    fn starting_at<K, V>(tree: &RawTreeMap<K, V>, window: &Window<K>, start: Bound<&K>) -> Self {
        let descending = window.is_descending();
        let mut path = tree.path_to_bound(start, descending);
        let terminal = tree.seek(window.end(), descending, false);

        let empty = match (path.last(), terminal) {
            (Some(&first), Some(last)) => {
                tree.compare_oriented(tree.node(first).key(), tree.node(last).key(), descending) == Ordering::Greater
            }
            _ => true,
        };
        if empty {
            path.clear();
        }

        Self {
            path,
            terminal,
            descending,
        }
    }

    #[inline]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.path.is_empty()
    }

    pub(crate) fn finish(&mut self) {
        self.path.clear();
    }

    /// Emits the next handle and advances past it.
    pub(crate) fn step<K, V>(&mut self, tree: &RawTreeMap<K, V>) -> Option<Handle> {
        let current = self.path.pop()?;
        if Some(current) == self.terminal {
            self.path.clear();
            return Some(current);
        }

        let mut next = tree.node(current).child(Side::Right.oriented(self.descending));
        while let Some(handle) = next {
            self.path.push(handle);
            next = tree.node(handle).child(Side::Left.oriented(self.descending));
        }
        Some(current)
    }
}

/// Borrowing ascending walk over every node, for use while the tree is already borrowed.
pub(crate) struct InOrder<'a, K, V> {
    tree: &'a RawTreeMap<K, V>,
    traversal: Traversal,
}

impl<K, V> RawTreeMap<K, V> {
    pub(crate) fn in_order(&self) -> InOrder<'_, K, V> {
        InOrder {
            tree: self,
            traversal: Traversal::seek(self, &Window::full(false)),
        }
    }
}

impl<'a, K, V> Iterator for InOrder<'a, K, V> {
    type Item = &'a Node<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.traversal.step(self.tree).map(|h| self.tree.node(h))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::Comparator;
    use alloc::vec::Vec;

    fn tree_of(keys: impl IntoIterator<Item = i32>) -> RawTreeMap<i32, ()> {
        let mut tree = RawTreeMap::new(Comparator::natural());
        for key in keys {
            tree.insert(key, ());
        }
        tree
    }

    fn walk(tree: &RawTreeMap<i32, ()>, window: &Window<i32>) -> Vec<i32> {
        let mut traversal = Traversal::seek(tree, window);
        let mut keys = Vec::new();
        while let Some(h) = traversal.step(tree) {
            keys.push(*tree.node(h).key());
        }
        keys
    }

    fn window(lo: Bound<i32>, hi: Bound<i32>, descending: bool) -> Window<i32> {
        Window::bounded(&Comparator::natural(), lo, hi, descending).unwrap()
    }

    #[test]
    fn full_walks_in_both_directions() {
        let tree = tree_of([5, 3, 8, 1, 4, 7, 9, 2, 6]);
        assert_eq!(walk(&tree, &Window::full(false)), (1..=9).collect::<Vec<_>>());
        assert_eq!(walk(&tree, &Window::full(true)), (1..=9).rev().collect::<Vec<_>>());
    }

    #[test]
    fn bounded_walks_stop_at_the_terminal() {
        let tree = tree_of(1..=9);
        assert_eq!(walk(&tree, &window(Bound::Included(3), Bound::Excluded(7), false)), [3, 4, 5, 6]);
        assert_eq!(walk(&tree, &window(Bound::Excluded(3), Bound::Included(7), true)), [7, 6, 5, 4]);
    }

    #[test]
    fn windows_between_entries_are_empty() {
        let tree = tree_of([10, 20]);
        let mut traversal = Traversal::seek(&tree, &window(Bound::Included(11), Bound::Included(19), false));
        assert!(traversal.is_exhausted());
        assert!(traversal.step(&tree).is_none());
        assert!(walk(&tree, &window(Bound::Excluded(10), Bound::Excluded(10), false)).is_empty());
        assert!(walk(&RawTreeMap::new(Comparator::natural()), &Window::full(false)).is_empty());
    }

    #[test]
    fn resume_skips_the_given_key() {
        let tree = tree_of(1..=6);
        let full = Window::full(true);
        let mut traversal = Traversal::resume_after(&tree, &full, &4);
        let first = traversal.step(&tree).map(|h| *tree.node(h).key());
        assert_eq!(first, Some(3));
    }

    #[test]
    fn in_order_visits_every_node() {
        let tree = tree_of([4, 2, 6]);
        let keys: Vec<i32> = tree.in_order().map(|n| *n.key()).collect();
        assert_eq!(keys, [2, 4, 6]);
    }
}
