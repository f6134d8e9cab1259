use super::handle::Handle;
use super::size::Size;

/// A single AVL tree node.
///
/// Each child handle is referenced by exactly one parent; there are no parent links.
/// `height` and `size` are caches recomputed by [`RawTreeMap`](super::RawTreeMap) after
/// every structural change beneath the node.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    left: Option<Handle>,
    right: Option<Handle>,
    // Leaf nodes have height 1; an absent child counts as 0.
    height: u8,
    size: Size,
}

/// Which child to follow from a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    /// Picks `self` for ascending walks and the mirror image for descending ones.
    #[inline]
    pub(crate) const fn oriented(self, descending: bool) -> Self {
        match (self, descending) {
            (Side::Left, false) | (Side::Right, true) => Side::Left,
            (Side::Right, false) | (Side::Left, true) => Side::Right,
        }
    }
}

impl<K, V> Node<K, V> {
    /// Creates a detached node with no children.
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Swaps in a new value and returns the old one.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.value, value)
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    /// Stores freshly computed caches from the children's values.
    pub(crate) fn set_metrics(&mut self, left: (u8, Size), right: (u8, Size)) {
        self.height = left.0.max(right.0) + 1;
        self.size = Size::joined(left.1, right.1);
    }

    /// Consumes the node, yielding its entry.
    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
