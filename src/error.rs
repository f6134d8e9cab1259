//! Error types for map, view and iterator operations.
//!
//! Absence is never an error: lookups that find nothing return `None`. The variants here
//! cover misuse the caller can act on: a view asked to hold a key outside its window, a
//! range whose ends are inverted, an iterator used out of protocol, or an iterator that
//! observed a structural change made through another handle.

use thiserror::Error;

/// Errors reported by [`TreeMap`](crate::TreeMap), its views and its iterators.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A range was requested whose lower end sorts after its upper end, or a nested view
    /// would not overlap its parent at all.
    #[error("range start is greater than range end")]
    InvalidRange,

    /// A view was asked to insert or remove a key outside its bounds.
    #[error("key is outside the bounds of this view")]
    KeyOutOfRange,

    /// Entries handed to a bulk constructor were not strictly ascending.
    #[error("entries are not strictly ascending at index {index}")]
    Unsorted {
        /// Position of the first entry that does not sort after its predecessor.
        index: usize,
    },

    /// There is no element to return: the map or view is empty, or the iterator is
    /// exhausted.
    #[error("no such element")]
    NoSuchElement,

    /// `remove` was called on an iterator before `next`, or twice for the same element.
    #[error("iterator has no current element to remove")]
    IllegalState,

    /// The tree was structurally modified since the iterator last synchronised with it.
    ///
    /// Only the iterator is affected; the tree itself is consistent.
    #[error("tree was modified during iteration (expected modification {expected}, found {found})")]
    ConcurrentModification {
        /// Modification count the iterator was synchronised with.
        expected: usize,
        /// Modification count observed on the tree.
        found: usize,
    },
}

/// A `Result` alias using this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
