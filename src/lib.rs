//! Navigable ordered maps on a size-augmented AVL tree.
//!
//! This crate provides [`TreeMap`], an ordered key/value container with O(log n) point
//! queries, floor/ceiling/lower/higher navigation, and composable views that share the same
//! tree instead of copying it:
//!
//! - [`sub_map`](TreeMap::sub_map), [`head_map`](TreeMap::head_map) and
//!   [`tail_map`](TreeMap::tail_map) - live windows over a key range
//! - [`descending_map`](TreeMap::descending_map) - the same entries in reverse order
//! - [`navigable_key_set`](TreeMap::navigable_key_set) - a key-only projection
//!
//! Views can be nested, reversed and mutated. Writes through any view are visible through
//! the owner and every other view at once.
//!
//! # Example
//!
//! ```
//! use avl_navmap::TreeMap;
//!
//! let mut scores = TreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//! scores.insert("Dave", 71);
//!
//! assert_eq!(scores.get(&"Bob"), Some(85));
//! assert_eq!(scores.ceiling_key(&"Bz"), Some("Carol"));
//!
//! // A live window over ["B", "D") in reverse order.
//! let mut middle = scores.sub_map("B", true, "D", false)?.descending_map();
//! assert_eq!(middle.keys().collect::<Result<Vec<_>, _>>()?, ["Carol", "Bob"]);
//!
//! // Writes through the view land in the owner.
//! middle.insert("Cecil", 64)?;
//! assert_eq!(scores.len(), 5);
//! assert_eq!(middle.len(), 3);
//! # Ok::<(), avl_navmap::Error>(())
//! ```
//!
//! # Fail-fast iteration
//!
//! Iterators yield `Result`s. An iterator remembers the tree's modification count when it
//! is created; if the tree is structurally changed through any other handle, its next step
//! reports [`Error::ConcurrentModification`] instead of walking a stale path. Removing
//! through the iterator itself keeps it valid.
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to their children by index. Each node caches its
//! height and the size of its subtree, so view sizes, ranks and range counts are answered
//! by a single root-to-leaf walk. Iteration uses an explicit ancestor stack and works in
//! both directions without parent links.
//!
//! The tree is shared through `Rc<RefCell<_>>`; maps, views and iterators are neither
//! `Send` nor `Sync`.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod error;
mod raw;

pub mod tree_map;

pub use comparator::Comparator;
pub use error::{Error, Result};
pub use tree_map::{KeySet, SubMap, TreeMap};
