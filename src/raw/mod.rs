mod arena;
mod handle;
mod node;
mod raw_tree_map;
mod size;
mod traversal;
mod window;

pub(crate) use handle::Handle;
pub(crate) use node::Node;

pub(crate) use raw_tree_map::{RawTreeMap, Search};
pub(crate) use traversal::Traversal;
pub(crate) use window::Window;
