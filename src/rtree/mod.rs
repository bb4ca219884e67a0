//! A dynamic R-tree: balanced insertion, deletion, and spatial queries
//! over `(bound, value)` entries.

mod constants;
mod index;
mod iter;
pub(crate) mod node;
mod split;

pub use constants::DEFAULT_MAX_ENTRIES;
pub use index::RTree;
pub use iter::{EntryBounds, EntryCursor, EntryRef, Iter, NodeRef, Nodes};
