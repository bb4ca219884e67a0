use std::mem;

use geo_traits::RectTrait;
use tinyvec::TinyVec;

use crate::error::{GeoRTreeError, Result};
use crate::geometry::{Geometry, Rect};
use crate::rtree::constants::{default_min_entries, DEFAULT_MAX_ENTRIES};
use crate::rtree::iter::{EntryCursor, Iter, Nodes};
use crate::rtree::node::{Arena, Node, NodeId, NodeKind};
use crate::rtree::split::quadratic_split;
use crate::r#type::GeometryNum;

/// A dynamic R-tree over `(bound, value)` entries.
///
/// Entries with identical bounds coexist; the tree is a multimap. All
/// leaves stay at the same depth across arbitrary interleaved insertions
/// and erasures.
///
/// ```
/// use geo_rtree::{Interval, RTree};
///
/// let mut tree = RTree::new();
/// tree.insert(Interval::new(3, 7), "a");
/// tree.insert(Interval::new(10, 12), "b");
///
/// let mut hits = vec![];
/// tree.search_intersects(&Interval::point(5), |_, value| hits.push(*value));
/// assert_eq!(hits, vec!["a"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RTree<G: Geometry, V> {
    pub(crate) arena: Arena<G, V>,
    pub(crate) root: NodeId,
    pub(crate) leaves_level: usize,
    len: usize,
    max_entries: usize,
    min_entries: usize,
}

impl<G: Geometry, V> RTree<G, V> {
    /// An empty tree with the default node capacity.
    pub fn new() -> Self {
        Self::with_node_size(DEFAULT_MAX_ENTRIES, default_min_entries(DEFAULT_MAX_ENTRIES))
    }

    /// An empty tree with the given node capacity and minimum fill.
    ///
    /// Panics unless `max_entries >= 4` and `min_entries` lies in
    /// `2..=max_entries.div_ceil(2)`.
    pub fn with_node_size(max_entries: usize, min_entries: usize) -> Self {
        assert!(max_entries >= 4, "max_entries must be at least 4");
        assert!(
            (2..=max_entries.div_ceil(2)).contains(&min_entries),
            "min_entries must lie in 2..=ceil(max_entries / 2)"
        );

        let mut arena = Arena::new();
        let root = arena.alloc(Node::leaf());
        Self {
            arena,
            root,
            leaves_level: 0,
            len: 0,
            max_entries,
            min_entries,
        }
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth at which the leaves sit; 0 while the root is itself a leaf.
    pub fn leaves_level(&self) -> usize {
        self.leaves_level
    }

    /// Upper bound on any node's entry count.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Lower bound on every non-root node's entry count.
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// Drop every entry, keeping the configured node capacity.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::leaf());
        self.leaves_level = 0;
        self.len = 0;
    }

    /// Iterate every `(bound, value)` entry, leaves left to right.
    pub fn iter(&self) -> Iter<'_, G, V> {
        Iter::new(self)
    }

    /// Iterate the nodes at `level`; level `leaves_level()` is the leaves.
    pub fn nodes_at_level(&self, level: usize) -> Result<Nodes<'_, G, V>> {
        if level > self.leaves_level {
            return Err(GeoRTreeError::LevelOutOfBounds(level));
        }
        Ok(Nodes::new(self, level))
    }

    /// Iterate the leaf nodes.
    pub fn leaves(&self) -> Nodes<'_, G, V> {
        Nodes::new(self, self.leaves_level)
    }

    /// Insert an entry. Entries with identical bounds coexist.
    pub fn insert(&mut self, bound: G, value: V) {
        self.place_value(bound, value);
        self.len += 1;
    }

    /// Remove the entry addressed by `cursor`.
    ///
    /// Panics when the cursor does not address a live entry of this tree.
    pub fn erase(&mut self, cursor: EntryCursor) {
        let live = self
            .arena
            .get(cursor.leaf)
            .is_some_and(|node| node.is_leaf() && cursor.slot < node.len());
        assert!(live, "cursor does not address a live entry of this tree");

        self.arena[cursor.leaf].entries_mut().swap_remove(cursor.slot);
        self.len -= 1;
        self.condense(cursor.leaf);
    }

    /// Invoke `sink` on every entry whose bound intersects `region`.
    /// Visit order is unspecified.
    pub fn search_intersects<F>(&self, region: &G, sink: F)
    where
        F: FnMut(&G, &V),
    {
        self.search_where(region, |region, bound| bound.intersects(region), sink);
    }

    /// Invoke `sink` on every entry whose bound lies entirely inside
    /// `region`. Visit order is unspecified.
    pub fn search_contains<F>(&self, region: &G, sink: F)
    where
        F: FnMut(&G, &V),
    {
        self.search_where(region, |region, bound| region.contains(bound), sink);
    }

    fn search_where<M, F>(&self, region: &G, matches: M, mut sink: F)
    where
        M: Fn(&G, &G) -> bool,
        F: FnMut(&G, &V),
    {
        if self.is_empty() {
            return;
        }
        // TinyVec keeps the search stack off the heap
        let mut stack: TinyVec<[NodeId; 32]> = TinyVec::new();
        stack.push(self.root);
        while let Some(id) = stack.pop() {
            match &self.arena[id].kind {
                NodeKind::Internal(entries) => {
                    for (bound, child) in entries {
                        if bound.intersects(region) {
                            stack.push(*child);
                        }
                    }
                }
                NodeKind::Leaf(entries) => {
                    for (bound, value) in entries {
                        if matches(region, bound) {
                            sink(bound, value);
                        }
                    }
                }
            }
        }
    }

    /// Insert without touching the entry count; shared by [`Self::insert`]
    /// and orphan reinsertion.
    fn place_value(&mut self, bound: G, value: V) {
        let leaf = self.choose_node_at(&bound, self.leaves_level);
        self.arena[leaf].entries_mut().push((bound, value));
        self.balance_upward(leaf);
    }

    /// Descend `depth` levels from the root, taking the least-enlargement
    /// child at every step.
    fn choose_node_at(&self, bound: &G, depth: usize) -> NodeId {
        let mut id = self.root;
        for _ in 0..depth {
            let at = self.choose_subtree(id, bound);
            id = self.arena.child_at(id, at);
        }
        id
    }

    /// Entry index of the child needing the least enlargement to cover
    /// `bound`. Ties fall to the smaller area, then to the earliest entry.
    fn choose_subtree(&self, id: NodeId, bound: &G) -> usize {
        let children = self.arena[id].children();
        debug_assert!(!children.is_empty());

        let mut best = 0;
        let mut best_enlargement = children[0].0.enlargement(bound);
        let mut best_area = children[0].0.area();
        for (at, (child_bound, _)) in children.iter().enumerate().skip(1) {
            let enlargement = child_bound.enlargement(bound);
            let area = child_bound.area();
            if enlargement < best_enlargement
                || (enlargement == best_enlargement && area < best_area)
            {
                best = at;
                best_enlargement = enlargement;
                best_area = area;
            }
        }
        best
    }

    /// Resolve overflow by splitting up the tree, growing the root if the
    /// split reaches it, then retighten the bounds on the path to the root.
    fn balance_upward(&mut self, mut id: NodeId) {
        while self.arena[id].len() > self.max_entries {
            let (low_bound, high_bound, sibling) = self.split_node(id);
            match self.arena[id].parent {
                Some(parent) => {
                    let at = self.arena[id].index_on_parent;
                    self.arena[parent].children_mut()[at].0 = low_bound;
                    self.arena.push_child(parent, high_bound, sibling);
                    id = parent;
                }
                None => {
                    let grown = self.arena.alloc(Node::internal());
                    self.arena.push_child(grown, low_bound, id);
                    self.arena.push_child(grown, high_bound, sibling);
                    self.root = grown;
                    self.leaves_level += 1;
                    return;
                }
            }
        }

        while let Some(parent) = self.arena[id].parent {
            let bound = self.arena[id].calculate_bound();
            let at = self.arena[id].index_on_parent;
            self.arena[parent].children_mut()[at].0 = bound;
            id = parent;
        }
    }

    /// Split an overfull node, leaving the first group in place and
    /// returning the second as a fresh sibling.
    fn split_node(&mut self, id: NodeId) -> (G, G, NodeId) {
        match &mut self.arena[id].kind {
            NodeKind::Leaf(entries) => {
                let split = quadratic_split(mem::take(entries), self.min_entries);
                *entries = split.first;
                let sibling = self.arena.alloc(Node::leaf_with(split.second));
                (split.first_bound, split.second_bound, sibling)
            }
            NodeKind::Internal(entries) => {
                let split = quadratic_split(mem::take(entries), self.min_entries);
                *entries = split.first;

                // regrouping moved entries around; rewire both groups'
                // back-references
                for at in 0..self.arena[id].children().len() {
                    let child = self.arena.child_at(id, at);
                    self.arena[child].index_on_parent = at;
                }
                let sibling = self.arena.alloc(Node::internal_with(split.second));
                for at in 0..self.arena[sibling].children().len() {
                    let child = self.arena.child_at(sibling, at);
                    let node = &mut self.arena[child];
                    node.parent = Some(sibling);
                    node.index_on_parent = at;
                }
                (split.first_bound, split.second_bound, sibling)
            }
        }
    }

    /// Walk from `leaf` to the root, detaching every node that fell below
    /// the minimum fill and retightening the rest; then shrink the root
    /// and re-home the entries of the detached subtrees.
    fn condense(&mut self, leaf: NodeId) {
        // (height above the leaves, node)
        let mut orphans: Vec<(usize, NodeId)> = Vec::new();
        let mut id = leaf;
        let mut height = 0;
        while let Some(parent) = self.arena[id].parent {
            let at = self.arena[id].index_on_parent;
            if self.arena[id].len() < self.min_entries {
                self.arena.detach_child(parent, at);
                orphans.push((height, id));
            } else {
                let bound = self.arena[id].calculate_bound();
                self.arena[parent].children_mut()[at].0 = bound;
            }
            id = parent;
            height += 1;
        }

        // a root left with a single child hands the root over to it
        if !self.arena[self.root].is_leaf() && self.arena[self.root].len() == 1 {
            let (_, child) = self.arena.detach_child(self.root, 0);
            let old_root = mem::replace(&mut self.root, child);
            self.arena.release(old_root);
            self.leaves_level -= 1;
        }

        for (height, orphan) in orphans {
            self.reinsert(height, orphan);
        }
    }

    /// Re-home every entry of a detached node. Leaf entries take the
    /// normal insert descent; child nodes are attached at the depth that
    /// puts their leaves back on the leaf level, computed against the
    /// current `leaves_level` since the root may have been promoted (or
    /// regrown by an earlier reinsertion) in the meantime.
    fn reinsert(&mut self, height: usize, orphan: NodeId) {
        let node = self.arena.release(orphan);
        match node.kind {
            NodeKind::Leaf(entries) => {
                debug_assert_eq!(height, 0);
                for (bound, value) in entries {
                    self.place_value(bound, value);
                }
            }
            NodeKind::Internal(entries) => {
                for (bound, child) in entries {
                    debug_assert!(height <= self.leaves_level);
                    let depth = self.leaves_level - height;
                    let target = self.choose_node_at(&bound, depth);
                    self.arena.push_child(target, bound, child);
                    self.balance_upward(target);
                }
            }
        }
    }
}

impl<G: Geometry, V> Default for RTree<G, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, G: Geometry, V> IntoIterator for &'a RTree<G, V> {
    type Item = <Iter<'a, G, V> as Iterator>::Item;
    type IntoIter = Iter<'a, G, V>;

    fn into_iter(self) -> Iter<'a, G, V> {
        self.iter()
    }
}

impl<N: GeometryNum, V> RTree<Rect<N, 2>, V> {
    /// Insert with the bound taken from any georust rect.
    pub fn insert_rect(&mut self, rect: &impl RectTrait<T = N>, value: V) {
        self.insert(Rect::from_rect(rect), value);
    }

    /// Intersection search with the region taken from any georust rect.
    pub fn search_rect<F>(&self, rect: &impl RectTrait<T = N>, sink: F)
    where
        F: FnMut(&Rect<N, 2>, &V),
    {
        self.search_intersects(&Rect::from_rect(rect), sink);
    }
}
