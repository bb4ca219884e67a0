//! Shared helpers for the crate tests.


use crate::geometry::Geometry;
use crate::rtree::node::NodeKind;
use crate::rtree::RTree;

/// Walk the whole tree and assert every structural invariant: fill bounds,
/// uniform leaf depth, entry-bound containment, and parent back-references.
pub(crate) fn check_invariants<G: Geometry, V>(tree: &RTree<G, V>) {
    let arena = &tree.arena;
    assert!(arena[tree.root].parent.is_none());

    let mut total_entries = 0;
    let mut stack = vec![(tree.root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let node = &arena[id];

        assert!(node.len() <= tree.max_entries());
        if depth > 0 {
            assert!(node.len() >= tree.min_entries());
        } else if !node.is_leaf() {
            assert!(node.len() >= 2);
        }

        match &node.kind {
            NodeKind::Leaf(entries) => {
                assert_eq!(depth, tree.leaves_level());
                total_entries += entries.len();
            }
            NodeKind::Internal(children) => {
                assert!(depth < tree.leaves_level());
                for (at, (bound, child)) in children.iter().enumerate() {
                    let child_node = &arena[*child];
                    assert_eq!(child_node.parent, Some(id));
                    assert_eq!(child_node.index_on_parent, at);
                    assert!(bound.contains(&child_node.calculate_bound()));
                    stack.push((*child, depth + 1));
                }
            }
        }
    }
    assert_eq!(total_entries, tree.len());
}
