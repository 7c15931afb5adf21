//! NodeTree - Arena and free-list for internal nodes.
//!
//! Manages the lifecycle of node slots:
//! - Free slot pool for O(1) reuse
//! - Parent/child links owned top-down by the arena
//! - Checked release: a node must be detached and childless
//!
//! One arena belongs to one layout computation. It moves into the
//! resulting `LayoutState` so the next pass can reconcile against it.

use crate::error::{Error, Result};

use super::node::{InternalNode, NodeId};

/// Arena of [`InternalNode`]s addressed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    slots: Vec<Option<InternalNode>>,
    free: Vec<usize>,
    allocated: usize,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Insert a detached node, reusing a freed slot when one is available.
    pub fn create(&mut self, node: InternalNode) -> NodeId {
        self.allocated += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Return a node's slot to the pool.
    ///
    /// Fails if the node is still attached to a parent or still has children.
    pub fn release(&mut self, id: NodeId) -> Result<InternalNode> {
        let node = self.node(id)?;
        if let Some(parent) = node.parent {
            return Err(Error::NodeStillAttached {
                node: id.0,
                parent: parent.0,
            });
        }
        if !node.children.is_empty() {
            return Err(Error::NodeHasChildren {
                node: id.0,
                children: node.children.len(),
            });
        }

        let node = self.slots[id.0].take().ok_or(Error::UnknownNode(id.0))?;
        self.free.push(id.0);
        self.allocated -= 1;
        Ok(node)
    }

    /// Detach `root` and release it together with its whole subtree,
    /// children first.
    pub fn release_tree(&mut self, root: NodeId) -> Result<()> {
        let mut stack = vec![root];
        let mut order = Vec::new();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id)?.children.iter().copied());
        }
        for id in order.into_iter().rev() {
            self.detach(id)?;
            self.release(id)?;
        }
        Ok(())
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let current = self.node(child)?.parent;
        if let Some(existing) = current {
            return Err(Error::NodeAlreadyParented {
                child: child.0,
                parent: existing.0,
            });
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `child` from its parent, leaving it detached.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Option<&InternalNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut InternalNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Result<&InternalNode> {
        self.get(id).ok_or(Error::UnknownNode(id.0))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut InternalNode> {
        self.get_mut(id).ok_or(Error::UnknownNode(id.0))
    }

    pub fn is_allocated(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Pre-order traversal of the subtree at `root`.
    pub fn depth_first(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Reconciliation support
    // =========================================================================

    /// Deep-copy the subtree at `root` of `source` into this arena.
    ///
    /// Returns the detached copy of `root`.
    pub fn copy_subtree(&mut self, source: &NodeTree, root: NodeId) -> Result<NodeId> {
        let node = source.node(root)?;
        let mut copy = node.clone();
        copy.parent = None;
        copy.children = Vec::with_capacity(node.children.len());
        let new_root = self.create(copy);

        for &child in &node.children {
            let new_child = self.copy_subtree(source, child)?;
            self.add_child(new_root, new_child)?;
        }
        Ok(new_root)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::primitives::column;

    fn node() -> InternalNode {
        InternalNode::new(column(Vec::new()), "Column")
    }

    #[test]
    fn test_create_and_reuse() {
        let mut tree = NodeTree::new();
        let a = tree.create(node());
        let b = tree.create(node());
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);

        tree.release(a).unwrap();
        assert!(!tree.is_allocated(a));

        let c = tree.create(node());
        assert_eq!(c, a);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_release_attached_node_fails() {
        let mut tree = NodeTree::new();
        let parent = tree.create(node());
        let child = tree.create(node());
        tree.add_child(parent, child).unwrap();

        let err = tree.release(child).unwrap_err();
        assert!(matches!(err, Error::NodeStillAttached { .. }));

        let err = tree.release(parent).unwrap_err();
        assert!(matches!(err, Error::NodeHasChildren { children: 1, .. }));

        tree.detach(child).unwrap();
        tree.release(child).unwrap();
        tree.release(parent).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_double_parenting_fails() {
        let mut tree = NodeTree::new();
        let a = tree.create(node());
        let b = tree.create(node());
        let child = tree.create(node());
        tree.add_child(a, child).unwrap();
        assert!(matches!(
            tree.add_child(b, child),
            Err(Error::NodeAlreadyParented { .. })
        ));
    }

    #[test]
    fn test_release_tree() {
        let mut tree = NodeTree::new();
        let root = tree.create(node());
        let mid = tree.create(node());
        let leaf = tree.create(node());
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        tree.release_tree(mid).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_copy_subtree() {
        let mut source = NodeTree::new();
        let root = source.create(node());
        let a = source.create(node());
        let b = source.create(node());
        source.add_child(root, a).unwrap();
        source.add_child(root, b).unwrap();

        let mut target = NodeTree::new();
        target.create(node());
        let copy = target.copy_subtree(&source, root).unwrap();

        assert_eq!(target.len(), 4);
        assert_eq!(target.node(copy).unwrap().child_count(), 2);
        assert_eq!(target.depth_first(copy).len(), 3);
        assert!(target.node(copy).unwrap().parent().is_none());
    }
}
