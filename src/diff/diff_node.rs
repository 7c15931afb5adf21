//! DiffNode - What a layout state remembers about each node.
//!
//! The next layout pass walks the previous diff tree alongside the new node
//! tree, matching children by global key, to hand outputs their previous
//! ids back and to mark each output's [`UpdateState`].

use crate::component::Component;
use crate::output::{OutputUnitsAffinityGroup, UpdateState};

#[derive(Debug, Clone)]
pub struct DiffNode {
    /// Outermost component of the node's chain.
    pub component: Component,
    pub global_key: String,
    /// Ids of the outputs the node produced, by type.
    pub outputs: OutputUnitsAffinityGroup<u64>,
    pub visibility_id: Option<u64>,
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    pub fn new(component: Component, global_key: impl Into<String>) -> Self {
        Self {
            component,
            global_key: global_key.into(),
            outputs: OutputUnitsAffinityGroup::new(),
            visibility_id: None,
            children: Vec::new(),
        }
    }

    /// Child with the given global key.
    pub fn child(&self, global_key: &str) -> Option<&DiffNode> {
        self.children.iter().find(|child| child.global_key == global_key)
    }

    /// Visit every node of this subtree, parents first.
    pub fn for_each(&self, f: &mut impl FnMut(&DiffNode)) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }

    /// Number of nodes in this subtree.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(DiffNode::subtree_size).sum::<usize>()
    }
}

/// Update state of a node's outputs given its previous diff node.
///
/// `dirty` is true when a state update touched the node or its subtree.
pub fn compute_update_state(
    previous: Option<&DiffNode>,
    component: &Component,
    dirty: bool,
) -> UpdateState {
    let Some(previous) = previous else {
        return UpdateState::Unknown;
    };
    let unchanged = previous.component.type_name() == component.type_name()
        && (previous.component.is_same_instance(component)
            || previous.component.is_equivalent_to(component));
    if unchanged && !dirty {
        UpdateState::Updated
    } else {
        UpdateState::Dirty
    }
}
