//! Reconciler - Reuse unchanged subtrees of the previous layout state.

use std::sync::Arc;

use crate::component::Component;
use crate::engine::NodeId;
use crate::layout_state::LayoutState;

/// Reconcile source handed to the node tree builder.
#[derive(Debug, Clone)]
pub struct Reconciler {
    previous: Arc<LayoutState>,
}

impl Reconciler {
    pub fn new(previous: Arc<LayoutState>) -> Self {
        Self { previous }
    }

    pub fn previous(&self) -> &Arc<LayoutState> {
        &self.previous
    }

    /// Previous node for `global_key` if `component` is the same instance
    /// or equivalent to the component that produced it.
    ///
    /// Callers check state dirtiness first; this only compares components.
    pub fn reusable_node(&self, component: &Component, global_key: &str) -> Option<NodeId> {
        let id = self.previous.node_for_key(global_key)?;
        let previous = self.previous.tree().get(id)?.head_component();
        let reusable = previous.type_name() == component.type_name()
            && (previous.is_same_instance(component) || previous.is_equivalent_to(component));
        reusable.then_some(id)
    }
}

/// True when `dirty_keys` holds `global_key` or a key below it.
pub fn is_key_dirty<'a>(mut dirty_keys: impl Iterator<Item = &'a String>, global_key: &str) -> bool {
    dirty_keys.any(|key| {
        key == global_key
            || key
                .strip_prefix(global_key)
                .is_some_and(|rest| rest.starts_with(','))
    })
}
