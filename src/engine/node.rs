//! InternalNode - One node of the resolved layout tree.

use std::fmt;

use crate::component::Component;
use crate::output::TransitionId;
use crate::types::LayoutDirection;

use super::edges::Insets;
use super::style::NodeStyle;

/// Handle into a [`NodeTree`](super::NodeTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Per-node behaviour flags collected from the producing components.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u16 {
        const DUPLICATE_PARENT_STATE = 1 << 0;
        const DUPLICATE_CHILDREN_STATE = 1 << 1;
        /// Wrap the node in its own host view.
        const FORCE_HOST_VIEW = 1 << 2;
        const CLICK_HANDLER = 1 << 3;
        const TOUCH_HANDLER = 1 << 4;
        const VISIBILITY_HANDLER = 1 << 5;
        /// Subtree copied from the previous layout instead of rendered.
        const REUSED = 1 << 6;
        /// Node was taken from the measured-result cache.
        const FROM_MEASURE_CACHE = 1 << 7;
    }
}

impl NodeFlags {
    /// Handlers that require a host view and enable touch expansion.
    pub fn has_touch_handler(&self) -> bool {
        self.intersects(Self::CLICK_HANDLER | Self::TOUCH_HANDLER)
    }
}

/// Geometry written back by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeLayout {
    /// Position relative to the parent's border box.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub padding: Insets,
    pub border: Insets,
    pub margin: Insets,
    /// Zero unless the node has a click or touch handler.
    pub touch_expansion: Insets,
    pub direction: LayoutDirection,
}

/// One node of the resolved tree.
///
/// Parent/child links are owned by the arena; a node can only be released
/// once it is detached and childless.
#[derive(Debug, Clone)]
pub struct InternalNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Producing chain, outermost composite first, the component that
    /// created the node last.
    pub(crate) components: Vec<Component>,
    pub(crate) global_key: String,
    pub style: NodeStyle,
    pub flags: NodeFlags,
    pub transition_id: Option<TransitionId>,
    pub layout: NodeLayout,
}

impl InternalNode {
    pub fn new(component: Component, global_key: impl Into<String>) -> Self {
        let style = component.common().style.clone();
        let flags = component.common().node_flags();
        Self {
            parent: None,
            children: Vec::new(),
            components: vec![component],
            global_key: global_key.into(),
            style,
            flags,
            transition_id: None,
            layout: NodeLayout::default(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Component that produced the node (innermost of the chain).
    pub fn tail_component(&self) -> &Component {
        // The chain is never empty: `new` seeds it and wrapping only prepends.
        &self.components[self.components.len() - 1]
    }

    /// Outermost component of the chain.
    pub fn head_component(&self) -> &Component {
        &self.components[0]
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn global_key(&self) -> &str {
        &self.global_key
    }

    /// Record a composite that rendered into this node.
    ///
    /// The composite becomes the head of the chain, its flags merge in and
    /// its explicit style fields override the inner ones.
    pub(crate) fn wrap_with(&mut self, composite: Component, global_key: String) {
        self.style.apply_overrides(&composite.common().style);
        self.flags |= composite.common().node_flags();
        self.components.insert(0, composite);
        self.global_key = global_key;
    }

    /// True when the node must be mounted inside its own host view.
    ///
    /// View mounts carry their attributes on the view itself and never get
    /// an extra host.
    pub fn needs_host_view(&self) -> bool {
        !self.tail_component().is_view_mount()
            && self.flags.intersects(
                NodeFlags::FORCE_HOST_VIEW
                    | NodeFlags::CLICK_HANDLER
                    | NodeFlags::TOUCH_HANDLER
                    | NodeFlags::DUPLICATE_CHILDREN_STATE,
            )
    }
}
