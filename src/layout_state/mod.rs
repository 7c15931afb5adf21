//! Layout State - The result of one layout pass.
//!
//! Built once per `(root component, width spec, height spec)`:
//!
//! ```text
//! resolve_tree → compute_layout → collect outputs (diffed against previous)
//!             → sort tops / bottoms → LayoutState
//! ```
//!
//! The state owns the node arena it was built from so the next pass can
//! reconcile against it, and the diff tree so the next pass can keep output
//! ids stable.

mod collect;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::component::{Component, ComponentId, LayoutContext, ResolveStats};
use crate::diff::DiffNode;
use crate::engine::{NodeId, NodeTree, Resolution, resolve_tree};
use crate::error::Result;
use crate::layout::{SizeSpec, compute_layout};
use crate::output::{
    AnimatedProperty, LayoutOutput, OutputUnitsAffinityGroup, RootBoundsTransition, Transition,
    TransitionId, VisibilityOutput, collect_root_bounds_transitions,
};
use crate::types::Size;

use collect::Collector;

static NEXT_LAYOUT_STATE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct LayoutState {
    id: u64,
    component: Component,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
    width: i32,
    height: i32,

    outputs: Vec<LayoutOutput>,
    /// Output indices sorted by top edge.
    tops: Vec<usize>,
    /// Output indices sorted by bottom edge.
    bottoms: Vec<usize>,
    id_to_index: HashMap<u64, usize>,
    visibility_outputs: Vec<VisibilityOutput>,

    transition_ids: HashMap<TransitionId, OutputUnitsAffinityGroup<u64>>,
    root_transition_id: Option<TransitionId>,
    transitions: Vec<Transition>,

    tree: NodeTree,
    root: Option<NodeId>,
    key_index: HashMap<String, NodeId>,
    diff_root: Option<DiffNode>,
    /// State keys this layout treated as changed.
    dirty_keys: HashSet<String>,
    stats: ResolveStats,
    committed: AtomicBool,
}

impl LayoutState {
    /// Run a full layout pass.
    ///
    /// Returns `Ok(None)` when the context was released before the pass
    /// completed; nothing partially built escapes.
    pub fn calculate(
        mut ctx: LayoutContext,
        component: &Component,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
        previous: Option<&LayoutState>,
    ) -> Result<Option<LayoutState>> {
        let resolution = resolve_tree(&mut ctx, component)?;
        ctx.release_unused_measurements()?;

        let root = match resolution {
            Resolution::NullLayout => {
                tracing::debug!(component = component.type_name(), "layout released during resolve");
                return Ok(None);
            }
            Resolution::Empty => None,
            Resolution::Node(id) => Some(id),
        };
        if ctx.is_released() {
            return Ok(None);
        }

        let size = match root {
            Some(id) => compute_layout(&mut ctx.tree, id, width_spec, height_spec)?,
            None => Size::new(width_spec.resolve(0), height_spec.resolve(0)),
        };
        if ctx.is_released() {
            return Ok(None);
        }

        let stats = ctx.stats();
        let dirty_keys = ctx.dirty_keys().clone();
        let tree = ctx.into_tree();

        let previous_diff = previous.and_then(|state| state.diff_root.as_ref());
        let collected = Collector::new(&tree, &dirty_keys).collect(
            component,
            root,
            size.width,
            size.height,
            previous_diff,
        )?;

        let mut key_index = HashMap::new();
        let mut transitions = Vec::new();
        let mut root_transition_id = None;
        if let Some(root) = root {
            root_transition_id = tree.node(root)?.transition_id.clone();
            for id in tree.depth_first(root) {
                let node = tree.node(id)?;
                key_index.insert(node.global_key().to_string(), id);
                for c in node.components() {
                    transitions.extend(c.transitions().iter().cloned());
                }
            }
        }

        let mut state = LayoutState {
            id: NEXT_LAYOUT_STATE_ID.fetch_add(1, Ordering::Relaxed),
            component: component.clone(),
            width_spec,
            height_spec,
            width: size.width,
            height: size.height,
            outputs: collected.outputs,
            tops: Vec::new(),
            bottoms: Vec::new(),
            id_to_index: HashMap::new(),
            visibility_outputs: collected.visibility_outputs,
            transition_ids: collected.transition_ids,
            root_transition_id,
            transitions,
            tree,
            root,
            key_index,
            diff_root: Some(collected.diff_root),
            dirty_keys,
            stats,
            committed: AtomicBool::new(false),
        };
        state.index_outputs();

        tracing::debug!(
            layout_state = state.id,
            component = component.type_name(),
            outputs = state.outputs.len(),
            width = state.width,
            height = state.height,
            rendered = stats.rendered,
            reused = stats.reused,
            "layout state calculated"
        );
        Ok(Some(state))
    }

    /// State holding exactly `outputs`, for driving the mount state directly.
    pub fn from_outputs(
        component: Component,
        outputs: Vec<LayoutOutput>,
        width: i32,
        height: i32,
    ) -> Self {
        let mut state = LayoutState {
            id: NEXT_LAYOUT_STATE_ID.fetch_add(1, Ordering::Relaxed),
            component,
            width_spec: SizeSpec::exactly(width),
            height_spec: SizeSpec::exactly(height),
            width,
            height,
            outputs,
            tops: Vec::new(),
            bottoms: Vec::new(),
            id_to_index: HashMap::new(),
            visibility_outputs: Vec::new(),
            transition_ids: HashMap::new(),
            root_transition_id: None,
            transitions: Vec::new(),
            tree: NodeTree::new(),
            root: None,
            key_index: HashMap::new(),
            diff_root: None,
            dirty_keys: HashSet::new(),
            stats: ResolveStats::default(),
            committed: AtomicBool::new(false),
        };
        for (index, output) in state.outputs.iter_mut().enumerate() {
            output.index = index;
        }
        state.index_outputs();
        state
    }

    fn index_outputs(&mut self) {
        let outputs = &self.outputs;
        self.id_to_index = outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (output.id, index))
            .collect();

        self.tops = (0..outputs.len()).collect();
        self.tops
            .sort_by_key(|&index| (outputs[index].bounds.top, index));

        self.bottoms = (0..outputs.len()).collect();
        self.bottoms.sort_by(|&a, &b| {
            outputs[a]
                .bounds
                .bottom
                .cmp(&outputs[b].bounds.bottom)
                .then(b.cmp(&a))
        });
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn component_id(&self) -> ComponentId {
        self.component.id()
    }

    pub fn width_spec(&self) -> SizeSpec {
        self.width_spec
    }

    pub fn height_spec(&self) -> SizeSpec {
        self.height_spec
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn outputs(&self) -> &[LayoutOutput] {
        &self.outputs
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn output(&self, index: usize) -> Option<&LayoutOutput> {
        self.outputs.get(index)
    }

    pub fn output_by_id(&self, id: u64) -> Option<&LayoutOutput> {
        self.id_to_index.get(&id).map(|&index| &self.outputs[index])
    }

    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    pub fn tops(&self) -> &[usize] {
        &self.tops
    }

    pub fn bottoms(&self) -> &[usize] {
        &self.bottoms
    }

    pub fn visibility_outputs(&self) -> &[VisibilityOutput] {
        &self.visibility_outputs
    }

    pub fn transition_ids(&self) -> &HashMap<TransitionId, OutputUnitsAffinityGroup<u64>> {
        &self.transition_ids
    }

    pub fn root_transition_id(&self) -> Option<&TransitionId> {
        self.root_transition_id.as_ref()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions animating the root's width and height.
    pub fn root_bounds_transitions(&self) -> (RootBoundsTransition, RootBoundsTransition) {
        let mut width = RootBoundsTransition::default();
        let mut height = RootBoundsTransition::default();
        if let Some(root_id) = &self.root_transition_id {
            for transition in &self.transitions {
                collect_root_bounds_transitions(transition, AnimatedProperty::Width, root_id, &mut width);
                collect_root_bounds_transitions(transition, AnimatedProperty::Height, root_id, &mut height);
            }
        }
        (width, height)
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.root
    }

    /// Node whose outermost component has `global_key`.
    pub fn node_for_key(&self, global_key: &str) -> Option<NodeId> {
        self.key_index.get(global_key).copied()
    }

    pub fn diff_root(&self) -> Option<&DiffNode> {
        self.diff_root.as_ref()
    }

    pub fn dirty_keys(&self) -> &HashSet<String> {
        &self.dirty_keys
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    pub fn mark_committed(&self) {
        self.committed.store(true, Ordering::Release);
    }

    // =========================================================================
    // Compatibility
    // =========================================================================

    /// Resolved size equals `width` x `height`.
    pub fn is_compatible_size(&self, width: i32, height: i32) -> bool {
        self.width == width && self.height == height
    }

    pub fn is_compatible_spec(&self, width_spec: SizeSpec, height_spec: SizeSpec) -> bool {
        self.width_spec == width_spec && self.height_spec == height_spec
    }

    pub fn is_compatible_component_and_spec(
        &self,
        component_id: ComponentId,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
    ) -> bool {
        self.component.id() == component_id && self.is_compatible_spec(width_spec, height_spec)
    }
}
