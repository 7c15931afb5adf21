//! Output collection - Walk the laid-out node tree and emit outputs.
//!
//! Per node, in order: host, background, content, children, border,
//! foreground. A node with a host moves everything below it one level
//! deeper and into that host.

use std::collections::{HashMap, HashSet};

use crate::component::{CommonProps, Component, ContentKind};
use crate::diff::{DiffNode, compute_update_state, is_key_dirty};
use crate::engine::{InternalNode, NodeFlags, NodeId, NodeTree};
use crate::error::{Error, Result};
use crate::output::{
    LayoutOutput, OutputFlags, OutputIdCalculator, OutputType, OutputUnitsAffinityGroup,
    ROOT_HOST_ID, TransitionId, UpdateState, ViewAttributes, VisibilityOutput,
};
use crate::types::Rect;

/// Everything collection produced.
pub(crate) struct Collected {
    pub outputs: Vec<LayoutOutput>,
    pub visibility_outputs: Vec<VisibilityOutput>,
    pub transition_ids: HashMap<TransitionId, OutputUnitsAffinityGroup<u64>>,
    pub diff_root: DiffNode,
}

pub(crate) struct Collector<'a> {
    tree: &'a NodeTree,
    dirty_keys: &'a HashSet<String>,
    ids: OutputIdCalculator,
    visibility_ids: OutputIdCalculator,
    outputs: Vec<LayoutOutput>,
    visibility_outputs: Vec<VisibilityOutput>,
    transition_ids: HashMap<TransitionId, OutputUnitsAffinityGroup<u64>>,
}

/// Where a node's outputs go.
#[derive(Clone, Copy)]
struct Placement {
    host: u64,
    level: i64,
    parent_x: i32,
    parent_y: i32,
}

impl<'a> Collector<'a> {
    pub fn new(tree: &'a NodeTree, dirty_keys: &'a HashSet<String>) -> Self {
        let mut ids = OutputIdCalculator::new();
        ids.reserve(ROOT_HOST_ID);
        Self {
            tree,
            dirty_keys,
            ids,
            visibility_ids: OutputIdCalculator::new(),
            outputs: Vec::new(),
            visibility_outputs: Vec::new(),
            transition_ids: HashMap::new(),
        }
    }

    /// Collect the tree at `root`; the root host (id 0) is always emitted.
    pub fn collect(
        mut self,
        root_component: &Component,
        root: Option<NodeId>,
        width: i32,
        height: i32,
        previous: Option<&DiffNode>,
    ) -> Result<Collected> {
        if let Some(previous) = previous {
            self.hold_previous_ids(previous);
        }

        let bounds = Rect::from_xywh(0, 0, width, height);
        let mut host = LayoutOutput::new(
            ROOT_HOST_ID,
            root_component.clone(),
            OutputType::Host,
            bounds,
        );
        host.global_key = root_component
            .key()
            .unwrap_or(root_component.type_name())
            .to_string();

        let Some(root) = root else {
            host.update_state = compute_update_state(previous, root_component, false);
            let diff_root = DiffNode::new(root_component.clone(), host.global_key.clone());
            self.push(host);
            return Ok(self.finish(diff_root));
        };

        let node = self.tree.node(root)?;
        let dirty = is_key_dirty(self.dirty_keys.iter(), node.global_key());
        host.update_state = compute_update_state(previous, node.head_component(), dirty);
        host.global_key = node.global_key().to_string();
        host.flags = host_flags(node);
        host.attributes = Some(view_attributes(node));
        self.push(host);

        let placement = Placement {
            host: ROOT_HOST_ID,
            level: 1,
            parent_x: 0,
            parent_y: 0,
        };
        let diff_root = self.collect_node(root, placement, previous, true)?;
        Ok(self.finish(diff_root))
    }

    fn hold_previous_ids(&mut self, previous: &DiffNode) {
        previous.for_each(&mut |node| {
            for (_, &id) in node.outputs.iter() {
                self.ids.hold(id);
            }
            if let Some(id) = node.visibility_id {
                self.visibility_ids.hold(id);
            }
        });
    }

    fn finish(self, diff_root: DiffNode) -> Collected {
        Collected {
            outputs: self.outputs,
            visibility_outputs: self.visibility_outputs,
            transition_ids: self.transition_ids,
            diff_root,
        }
    }

    fn push(&mut self, mut output: LayoutOutput) {
        output.index = self.outputs.len();
        self.outputs.push(output);
    }

    fn collect_node(
        &mut self,
        id: NodeId,
        placement: Placement,
        previous: Option<&DiffNode>,
        is_root: bool,
    ) -> Result<DiffNode> {
        let tree = self.tree;
        let node = tree.node(id)?;
        let head = node.head_component();
        let x = placement.parent_x + node.layout.x.round() as i32;
        let y = placement.parent_y + node.layout.y.round() as i32;
        let bounds = Rect::from_xywh(
            x,
            y,
            node.layout.width.round() as i32,
            node.layout.height.round() as i32,
        );

        let dirty = is_key_dirty(self.dirty_keys.iter(), node.global_key());
        let update_state = compute_update_state(previous, head, dirty);
        let mut diff = DiffNode::new(head.clone(), node.global_key());
        let previous_id = |output_type: OutputType| {
            previous.and_then(|diff| diff.outputs.get(output_type).copied())
        };

        let mut inner = placement;
        inner.parent_x = x;
        inner.parent_y = y;

        let emit = OutputSource {
            node,
            bounds,
            update_state,
        };

        if !is_root && node.needs_host_view() {
            let host_id = self.ids.output_id(
                head.type_id(),
                placement.level,
                OutputType::Host,
                previous_id(OutputType::Host),
            )?;
            let mut host =
                emit.output(host_id, head.clone(), OutputType::Host, bounds, placement.host);
            host.flags = host_flags(node);
            host.attributes = Some(view_attributes(node));
            diff.outputs.add(OutputType::Host, host_id)?;
            self.push(host);
            inner.host = host_id;
            inner.level = placement.level + 1;
        }

        if common_value(node, |c| c.background.as_ref()).is_some() {
            let output = self.drawable_output(
                &emit,
                OutputType::Background,
                inner,
                previous_id(OutputType::Background),
            )?;
            diff.outputs.add(OutputType::Background, output)?;
        }

        if let Some(spec) = node.tail_component().mount_spec() {
            let content_bounds = bounds.inset(
                (node.layout.padding.left + node.layout.border.left).round() as i32,
                (node.layout.padding.top + node.layout.border.top).round() as i32,
                (node.layout.padding.right + node.layout.border.right).round() as i32,
                (node.layout.padding.bottom + node.layout.border.bottom).round() as i32,
            );
            let tail = node.tail_component();
            let content_id = self.ids.output_id(
                tail.type_id(),
                inner.level,
                OutputType::Content,
                previous_id(OutputType::Content),
            )?;
            let mut content = emit.output(
                content_id,
                tail.clone(),
                OutputType::Content,
                content_bounds,
                inner.host,
            );
            if node.flags.contains(NodeFlags::DUPLICATE_PARENT_STATE) {
                content.flags |= OutputFlags::DUPLICATE_PARENT_STATE;
            }
            if spec.content == ContentKind::View {
                content.flags |= OutputFlags::IS_VIEW | host_flags(node);
                content.attributes = Some(view_attributes(node));
            }
            diff.outputs.add(OutputType::Content, content_id)?;
            self.push(content);
        }

        for &child in node.children() {
            let child_key = tree.node(child)?.global_key();
            let previous_child = previous.and_then(|diff| diff.child(child_key));
            let child_diff = self.collect_node(child, inner, previous_child, false)?;
            diff.children.push(child_diff);
        }

        if common_value(node, |c| c.border_color.as_ref()).is_some()
            && (node.layout.border.horizontal() > 0.0 || node.layout.border.vertical() > 0.0)
        {
            let output = self.drawable_output(
                &emit,
                OutputType::Border,
                inner,
                previous_id(OutputType::Border),
            )?;
            diff.outputs.add(OutputType::Border, output)?;
        }

        if common_value(node, |c| c.foreground.as_ref()).is_some() {
            let output = self.drawable_output(
                &emit,
                OutputType::Foreground,
                inner,
                previous_id(OutputType::Foreground),
            )?;
            diff.outputs.add(OutputType::Foreground, output)?;
        }

        if let Some(handler) = common_value(node, |c| c.visibility_handler.as_ref()) {
            let id = self.visibility_ids.visibility_id(
                head.type_id(),
                placement.level,
                previous.and_then(|diff| diff.visibility_id),
            )?;
            self.visibility_outputs.push(VisibilityOutput {
                id,
                global_key: node.global_key().to_string(),
                bounds,
                handler: handler.clone(),
            });
            diff.visibility_id = Some(id);
        }

        if let Some(transition_id) = &node.transition_id {
            self.register_transition(transition_id, &diff.outputs)?;
            let owned: Vec<u64> = diff.outputs.iter().map(|(_, id)| *id).collect();
            for output in self.outputs.iter_mut().filter(|o| owned.contains(&o.id)) {
                output.transition_id = Some(transition_id.clone());
            }
        }

        Ok(diff)
    }

    /// Background, border or foreground of a node, drawn by its head component.
    fn drawable_output(
        &mut self,
        emit: &OutputSource<'_>,
        output_type: OutputType,
        placement: Placement,
        previous: Option<u64>,
    ) -> Result<u64> {
        let head = emit.node.head_component();
        let id = self
            .ids
            .output_id(head.type_id(), placement.level, output_type, previous)?;
        let mut output = emit.output(id, head.clone(), output_type, emit.bounds, placement.host);
        if emit.node.flags.contains(NodeFlags::DUPLICATE_PARENT_STATE) {
            output.flags |= OutputFlags::DUPLICATE_PARENT_STATE;
        }
        self.push(output);
        Ok(id)
    }

    fn register_transition(
        &mut self,
        transition_id: &TransitionId,
        outputs: &OutputUnitsAffinityGroup<u64>,
    ) -> Result<()> {
        if self.transition_ids.contains_key(transition_id) {
            return Err(Error::DuplicateTransitionId(transition_id.clone()));
        }
        self.transition_ids
            .insert(transition_id.clone(), outputs.clone());
        Ok(())
    }
}

/// Shared data of every output a node emits.
struct OutputSource<'n> {
    node: &'n InternalNode,
    bounds: Rect,
    update_state: UpdateState,
}

impl OutputSource<'_> {
    fn output(
        &self,
        id: u64,
        component: Component,
        output_type: OutputType,
        bounds: Rect,
        host: u64,
    ) -> LayoutOutput {
        let mut output = LayoutOutput::new(id, component, output_type, bounds).with_host(host);
        output.update_state = self.update_state;
        output.global_key = self.node.global_key().to_string();
        output
    }
}

/// First value set along the node's component chain, outermost first.
fn common_value<'n, T>(
    node: &'n InternalNode,
    get: impl Fn(&'n CommonProps) -> Option<&'n T>,
) -> Option<&'n T> {
    node.components().iter().find_map(|component| get(component.common()))
}

fn host_flags(node: &InternalNode) -> OutputFlags {
    let mut flags = OutputFlags::empty();
    if node.flags.contains(NodeFlags::DUPLICATE_CHILDREN_STATE) {
        flags |= OutputFlags::DUPLICATE_CHILDREN_STATE;
    }
    let expansion = node.layout.touch_expansion;
    if expansion.horizontal() > 0.0 || expansion.vertical() > 0.0 {
        flags |= OutputFlags::HAS_TOUCH_EXPANSION;
    }
    flags
}

fn view_attributes(node: &InternalNode) -> ViewAttributes {
    let click_handler = common_value(node, |c| c.click_handler.as_ref()).cloned();
    ViewAttributes {
        clickable: click_handler.is_some(),
        focusable: node.components().iter().any(|c| c.common().focusable),
        content_description: common_value(node, |c| c.content_description.as_ref()).cloned(),
        view_tag: common_value(node, |c| c.view_tag.as_ref()).cloned(),
        click_handler,
        touch_handler: common_value(node, |c| c.touch_handler.as_ref()).cloned(),
    }
}
