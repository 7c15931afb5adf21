//! Node Tree Builder - Resolve a component tree into internal nodes.
//!
//! Resolution of one component, in order:
//!
//! ```text
//! released?            → NullLayout (propagates to the root)
//! reusable previous?   → copy the previous subtree (reconciliation)
//! measured already?    → take the measured subtree from the cache
//! otherwise            → by kind: container / composite / mount /
//!                        selector / error boundary
//! ```
//!
//! Global keys are `parent,segment` where the segment is the manual key, or
//! the type name with a `$n` suffix for the n-th repeated sibling of a type.

use std::collections::HashMap;

use crate::component::{Component, ComponentKind, LayoutContext, RenderScope};
use crate::error::{Error, LifecycleMethod, Result};
use crate::output::TransitionId;

use super::node::{InternalNode, NodeFlags, NodeId};
use super::node_tree::NodeTree;

/// Outcome of resolving one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved into a (detached) node.
    Node(NodeId),
    /// The component rendered nothing.
    Empty,
    /// The computation was released; nothing below this point was built.
    NullLayout,
}

/// Global key of `component` under `parent_key`.
///
/// `duplicate_index` is how many earlier siblings produced the same segment;
/// repeats are suffixed so every key stays unique among siblings.
pub fn compute_global_key(
    parent_key: Option<&str>,
    component: &Component,
    duplicate_index: usize,
) -> String {
    let segment = segment(component);
    let mut key = match parent_key {
        Some(parent) => format!("{parent},{segment}"),
        None => segment.to_string(),
    };
    if duplicate_index > 0 {
        let marker = if component.key().is_some() { '!' } else { '$' };
        key.push(marker);
        key.push_str(&duplicate_index.to_string());
    }
    key
}

fn segment(component: &Component) -> &str {
    component.key().unwrap_or(component.type_name())
}

/// Resolve `root` into `ctx`'s node tree.
pub fn resolve_tree(ctx: &mut LayoutContext, root: &Component) -> Result<Resolution> {
    let key = compute_global_key(None, root, 0);
    resolve_component(ctx, root, key, None)
}

/// Resolve one component with an already computed global key.
pub(crate) fn resolve_component(
    ctx: &mut LayoutContext,
    component: &Component,
    global_key: String,
    parent_key: Option<&str>,
) -> Result<Resolution> {
    if ctx.is_released() {
        tracing::trace!(key = %global_key, "layout released, not resolving");
        return Ok(Resolution::NullLayout);
    }

    if let Some(node) = reuse_previous(ctx, component, &global_key)? {
        return Ok(Resolution::Node(node));
    }

    if let Some(node) = ctx.take_measured_node(component) {
        rekey_subtree(&mut ctx.tree, node, &global_key)?;
        return Ok(Resolution::Node(node));
    }

    let resolution = match component.kind() {
        ComponentKind::Container {
            direction,
            children,
        } => {
            let mut node = InternalNode::new(component.clone(), global_key.clone());
            node.style.flex_direction = *direction;
            let id = ctx.tree.create(node);
            resolve_children(ctx, id, children, &global_key)?
        }
        ComponentKind::Composite(render) => {
            let rendered = {
                let mut scope = RenderScope::new(ctx, component, &global_key);
                render(&mut scope)
            };
            ctx.stats.rendered += 1;
            let child = rendered.map_err(|source| Error::ComponentRender {
                component: component.type_name().to_string(),
                method: LifecycleMethod::OnCreateLayout,
                source,
            })?;
            match child {
                Some(child) => resolve_single(ctx, component, &child, &global_key)?,
                None => Resolution::Empty,
            }
        }
        ComponentKind::Mount(_) => {
            let node = InternalNode::new(component.clone(), global_key.clone());
            Resolution::Node(ctx.tree.create(node))
        }
        ComponentKind::Selector(candidates) => {
            let mut last = Resolution::Empty;
            for candidate in candidates {
                if ctx.is_released() {
                    return Ok(Resolution::NullLayout);
                }
                last = resolve_single(ctx, component, candidate, &global_key)?;
                if !matches!(last, Resolution::Empty) {
                    break;
                }
            }
            last
        }
        ComponentKind::ErrorBoundary { child, fallback } => {
            match resolve_single(ctx, component, child, &global_key) {
                Ok(resolution) => resolution,
                Err(Error::ComponentRender {
                    component: failed,
                    method,
                    source,
                }) => {
                    tracing::debug!(
                        boundary = %global_key,
                        component = %failed,
                        %method,
                        error = %source,
                        "error boundary caught render failure"
                    );
                    match fallback(&source) {
                        Some(replacement) => {
                            resolve_single(ctx, component, &replacement, &global_key)?
                        }
                        None => Resolution::Empty,
                    }
                }
                Err(err) => return Err(err),
            }
        }
    };

    if let Resolution::Node(id) = resolution {
        let node = ctx.tree.node_mut(id)?;
        if node.global_key() == global_key {
            apply_transition_key(node, component, parent_key);
        }
    }
    Ok(resolution)
}

/// Resolve the single child of a wrapping component and record the wrapper
/// on the resulting node.
fn resolve_single(
    ctx: &mut LayoutContext,
    wrapper: &Component,
    child: &Component,
    global_key: &str,
) -> Result<Resolution> {
    let child_key = compute_global_key(Some(global_key), child, 0);
    let resolution = resolve_component(ctx, child, child_key, Some(global_key))?;
    if let Resolution::Node(id) = resolution {
        let node = ctx.tree.node_mut(id)?;
        node.wrap_with(wrapper.clone(), global_key.to_string());
    }
    Ok(resolution)
}

/// Resolve container children in order, attaching every produced node.
///
/// On release the container is returned as `NullLayout` with the children
/// resolved so far still attached; on error the partial subtree is released.
fn resolve_children(
    ctx: &mut LayoutContext,
    parent: NodeId,
    children: &[Component],
    parent_key: &str,
) -> Result<Resolution> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for child in children {
        if ctx.is_released() {
            return Ok(Resolution::NullLayout);
        }

        let occurrences = seen.entry(segment(child)).or_insert(0);
        if *occurrences > 0 && child.key().is_some() {
            tracing::warn!(
                parent = parent_key,
                key = child.key().unwrap_or_default(),
                "duplicate manual key among siblings"
            );
        }
        let child_key = compute_global_key(Some(parent_key), child, *occurrences);
        *occurrences += 1;

        match resolve_component(ctx, child, child_key, Some(parent_key)) {
            Ok(Resolution::Node(id)) => ctx.tree.add_child(parent, id)?,
            Ok(Resolution::Empty) => {}
            Ok(Resolution::NullLayout) => return Ok(Resolution::NullLayout),
            Err(err) => {
                ctx.tree.release_tree(parent)?;
                return Err(err);
            }
        }
    }
    Ok(Resolution::Node(parent))
}

fn apply_transition_key(node: &mut InternalNode, component: &Component, parent_key: Option<&str>) {
    let common = component.common();
    if let Some(key) = &common.transition_key {
        let owner = parent_key.unwrap_or_default();
        node.transition_id = Some(TransitionId::new(
            key.clone(),
            common.transition_key_scope.resolve(owner),
        ));
    }
}

/// Copy the previous layout's subtree for `component` when nothing it
/// depends on changed.
fn reuse_previous(
    ctx: &mut LayoutContext,
    component: &Component,
    global_key: &str,
) -> Result<Option<NodeId>> {
    if ctx.is_dirty(global_key) {
        return Ok(None);
    }
    let Some(reconciler) = &ctx.reconciler else {
        return Ok(None);
    };
    let Some(previous) = reconciler.reusable_node(component, global_key) else {
        return Ok(None);
    };
    let state = reconciler.previous().clone();

    let copy = ctx.tree.copy_subtree(state.tree(), previous)?;
    let node = ctx.tree.node_mut(copy)?;
    node.components[0] = component.clone();
    node.flags |= NodeFlags::REUSED;
    ctx.stats.reused += 1;
    tracing::trace!(key = global_key, "reused previous subtree");
    Ok(Some(copy))
}

/// Move a detached subtree under a new global key.
fn rekey_subtree(tree: &mut NodeTree, root: NodeId, global_key: &str) -> Result<()> {
    let old = tree.node(root)?.global_key().to_string();
    if old == global_key {
        return Ok(());
    }
    for id in tree.depth_first(root) {
        let node = tree.node_mut(id)?;
        if let Some(rest) = node.global_key.strip_prefix(old.as_str()) {
            node.global_key = format!("{global_key}{rest}");
        }
    }
    Ok(())
}
