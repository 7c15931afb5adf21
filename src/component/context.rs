//! LayoutContext - Per-computation state for resolving a component tree.
//!
//! One context belongs to one layout computation. It owns:
//! - the node arena the resolved tree is built into
//! - the measured-result cache (keyed by component id)
//! - the cancellation token of the layout future driving the computation
//! - the state snapshot render callbacks read from
//! - the optional reconcile source (previous layout state)
//!
//! Nothing here is shared between computations, so a shallow copy of a
//! component measured in one context is never reused by another.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::Config;
use crate::diff::{Reconciler, is_key_dirty};
use crate::engine::{
    NodeFlags, NodeId, NodeTree, Resolution, compute_global_key, resolve_component,
};
use crate::error::{Error, LifecycleMethod, RenderError, Result};
use crate::layout::{SizeSpec, compute_layout};
use crate::pipeline::CancellationToken;
use crate::types::Size;

use super::model::{Component, ComponentId};
use super::props::{PropValue, Props};

/// Immutable view of component state at the time the computation started.
pub type StateSnapshot = Arc<HashMap<String, PropValue>>;

// =============================================================================
// Measured result cache
// =============================================================================

/// A component measured during this computation.
#[derive(Debug, Clone)]
pub struct CachedResult {
    /// Detached subtree, `None` once the builder took it.
    pub node: Option<NodeId>,
    pub width_spec: SizeSpec,
    pub height_spec: SizeSpec,
    pub size: Size,
}

/// Measurements keyed by component id, so shallow copies hit the same entry.
#[derive(Debug, Default)]
pub struct MeasuredResultCache {
    results: HashMap<ComponentId, CachedResult>,
}

impl MeasuredResultCache {
    pub fn get_cached_result(&self, component: &Component) -> Option<&CachedResult> {
        self.results.get(&component.id())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn insert(&mut self, component: &Component, result: CachedResult) -> Option<CachedResult> {
        self.results.insert(component.id(), result)
    }

    fn take_node(&mut self, id: ComponentId) -> Option<NodeId> {
        self.results.get_mut(&id).and_then(|entry| entry.node.take())
    }

    fn drain_nodes(&mut self) -> Vec<NodeId> {
        self.results
            .values_mut()
            .filter_map(|entry| entry.node.take())
            .collect()
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Counters describing what the builder did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Composite render callbacks invoked.
    pub rendered: usize,
    /// Subtrees copied from the previous layout.
    pub reused: usize,
    /// Nodes taken from the measured-result cache.
    pub from_cache: usize,
}

// =============================================================================
// Context
// =============================================================================

/// State of one layout computation.
#[derive(Debug)]
pub struct LayoutContext {
    config: Arc<Config>,
    pub(crate) tree: NodeTree,
    cache: MeasuredResultCache,
    token: CancellationToken,
    state: StateSnapshot,
    dirty_keys: HashSet<String>,
    pub(crate) reconciler: Option<Reconciler>,
    pub(crate) stats: ResolveStats,
}

impl LayoutContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            tree: NodeTree::new(),
            cache: MeasuredResultCache::default(),
            token: CancellationToken::new(),
            state: StateSnapshot::default(),
            dirty_keys: HashSet::new(),
            reconciler: None,
            stats: ResolveStats::default(),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_state(mut self, state: StateSnapshot) -> Self {
        self.state = state;
        self
    }

    /// Keys whose state changed since the previous layout.
    pub fn with_dirty_keys(mut self, dirty_keys: HashSet<String>) -> Self {
        self.dirty_keys = dirty_keys;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    pub fn measured_results(&self) -> &MeasuredResultCache {
        &self.cache
    }

    /// True once the owning layout future was released.
    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True when a state update touched `global_key` or a key below it.
    pub fn is_dirty(&self, global_key: &str) -> bool {
        is_key_dirty(self.dirty_keys.iter(), global_key)
    }

    pub fn dirty_keys(&self) -> &HashSet<String> {
        &self.dirty_keys
    }

    pub fn state_value(&self, global_key: &str) -> Option<&PropValue> {
        self.state.get(global_key)
    }

    pub(crate) fn into_tree(self) -> NodeTree {
        self.tree
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Resolve and lay out `component` under the given specs.
    ///
    /// The result is cached by component id: measuring the same component (or
    /// a shallow copy of it) again with the same specs returns the cached
    /// size, and the builder later reuses the measured subtree instead of
    /// rendering the component a second time.
    pub fn measure(
        &mut self,
        component: &Component,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
    ) -> Result<Size> {
        if self.config.use_measured_result_cache
            && let Some(cached) = self.cache.get_cached_result(component)
            && cached.width_spec == width_spec
            && cached.height_spec == height_spec
        {
            tracing::trace!(component = component.type_name(), "measure cache hit");
            return Ok(cached.size);
        }

        let key = compute_global_key(None, component, 0);
        let node = match resolve_component(self, component, key, None)? {
            Resolution::Node(node) => node,
            // Nothing to measure: either empty or the computation was released.
            Resolution::Empty | Resolution::NullLayout => return Ok(Size::ZERO),
        };

        let size = compute_layout(&mut self.tree, node, width_spec, height_spec)
            .map_err(|err| measure_failure(component, err))?;

        if !self.config.use_measured_result_cache {
            self.tree.release_tree(node)?;
            return Ok(size);
        }

        let previous = self.cache.insert(
            component,
            CachedResult {
                node: Some(node),
                width_spec,
                height_spec,
                size,
            },
        );
        if let Some(stale) = previous.and_then(|entry| entry.node) {
            self.tree.release_tree(stale)?;
        }
        Ok(size)
    }

    /// Take the measured subtree of `component`, if any, for the builder.
    pub(crate) fn take_measured_node(&mut self, component: &Component) -> Option<NodeId> {
        if !self.config.use_measured_result_cache {
            return None;
        }
        let node = self.cache.take_node(component.id())?;
        if let Some(internal) = self.tree.get_mut(node) {
            internal.flags |= NodeFlags::FROM_MEASURE_CACHE;
        }
        self.stats.from_cache += 1;
        Some(node)
    }

    /// Release measured subtrees the builder never picked up.
    pub fn release_unused_measurements(&mut self) -> Result<()> {
        for node in self.cache.drain_nodes() {
            self.tree.release_tree(node)?;
        }
        Ok(())
    }
}

fn measure_failure(component: &Component, err: Error) -> Error {
    match err {
        Error::Layout(message) => Error::ComponentRender {
            component: component.type_name().to_string(),
            method: LifecycleMethod::OnMeasure,
            source: RenderError::new(message),
        },
        other => other,
    }
}

// =============================================================================
// RenderScope
// =============================================================================

/// What a composite's render callback can see.
pub struct RenderScope<'s> {
    ctx: &'s mut LayoutContext,
    component: &'s Component,
    global_key: &'s str,
}

impl<'s> RenderScope<'s> {
    pub(crate) fn new(
        ctx: &'s mut LayoutContext,
        component: &'s Component,
        global_key: &'s str,
    ) -> Self {
        Self {
            ctx,
            component,
            global_key,
        }
    }

    pub fn props(&self) -> &Props {
        self.component.props()
    }

    /// State stored under this component's global key.
    pub fn state(&self) -> Option<&PropValue> {
        self.ctx.state_value(self.global_key)
    }

    pub fn global_key(&self) -> &str {
        self.global_key
    }

    pub fn config(&self) -> &Config {
        self.ctx.config()
    }

    /// Measure another component from inside a render callback.
    pub fn measure(
        &mut self,
        component: &Component,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
    ) -> std::result::Result<Size, RenderError> {
        self.ctx
            .measure(component, width_spec, height_spec)
            .map_err(RenderError::from)
    }
}

impl From<Error> for RenderError {
    fn from(err: Error) -> Self {
        RenderError::new(err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
