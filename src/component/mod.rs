//! Components - What to render, and the context they render in.
//!
//! - [`Component`]: immutable description with a closed [`ComponentKind`]
//! - [`Props`]: structurally comparable props
//! - [`LayoutContext`]: per-computation arena, measure cache, cancellation
//! - [`RenderScope`]: what a render callback sees
//! - [`StateStore`]: state keyed by global key
//! - [`primitives`]: builtin components

mod context;
mod model;
pub mod primitives;
mod props;
mod state;

pub use context::{
    CachedResult, LayoutContext, MeasuredResultCache, RenderScope, ResolveStats, StateSnapshot,
};
pub use model::{
    Capabilities, CommonProps, Component, ComponentId, ComponentKind, ContentKind, FallbackFn,
    MeasureFn, MountSpec, RenderFn, TransitionScopeKind, type_id_for,
};
pub use props::{PropValue, Props};
pub use state::StateStore;
