//! Component - Immutable description of what to render.
//!
//! A component is a closed set of variants ([`ComponentKind`]) instead of an
//! open class hierarchy:
//!
//! ```text
//! Container  → flex container with child components (Row / Column)
//! Composite  → render callback producing another component (or nothing)
//! Mount      → leaf producing native content (drawable or view)
//! Selector   → first candidate that renders wins
//! ErrorBoundary → renders a fallback when its subtree fails
//! ```
//!
//! Components are cheap to clone (one `Arc`). Identity is the instance
//! [`ComponentId`]; [`Component::make_shallow_copy`] keeps it, so caches keyed
//! by id treat a copy like the original.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::{NodeFlags, NodeStyle};
use crate::error::RenderError;
use crate::layout::SizeSpec;
use crate::output::{Transition, TransitionKeyScope};
use crate::types::{FlexDirection, Size};

use super::context::RenderScope;
use super::props::Props;

// =============================================================================
// Identity
// =============================================================================

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique component instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric id of a component type, used in output id packing.
///
/// FNV-1a over the type name, so the same name maps to the same id in every
/// tree and process regardless of which types were seen first. Never 0.
pub fn type_id_for(type_name: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let hash = type_name
        .bytes()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ byte as u32).wrapping_mul(PRIME));
    hash.max(1)
}

// =============================================================================
// Kinds
// =============================================================================

/// Render callback of a composite component.
pub type RenderFn = Arc<
    dyn Fn(&mut RenderScope<'_>) -> Result<Option<Component>, RenderError> + Send + Sync,
>;

/// Measure callback of a mount leaf: `(width_spec, height_spec) -> size`.
pub type MeasureFn = Arc<dyn Fn(SizeSpec, SizeSpec) -> Size + Send + Sync>;

/// Fallback of an error boundary.
pub type FallbackFn = Arc<dyn Fn(&RenderError) -> Option<Component> + Send + Sync>;

/// Native content a mount leaf produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Drawable,
    View,
}

/// Mount leaf description.
#[derive(Clone)]
pub struct MountSpec {
    pub content: ContentKind,
    pub measure: Option<MeasureFn>,
}

impl fmt::Debug for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountSpec")
            .field("content", &self.content)
            .field("measure", &self.measure.is_some())
            .finish()
    }
}

/// The closed set of component behaviours.
#[derive(Clone)]
pub enum ComponentKind {
    Container {
        direction: FlexDirection,
        children: Vec<Component>,
    },
    Composite(RenderFn),
    Mount(MountSpec),
    Selector(Vec<Component>),
    ErrorBoundary {
        child: Component,
        fallback: FallbackFn,
    },
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container {
                direction,
                children,
            } => f
                .debug_struct("Container")
                .field("direction", direction)
                .field("children", &children.len())
                .finish(),
            Self::Composite(_) => f.write_str("Composite"),
            Self::Mount(spec) => spec.fmt(f),
            Self::Selector(candidates) => write!(f, "Selector({})", candidates.len()),
            Self::ErrorBoundary { child, .. } => write!(f, "ErrorBoundary({})", child.type_name()),
        }
    }
}

bitflags::bitflags! {
    /// What a component can do, derived from its kind plus explicit opt-ins.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        const HAS_CHILDREN = 1 << 0;
        const RENDERS = 1 << 1;
        const MOUNTS = 1 << 2;
        const CAN_MEASURE = 1 << 3;
        const CREATES_STATE = 1 << 4;
        const HAS_TRANSITIONS = 1 << 5;
        const CATCHES_ERRORS = 1 << 6;
    }
}

// =============================================================================
// Common props
// =============================================================================

/// Props every component accepts: style plus the output-generating flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommonProps {
    pub style: NodeStyle,
    /// Background drawable reference.
    pub background: Option<String>,
    /// Foreground drawable reference.
    pub foreground: Option<String>,
    /// Border color; a border output is produced when set and the style has borders.
    pub border_color: Option<u32>,
    /// Event handlers, referenced by name only.
    pub click_handler: Option<String>,
    pub touch_handler: Option<String>,
    pub visibility_handler: Option<String>,
    pub transition_key: Option<String>,
    pub transition_key_scope: TransitionScopeKind,
    pub duplicate_parent_state: bool,
    pub duplicate_children_state: bool,
    pub wrap_in_view: bool,
    pub focusable: bool,
    pub content_description: Option<String>,
    pub view_tag: Option<String>,
}

/// Scope of a declared transition key, resolved to a [`TransitionKeyScope`]
/// once the owner's global key is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionScopeKind {
    #[default]
    Global,
    Local,
}

impl TransitionScopeKind {
    pub(crate) fn resolve(self, owner_key: &str) -> TransitionKeyScope {
        match self {
            Self::Global => TransitionKeyScope::Global,
            Self::Local => TransitionKeyScope::Local(owner_key.to_string()),
        }
    }
}

impl CommonProps {
    pub fn node_flags(&self) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        flags.set(NodeFlags::DUPLICATE_PARENT_STATE, self.duplicate_parent_state);
        flags.set(NodeFlags::DUPLICATE_CHILDREN_STATE, self.duplicate_children_state);
        flags.set(NodeFlags::FORCE_HOST_VIEW, self.wrap_in_view);
        flags.set(NodeFlags::CLICK_HANDLER, self.click_handler.is_some());
        flags.set(NodeFlags::TOUCH_HANDLER, self.touch_handler.is_some());
        flags.set(NodeFlags::VISIBILITY_HANDLER, self.visibility_handler.is_some());
        flags
    }
}

// =============================================================================
// Component
// =============================================================================

#[derive(Clone)]
struct ComponentInner {
    id: ComponentId,
    type_name: &'static str,
    key: Option<String>,
    props: Props,
    common: CommonProps,
    kind: ComponentKind,
    capabilities: Capabilities,
    transitions: Vec<Transition>,
}

/// Immutable, shareable component.
#[derive(Clone)]
pub struct Component {
    inner: Arc<ComponentInner>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("type", &self.inner.type_name)
            .field("key", &self.inner.key)
            .field("kind", &self.inner.kind)
            .finish()
    }
}

impl Component {
    /// Create a component of `type_name` with the given behaviour.
    pub fn new(type_name: &'static str, kind: ComponentKind) -> Self {
        let capabilities = match &kind {
            ComponentKind::Container { .. } => Capabilities::HAS_CHILDREN,
            ComponentKind::Composite(_) => Capabilities::RENDERS,
            ComponentKind::Mount(spec) if spec.measure.is_some() => {
                Capabilities::MOUNTS | Capabilities::CAN_MEASURE
            }
            ComponentKind::Mount(_) => Capabilities::MOUNTS,
            ComponentKind::Selector(_) => Capabilities::RENDERS,
            ComponentKind::ErrorBoundary { .. } => {
                Capabilities::RENDERS | Capabilities::CATCHES_ERRORS
            }
        };
        Self {
            inner: Arc::new(ComponentInner {
                id: ComponentId::next(),
                type_name,
                key: None,
                props: Props::new(),
                common: CommonProps::default(),
                kind,
                capabilities,
                transitions: Vec::new(),
            }),
        }
    }

    /// Composite component rendering through `render`.
    pub fn composite<F>(type_name: &'static str, render: F) -> Self
    where
        F: Fn(&mut RenderScope<'_>) -> Result<Option<Component>, RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(type_name, ComponentKind::Composite(Arc::new(render)))
    }

    // =========================================================================
    // Builder-style setters (used while constructing, before sharing)
    // =========================================================================

    fn inner_mut(&mut self) -> &mut ComponentInner {
        Arc::make_mut(&mut self.inner)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.inner_mut().key = Some(key.into());
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.inner_mut().props = props;
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.inner_mut().common.style = style;
        self
    }

    /// Adjust common props in place.
    pub fn with_common(mut self, f: impl FnOnce(&mut CommonProps)) -> Self {
        f(&mut self.inner_mut().common);
        self
    }

    pub fn with_transition_key(mut self, key: impl Into<String>, scope: TransitionScopeKind) -> Self {
        let inner = self.inner_mut();
        inner.common.transition_key = Some(key.into());
        inner.common.transition_key_scope = scope;
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        let inner = self.inner_mut();
        inner.transitions.push(transition);
        inner.capabilities |= Capabilities::HAS_TRANSITIONS;
        self
    }

    /// Mark the component as owning state keyed by its global key.
    pub fn with_state(mut self) -> Self {
        self.inner_mut().capabilities |= Capabilities::CREATES_STATE;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    pub fn type_id(&self) -> u32 {
        type_id_for(self.inner.type_name)
    }

    pub fn key(&self) -> Option<&str> {
        self.inner.key.as_deref()
    }

    pub fn props(&self) -> &Props {
        &self.inner.props
    }

    pub fn common(&self) -> &CommonProps {
        &self.inner.common
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.inner.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.inner.transitions
    }

    pub fn mount_spec(&self) -> Option<&MountSpec> {
        match &self.inner.kind {
            ComponentKind::Mount(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn is_view_mount(&self) -> bool {
        matches!(self.mount_spec(), Some(spec) if spec.content == ContentKind::View)
    }

    /// Same instance (or a shallow copy of it).
    pub fn is_same_instance(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.id == other.inner.id
    }

    /// Copy sharing identity, keys and props with the original.
    ///
    /// No layout result travels with the copy: measured results live in the
    /// `LayoutContext` that produced them, keyed by the shared id.
    pub fn make_shallow_copy(&self) -> Self {
        Self {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Structural equivalence: same type, key, props, common props and
    /// equivalent children. Render callbacks are not compared; a type name
    /// identifies its render function.
    pub fn is_equivalent_to(&self, other: &Component) -> bool {
        if self.is_same_instance(other) {
            return true;
        }
        let (a, b) = (&*self.inner, &*other.inner);
        if a.type_name != b.type_name
            || a.key != b.key
            || a.props != b.props
            || a.common != b.common
            || a.transitions != b.transitions
        {
            return false;
        }

        match (&a.kind, &b.kind) {
            (
                ComponentKind::Container {
                    direction: d1,
                    children: c1,
                },
                ComponentKind::Container {
                    direction: d2,
                    children: c2,
                },
            ) => d1 == d2 && all_equivalent(c1, c2),
            (ComponentKind::Composite(_), ComponentKind::Composite(_)) => true,
            (ComponentKind::Mount(m1), ComponentKind::Mount(m2)) => m1.content == m2.content,
            (ComponentKind::Selector(c1), ComponentKind::Selector(c2)) => all_equivalent(c1, c2),
            (
                ComponentKind::ErrorBoundary { child: c1, .. },
                ComponentKind::ErrorBoundary { child: c2, .. },
            ) => c1.is_equivalent_to(c2),
            _ => false,
        }
    }
}

fn all_equivalent(a: &[Component], b: &[Component]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_equivalent_to(y))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::primitives::{column, drawable, text};

    #[test]
    fn test_shallow_copy_preserves_identity() {
        let original = text("Hello").with_key("title");
        let copy = original.make_shallow_copy();

        assert_eq!(copy.id(), original.id());
        assert_eq!(copy.key(), Some("title"));
        assert_eq!(copy.type_name(), original.type_name());
        assert_eq!(copy.type_id(), original.type_id());
        assert!(copy.is_same_instance(&original));
        assert!(copy.is_equivalent_to(&original));
    }

    #[test]
    fn test_equivalence_compares_props() {
        let a = text("Hello");
        let b = text("Hello");
        let c = text("World");

        assert_ne!(a.id(), b.id());
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
    }

    #[test]
    fn test_equivalence_recurses_into_children() {
        let a = column(vec![text("a"), drawable("Image")]);
        let b = column(vec![text("a"), drawable("Image")]);
        let c = column(vec![text("b"), drawable("Image")]);
        let d = column(vec![text("a")]);

        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
        assert!(!a.is_equivalent_to(&d));
    }

    #[test]
    fn test_type_ids_are_stable_per_name() {
        let a = type_id_for("Image");
        let b = type_id_for("Text");
        assert_ne!(a, b);
        assert_eq!(type_id_for("Image"), a);
        // Independent of first use: a known FNV-1a value.
        assert_eq!(type_id_for("a"), 0xe40c_292c);
        assert_ne!(type_id_for(""), 0);
    }

    #[test]
    fn test_capabilities() {
        assert!(column(Vec::new()).capabilities().contains(Capabilities::HAS_CHILDREN));
        assert!(text("x").capabilities().contains(Capabilities::CAN_MEASURE));
        assert!(drawable("Image").capabilities().contains(Capabilities::MOUNTS));
        let stateful = Component::composite("Counter", |_| Ok(None)).with_state();
        assert!(stateful.capabilities().contains(Capabilities::CREATES_STATE | Capabilities::RENDERS));
    }
}
