//! Transitions - Keys matching outputs across layout states.
//!
//! Interpolation is out of scope: transitions are only described here, so a
//! layout state can validate its keys and tell the animation side which
//! properties of which outputs (and of the root bounds) are animated.

use std::fmt;

/// Scope a transition key is unique in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransitionKeyScope {
    /// Unique across the whole layout state.
    Global,
    /// Unique among the outputs owned by the component with this global key.
    Local(String),
}

/// A transition key resolved to its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionId {
    pub reference: String,
    pub scope: TransitionKeyScope,
}

impl TransitionId {
    pub fn new(reference: impl Into<String>, scope: TransitionKeyScope) -> Self {
        Self {
            reference: reference.into(),
            scope,
        }
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            TransitionKeyScope::Global => write!(f, "TransitionId{{\"{}\", GLOBAL}}", self.reference),
            TransitionKeyScope::Local(owner) => {
                write!(f, "TransitionId{{\"{}\", LOCAL({owner})}}", self.reference)
            }
        }
    }
}

/// Property a transition animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    X,
    Y,
    Width,
    Height,
    Alpha,
    Scale,
}

impl AnimatedProperty {
    /// Properties covered by a layout transition.
    pub const LAYOUT: [AnimatedProperty; 4] = [
        AnimatedProperty::X,
        AnimatedProperty::Y,
        AnimatedProperty::Width,
        AnimatedProperty::Height,
    ];
}

/// Which outputs a transition unit applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionTarget {
    /// Every output with a transition key.
    All,
    /// Outputs whose transition key is one of these.
    Keys(Vec<String>),
}

/// One animation of some properties of some targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionUnit {
    pub target: TransitionTarget,
    pub properties: Vec<AnimatedProperty>,
    /// Start value when the target appears.
    pub appear_from: Option<f32>,
    /// End value when the target disappears.
    pub disappear_to: Option<f32>,
}

impl TransitionUnit {
    pub fn animate(mut self, property: AnimatedProperty) -> Self {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    pub fn appear_from(mut self, value: f32) -> Self {
        self.appear_from = Some(value);
        self
    }

    pub fn disappear_to(mut self, value: f32) -> Self {
        self.disappear_to = Some(value);
        self
    }

    pub fn has_appear_animation(&self) -> bool {
        self.appear_from.is_some()
    }

    pub fn targets_property(&self, property: AnimatedProperty) -> bool {
        self.properties.contains(&property)
    }

    pub fn targets(&self, id: &TransitionId) -> bool {
        match &self.target {
            TransitionTarget::All => true,
            TransitionTarget::Keys(keys) => keys.iter().any(|key| *key == id.reference),
        }
    }
}

/// A unit or a set of transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Unit(TransitionUnit),
    Set(Vec<Transition>),
}

impl Transition {
    /// Start a unit targeting the given transition keys.
    pub fn create(keys: &[&str]) -> TransitionUnit {
        TransitionUnit {
            target: TransitionTarget::Keys(keys.iter().map(|k| k.to_string()).collect()),
            properties: Vec::new(),
            appear_from: None,
            disappear_to: None,
        }
    }

    /// Layout properties of every keyed output.
    pub fn all_layout() -> TransitionUnit {
        TransitionUnit {
            target: TransitionTarget::All,
            properties: AnimatedProperty::LAYOUT.to_vec(),
            appear_from: None,
            disappear_to: None,
        }
    }

    pub fn set(transitions: Vec<Transition>) -> Self {
        Self::Set(transitions)
    }

    /// Every unit in declaration order.
    pub fn units(&self) -> Vec<&TransitionUnit> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(transition) = stack.pop() {
            match transition {
                Self::Unit(unit) => out.push(unit),
                Self::Set(children) => stack.extend(children.iter().rev()),
            }
        }
        out
    }
}

impl From<TransitionUnit> for Transition {
    fn from(unit: TransitionUnit) -> Self {
        Self::Unit(unit)
    }
}

/// Transitions that animate one property of the root bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootBoundsTransition {
    pub has_transition: bool,
    pub appear_transition: Option<TransitionUnit>,
}

/// Collect the units animating `property` of the root into `out`.
///
/// An explicit appear unit always wins over a plain one (such as
/// `all_layout()`), whatever order they were declared in.
pub fn collect_root_bounds_transitions(
    transition: &Transition,
    property: AnimatedProperty,
    root_id: &TransitionId,
    out: &mut RootBoundsTransition,
) {
    for unit in transition.units() {
        if !unit.targets_property(property) || !unit.targets(root_id) {
            continue;
        }
        out.has_transition = true;
        if unit.has_appear_animation() {
            out.appear_transition = Some(unit.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> TransitionId {
        TransitionId::new("root", TransitionKeyScope::Global)
    }

    #[test]
    fn test_display() {
        assert_eq!(root().to_string(), "TransitionId{\"root\", GLOBAL}");
        let local = TransitionId::new("x", TransitionKeyScope::Local("Column".into()));
        assert_eq!(local.to_string(), "TransitionId{\"x\", LOCAL(Column)}");
    }

    #[test]
    fn test_appear_wins_regardless_of_order() {
        let appear: Transition = Transition::create(&["root"])
            .animate(AnimatedProperty::Height)
            .appear_from(0.0)
            .into();
        let layout: Transition = Transition::all_layout().into();

        for set in [
            Transition::set(vec![appear.clone(), layout.clone()]),
            Transition::set(vec![layout.clone(), appear.clone()]),
        ] {
            let mut out = RootBoundsTransition::default();
            collect_root_bounds_transitions(&set, AnimatedProperty::Height, &root(), &mut out);
            assert!(out.has_transition);
            let unit = out.appear_transition.expect("appear transition");
            assert_eq!(unit.appear_from, Some(0.0));
        }
    }

    #[test]
    fn test_untargeted_property_is_ignored() {
        let transition: Transition = Transition::create(&["root"])
            .animate(AnimatedProperty::Alpha)
            .into();
        let mut out = RootBoundsTransition::default();
        collect_root_bounds_transitions(&transition, AnimatedProperty::Width, &root(), &mut out);
        assert_eq!(out, RootBoundsTransition::default());
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let transition: Transition = Transition::create(&["other"])
            .animate(AnimatedProperty::Width)
            .appear_from(0.0)
            .into();
        let mut out = RootBoundsTransition::default();
        collect_root_bounds_transitions(&transition, AnimatedProperty::Width, &root(), &mut out);
        assert!(!out.has_transition);
    }

    #[test]
    fn test_nested_sets_are_walked() {
        let transition = Transition::set(vec![Transition::set(vec![
            Transition::all_layout().into(),
        ])]);
        assert_eq!(transition.units().len(), 1);
    }
}
