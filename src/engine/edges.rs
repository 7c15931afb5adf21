//! Edges - Compact sparse storage for per-edge spacing values.
//!
//! Nine logical edges share a small dense value vector. A single `u64` maps
//! each edge to its slot (4 bits per edge, `0xF` = unset). Unsetting an edge
//! frees its slot; the next edge set reuses the lowest free slot before the
//! vector grows.
//!
//! Resolution precedence for a physical edge:
//!
//! ```text
//! START/END (direction-mapped)  >  LEFT/TOP/RIGHT/BOTTOM  >  HORIZONTAL/VERTICAL  >  ALL
//! ```
//!
//! [`Edges::get`] covers the last three levels; [`Edges::resolve`] adds the
//! START/END mapping for the node's layout direction.

use crate::types::LayoutDirection;

/// Marker for "no value". Setting an edge to `UNDEFINED` unsets it.
pub const UNDEFINED: f32 = f32::NAN;

const INDEX_STEP: u32 = 4;
const INDEX_MASK: u64 = 0xF;
const UNDEFINED_INDEX: u8 = 0xF;
const ALL_UNSET: u64 = !0;
const EDGE_COUNT: usize = 9;

/// Logical edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

impl Edge {
    pub const ALL_EDGES: [Edge; EDGE_COUNT] = [
        Edge::Left,
        Edge::Top,
        Edge::Right,
        Edge::Bottom,
        Edge::Start,
        Edge::End,
        Edge::Horizontal,
        Edge::Vertical,
        Edge::All,
    ];

    #[inline]
    fn shift(self) -> u32 {
        self as u32 * INDEX_STEP
    }

    fn is_alias(self) -> bool {
        matches!(self, Edge::Horizontal | Edge::Vertical | Edge::All)
    }
}

/// Physical insets resolved for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Sparse map from [`Edge`] to value.
#[derive(Debug, Clone)]
pub struct Edges {
    edges_to_values_index: u64,
    values: Vec<f32>,
    has_aliases_set: bool,
}

impl Default for Edges {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Edges {
    /// Two edge maps are equal when every edge reads the same raw value,
    /// regardless of slot assignment.
    fn eq(&self, other: &Self) -> bool {
        Edge::ALL_EDGES.iter().all(|&edge| {
            let (a, b) = (self.get_raw(edge), other.get_raw(edge));
            (a.is_nan() && b.is_nan()) || a == b
        })
    }
}

impl Edges {
    pub fn new() -> Self {
        Self {
            edges_to_values_index: ALL_UNSET,
            values: Vec::new(),
            has_aliases_set: false,
        }
    }

    /// Set `edge` to `value`; `UNDEFINED` unsets it.
    ///
    /// Returns true if the stored value changed.
    pub fn set(&mut self, edge: Edge, value: f32) -> bool {
        let current = self.get_raw(edge);
        if same_value(current, value) {
            return false;
        }

        match self.index_of(edge) {
            Some(slot) if value.is_nan() => {
                self.values[slot] = UNDEFINED;
                self.set_index(edge, UNDEFINED_INDEX);
            }
            Some(slot) => self.values[slot] = value,
            None => {
                let slot = self.first_available_slot();
                self.values[slot] = value;
                self.set_index(edge, slot as u8);
            }
        }

        self.has_aliases_set = Edge::ALL_EDGES
            .iter()
            .any(|&e| e.is_alias() && self.index_of(e).is_some());
        true
    }

    /// Remove the value of `edge`, freeing its slot.
    pub fn unset(&mut self, edge: Edge) -> bool {
        self.set(edge, UNDEFINED)
    }

    /// Value of `edge` with alias fallback (`HORIZONTAL`/`VERTICAL`, then `ALL`).
    ///
    /// Defaults to `0.0`, except `START`/`END` which default to `UNDEFINED`.
    pub fn get(&self, edge: Edge) -> f32 {
        let default = match edge {
            Edge::Start | Edge::End => UNDEFINED,
            _ => 0.0,
        };

        if self.edges_to_values_index == ALL_UNSET {
            return default;
        }
        if let Some(slot) = self.index_of(edge) {
            return self.values[slot];
        }

        if self.has_aliases_set && edge != Edge::All {
            let second = match edge {
                Edge::Top | Edge::Bottom => Some(Edge::Vertical),
                Edge::Left | Edge::Right | Edge::Start | Edge::End => Some(Edge::Horizontal),
                Edge::Horizontal | Edge::Vertical | Edge::All => None,
            };
            if let Some(slot) = second.and_then(|e| self.index_of(e)) {
                return self.values[slot];
            }
            if let Some(slot) = self.index_of(Edge::All) {
                return self.values[slot];
            }
        }

        default
    }

    /// Value stored for exactly `edge`, `UNDEFINED` if unset.
    pub fn get_raw(&self, edge: Edge) -> f32 {
        self.index_of(edge)
            .map(|slot| self.values[slot])
            .unwrap_or(UNDEFINED)
    }

    /// Resolve a physical edge, honouring START/END for `direction`.
    ///
    /// In LTR, START maps to LEFT and END to RIGHT; RTL flips the mapping.
    /// An explicit START/END wins over the physical edge it maps to.
    pub fn resolve(&self, edge: Edge, direction: LayoutDirection) -> f32 {
        self.resolve_defined(edge, direction).unwrap_or(0.0)
    }

    /// Like [`resolve`](Self::resolve), but `None` when no level holds a value.
    pub fn resolve_defined(&self, edge: Edge, direction: LayoutDirection) -> Option<f32> {
        let relative = match (edge, direction) {
            (Edge::Left, LayoutDirection::Ltr) | (Edge::Right, LayoutDirection::Rtl) => {
                Some(Edge::Start)
            }
            (Edge::Right, LayoutDirection::Ltr) | (Edge::Left, LayoutDirection::Rtl) => {
                Some(Edge::End)
            }
            _ => None,
        };

        if let Some(relative) = relative {
            let raw = self.get_raw(relative);
            if !raw.is_nan() {
                return Some(raw);
            }
        }

        let alias = match edge {
            Edge::Top | Edge::Bottom => Edge::Vertical,
            _ => Edge::Horizontal,
        };
        [edge, alias, Edge::All]
            .into_iter()
            .map(|e| self.get_raw(e))
            .find(|value| !value.is_nan())
    }

    /// Resolve all four physical edges.
    pub fn resolve_insets(&self, direction: LayoutDirection) -> Insets {
        Insets {
            left: self.resolve(Edge::Left, direction),
            top: self.resolve(Edge::Top, direction),
            right: self.resolve(Edge::Right, direction),
            bottom: self.resolve(Edge::Bottom, direction),
        }
    }

    /// True when no edge holds a value.
    pub fn is_empty(&self) -> bool {
        self.edges_to_values_index == ALL_UNSET
    }

    #[inline]
    fn index_of(&self, edge: Edge) -> Option<usize> {
        let index = ((self.edges_to_values_index >> edge.shift()) & INDEX_MASK) as u8;
        (index != UNDEFINED_INDEX).then_some(index as usize)
    }

    fn set_index(&mut self, edge: Edge, index: u8) {
        let shift = edge.shift();
        self.edges_to_values_index &= !(INDEX_MASK << shift);
        self.edges_to_values_index |= (index as u64 & INDEX_MASK) << shift;
    }

    fn first_available_slot(&mut self) -> usize {
        if let Some(slot) = self.values.iter().position(|v| v.is_nan()) {
            return slot;
        }
        self.values.push(UNDEFINED);
        self.values.len() - 1
    }
}

#[inline]
fn same_value(a: f32, b: f32) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_single_edge() {
        let mut edges = Edges::new();
        edges.set(Edge::Top, 5.0);
        assert_eq!(edges.get_raw(Edge::Top), 5.0);
        assert_eq!(edges.index_of(Edge::Top), Some(0));
        assert!(edges.get_raw(Edge::Left).is_nan());
    }

    #[test]
    fn test_overwrite_keeps_slot() {
        let mut edges = Edges::new();
        edges.set(Edge::Left, 1.0);
        edges.set(Edge::Left, 2.0);
        edges.set(Edge::Left, 3.0);
        assert_eq!(edges.get(Edge::Left), 3.0);
        assert_eq!(edges.index_of(Edge::Left), Some(0));
        assert_eq!(edges.values.len(), 1);
    }

    #[test]
    fn test_unset_frees_slot_for_reuse() {
        let mut edges = Edges::new();
        edges.set(Edge::Left, 1.0);
        edges.set(Edge::Top, 2.0);
        assert_eq!(edges.index_of(Edge::Left), Some(0));
        assert_eq!(edges.index_of(Edge::Top), Some(1));

        assert!(edges.unset(Edge::Left));
        assert_eq!(edges.index_of(Edge::Left), None);

        edges.set(Edge::Right, 7.0);
        assert_eq!(edges.index_of(Edge::Right), Some(0));
        assert_eq!(edges.get(Edge::Right), 7.0);
        assert_eq!(edges.get(Edge::Top), 2.0);
        assert_eq!(edges.values.len(), 2);
    }

    #[test]
    fn test_set_same_value_reports_unchanged() {
        let mut edges = Edges::new();
        assert!(edges.set(Edge::Bottom, 4.0));
        assert!(!edges.set(Edge::Bottom, 4.0));
        assert!(!edges.unset(Edge::Left));
    }

    #[test]
    fn test_all_aliases_every_physical_edge() {
        let mut edges = Edges::new();
        edges.set(Edge::All, 10.0);
        for edge in [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom] {
            assert_eq!(edges.get(edge), 10.0);
        }
    }

    #[test]
    fn test_horizontal_beats_all() {
        let mut edges = Edges::new();
        edges.set(Edge::All, 10.0);
        edges.set(Edge::Horizontal, 3.0);
        assert_eq!(edges.get(Edge::Left), 3.0);
        assert_eq!(edges.get(Edge::Right), 3.0);
        assert_eq!(edges.get(Edge::Top), 10.0);

        edges.set(Edge::Vertical, 4.0);
        assert_eq!(edges.get(Edge::Bottom), 4.0);
    }

    #[test]
    fn test_physical_beats_aliases() {
        let mut edges = Edges::new();
        edges.set(Edge::All, 10.0);
        edges.set(Edge::Horizontal, 3.0);
        edges.set(Edge::Left, 1.0);
        assert_eq!(edges.get(Edge::Left), 1.0);
        assert_eq!(edges.get(Edge::Right), 3.0);
    }

    #[test]
    fn test_defaults() {
        let edges = Edges::new();
        assert_eq!(edges.get(Edge::Left), 0.0);
        assert!(edges.get(Edge::Start).is_nan());
        assert!(edges.get(Edge::End).is_nan());
        assert!(edges.is_empty());
    }

    #[test]
    fn test_start_resolves_by_direction() {
        let mut edges = Edges::new();
        edges.set(Edge::Start, 5.0);
        edges.set(Edge::Left, 10.0);

        assert_eq!(edges.resolve(Edge::Left, LayoutDirection::Ltr), 5.0);
        assert_eq!(edges.resolve(Edge::Left, LayoutDirection::Rtl), 10.0);
        assert_eq!(edges.resolve(Edge::Right, LayoutDirection::Rtl), 5.0);
    }

    #[test]
    fn test_end_falls_back_to_aliases() {
        let mut edges = Edges::new();
        edges.set(Edge::End, 6.0);
        edges.set(Edge::All, 2.0);

        let ltr = edges.resolve_insets(LayoutDirection::Ltr);
        assert_eq!(ltr, Insets { left: 2.0, top: 2.0, right: 6.0, bottom: 2.0 });

        let rtl = edges.resolve_insets(LayoutDirection::Rtl);
        assert_eq!(rtl, Insets { left: 6.0, top: 2.0, right: 2.0, bottom: 2.0 });
    }

    #[test]
    fn test_equality_ignores_slots() {
        let mut a = Edges::new();
        a.set(Edge::Left, 1.0);
        a.set(Edge::Top, 2.0);

        let mut b = Edges::new();
        b.set(Edge::Top, 2.0);
        b.set(Edge::Left, 1.0);

        assert_eq!(a, b);
        b.set(Edge::Left, 3.0);
        assert_ne!(a, b);
    }

    fn any_edge() -> impl Strategy<Value = Edge> {
        (0usize..EDGE_COUNT).prop_map(|i| Edge::ALL_EDGES[i])
    }

    proptest! {
        #[test]
        fn prop_last_write_wins(ops in prop::collection::vec((any_edge(), -100.0f32..100.0), 1..40)) {
            let mut edges = Edges::new();
            let mut expected = [UNDEFINED; EDGE_COUNT];
            for (edge, value) in &ops {
                edges.set(*edge, *value);
                expected[*edge as usize] = *value;
            }
            for edge in Edge::ALL_EDGES {
                let raw = edges.get_raw(edge);
                let want = expected[edge as usize];
                prop_assert!(same_value(raw, want));
            }
            prop_assert!(edges.values.len() <= EDGE_COUNT);
        }

        #[test]
        fn prop_unset_then_set_never_grows(
            first in any_edge(),
            second in any_edge(),
            value in 0.0f32..50.0,
        ) {
            let mut edges = Edges::new();
            edges.set(first, value);
            edges.unset(first);
            edges.set(second, value + 1.0);
            prop_assert_eq!(edges.values.len(), 1);
            prop_assert_eq!(edges.index_of(second), Some(0));
        }
    }
}
