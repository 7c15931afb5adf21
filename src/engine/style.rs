//! NodeStyle - Flexbox style properties carried by every internal node.
//!
//! # Property Categories
//!
//! - **Container**: flex_direction, flex_wrap, justify_content, align_items
//! - **Item**: flex_grow, flex_shrink, flex_basis, align_self, position_type
//! - **Dimensions**: width, height, min/max width, min/max height, aspect_ratio
//! - **Spacing**: margin, padding, border, position (all [`Edges`])
//! - **Touch**: touch_expansion (only applied with a click or touch handler)
//! - **Direction**: explicit layout direction, or inherit from the parent

use crate::types::{
    Align, Dimension, FlexDirection, FlexWrap, Justify, LayoutDirection, PositionType,
};

use super::edges::{Edge, Edges};

/// Flexbox style of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    // =========================================================================
    // CONTAINER PROPERTIES
    // =========================================================================
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: Justify,
    /// `Align::Auto` means stretch.
    pub align_items: Align,

    // =========================================================================
    // ITEM PROPERTIES
    // =========================================================================
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub align_self: Align,
    pub position_type: PositionType,

    // =========================================================================
    // DIMENSIONS
    // =========================================================================
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub min_height: Dimension,
    pub max_height: Dimension,
    pub aspect_ratio: Option<f32>,

    // =========================================================================
    // SPACING
    // =========================================================================
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    /// Insets for absolutely positioned nodes.
    pub position: Edges,
    pub touch_expansion: Edges,

    /// `None` inherits from the parent.
    pub direction: Option<LayoutDirection>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            flex_direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: Justify::FlexStart,
            align_items: Align::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_height: Dimension::Auto,
            aspect_ratio: None,
            margin: Edges::new(),
            padding: Edges::new(),
            border: Edges::new(),
            position: Edges::new(),
            touch_expansion: Edges::new(),
            direction: None,
        }
    }
}

impl NodeStyle {
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = height.into();
        self
    }

    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.flex_grow = grow;
        self
    }

    pub fn flex_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = direction;
        self
    }

    pub fn margin(mut self, edge: Edge, value: f32) -> Self {
        self.margin.set(edge, value);
        self
    }

    pub fn padding(mut self, edge: Edge, value: f32) -> Self {
        self.padding.set(edge, value);
        self
    }

    pub fn border(mut self, edge: Edge, value: f32) -> Self {
        self.border.set(edge, value);
        self
    }

    pub fn position(mut self, edge: Edge, value: f32) -> Self {
        self.position.set(edge, value);
        self
    }

    pub fn position_type(mut self, position_type: PositionType) -> Self {
        self.position_type = position_type;
        self
    }

    pub fn touch_expansion(mut self, edge: Edge, value: f32) -> Self {
        self.touch_expansion.set(edge, value);
        self
    }

    pub fn direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Overlay the explicitly sized fields of `outer` on top of this style.
    ///
    /// Used when a composite component wraps the node its render produced:
    /// the wrapper's own sizing and spacing win over the inner node's.
    pub fn apply_overrides(&mut self, outer: &NodeStyle) {
        let defaults = NodeStyle::default();
        macro_rules! take {
            ($($field:ident),*) => {
                $(if outer.$field != defaults.$field {
                    self.$field = outer.$field.clone();
                })*
            };
        }
        take!(
            flex_grow, flex_shrink, flex_basis, align_self, position_type, width, height,
            min_width, max_width, min_height, max_height, aspect_ratio, direction
        );
        for edge in Edge::ALL_EDGES {
            for (mine, theirs) in [
                (&mut self.margin, &outer.margin),
                (&mut self.padding, &outer.padding),
                (&mut self.border, &outer.border),
                (&mut self.position, &outer.position),
                (&mut self.touch_expansion, &outer.touch_expansion),
            ] {
                let value = theirs.get_raw(edge);
                if !value.is_nan() {
                    mine.set(edge, value);
                }
            }
        }
    }
}
