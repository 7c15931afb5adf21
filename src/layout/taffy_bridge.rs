//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts node styles to Taffy styles, runs layout computation under the
//! root size specs, and writes geometry back into the node tree.
//!
//! Edge values are resolved here, per node direction, before Taffy sees them:
//! Taffy has no START/END edges, so the mapping is done up front and the
//! solver only ever gets physical insets.

use std::collections::HashMap;

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent,
    AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf, LengthPercentage,
    LengthPercentageAuto, NodeId as TaffyNodeId, Position as TaffyPosition, Rect, Size, Style,
    TaffyTree,
};

use crate::component::MeasureFn;
use crate::engine::{Edge, Edges, Insets, NodeId, NodeStyle, NodeTree};
use crate::error::{Error, Result};
use crate::types::{
    Align, Dimension, FlexDirection, FlexWrap, Justify, LayoutDirection, PositionType,
    Size as PixelSize,
};

use super::size_spec::{SizeSpec, SizeSpecMode};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

/// Convert our Dimension to Taffy's Dimension.
fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Px(n) => TaffyDimension::Length(n),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_length(value: f32) -> LengthPercentage {
    LengthPercentage::Length(value)
}

fn to_lpa(value: Option<f32>) -> LengthPercentageAuto {
    value.map_or(LengthPercentageAuto::Auto, LengthPercentageAuto::Length)
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: Justify) -> Option<TaffyJustifyContent> {
    Some(match justify {
        Justify::FlexStart => TaffyJustifyContent::FlexStart,
        Justify::Center => TaffyJustifyContent::Center,
        Justify::FlexEnd => TaffyJustifyContent::FlexEnd,
        Justify::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        Justify::SpaceAround => TaffyJustifyContent::SpaceAround,
        Justify::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::Auto => None, // stretch
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::FlexStart => Some(TaffyAlignItems::FlexStart),
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
    }
}

fn to_taffy_align_self(align: Align) -> Option<TaffyAlignSelf> {
    match align {
        Align::Auto => None, // inherit from parent
        Align::Stretch => Some(TaffyAlignSelf::Stretch),
        Align::FlexStart => Some(TaffyAlignSelf::FlexStart),
        Align::Center => Some(TaffyAlignSelf::Center),
        Align::FlexEnd => Some(TaffyAlignSelf::FlexEnd),
        Align::Baseline => Some(TaffyAlignSelf::Baseline),
    }
}

fn to_taffy_position(position: PositionType) -> TaffyPosition {
    match position {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

fn insets_rect(insets: Insets) -> Rect<LengthPercentage> {
    Rect {
        left: to_length(insets.left),
        right: to_length(insets.right),
        top: to_length(insets.top),
        bottom: to_length(insets.bottom),
    }
}

fn inset_rect(position: &Edges, direction: LayoutDirection) -> Rect<LengthPercentageAuto> {
    Rect {
        left: to_lpa(position.resolve_defined(Edge::Left, direction)),
        right: to_lpa(position.resolve_defined(Edge::Right, direction)),
        top: to_lpa(position.resolve_defined(Edge::Top, direction)),
        bottom: to_lpa(position.resolve_defined(Edge::Bottom, direction)),
    }
}

/// Build a Taffy Style from a node style with its edges already resolved.
fn build_style(
    style: &NodeStyle,
    direction: LayoutDirection,
    margin: Insets,
    padding: Insets,
    border: Insets,
) -> Style {
    Style {
        display: Display::Flex,
        position: to_taffy_position(style.position_type),
        inset: inset_rect(&style.position, direction),

        // Flex container properties
        flex_direction: to_taffy_flex_direction(style.flex_direction),
        flex_wrap: to_taffy_flex_wrap(style.flex_wrap),
        justify_content: to_taffy_justify_content(style.justify_content),
        align_items: to_taffy_align_items(style.align_items),

        // Flex item properties
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: to_taffy_dimension(style.flex_basis),
        align_self: to_taffy_align_self(style.align_self),

        // Dimensions
        size: Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        min_size: Size {
            width: to_taffy_dimension(style.min_width),
            height: to_taffy_dimension(style.min_height),
        },
        max_size: Size {
            width: to_taffy_dimension(style.max_width),
            height: to_taffy_dimension(style.max_height),
        },
        aspect_ratio: style.aspect_ratio,

        margin: Rect {
            left: LengthPercentageAuto::Length(margin.left),
            right: LengthPercentageAuto::Length(margin.right),
            top: LengthPercentageAuto::Length(margin.top),
            bottom: LengthPercentageAuto::Length(margin.bottom),
        },
        padding: insets_rect(padding),
        border: insets_rect(border),

        ..Default::default()
    }
}

/// Constrain the root style by the size specs.
fn apply_root_specs(style: &mut Style, width_spec: SizeSpec, height_spec: SizeSpec) {
    match width_spec.mode {
        SizeSpecMode::Exactly => style.size.width = TaffyDimension::Length(width_spec.size as f32),
        SizeSpecMode::AtMost => {
            style.max_size.width = TaffyDimension::Length(width_spec.size as f32)
        }
        SizeSpecMode::Unspecified => {}
    }
    match height_spec.mode {
        SizeSpecMode::Exactly => {
            style.size.height = TaffyDimension::Length(height_spec.size as f32)
        }
        SizeSpecMode::AtMost => {
            style.max_size.height = TaffyDimension::Length(height_spec.size as f32)
        }
        SizeSpecMode::Unspecified => {}
    }
}

fn to_available(spec: SizeSpec) -> AvailableSpace {
    match spec.mode {
        SizeSpecMode::Exactly | SizeSpecMode::AtMost => AvailableSpace::Definite(spec.size as f32),
        SizeSpecMode::Unspecified => AvailableSpace::MaxContent,
    }
}

/// Map what Taffy asks for back into a size spec for a measure function.
fn to_size_spec(known: Option<f32>, available: AvailableSpace) -> SizeSpec {
    match (known, available) {
        (Some(size), _) => SizeSpec::exactly(size.round() as i32),
        (None, AvailableSpace::Definite(size)) => SizeSpec::at_most(size.round() as i32),
        (None, AvailableSpace::MinContent | AvailableSpace::MaxContent) => SizeSpec::unspecified(),
    }
}

fn solver_error(err: taffy::TaffyError) -> Error {
    Error::Layout(err.to_string())
}

// =============================================================================
// TREE BUILDING
// =============================================================================

struct Builder<'a> {
    tree: &'a mut NodeTree,
    taffy: TaffyTree<NodeId>,
    measures: HashMap<NodeId, MeasureFn>,
    nodes: Vec<(NodeId, TaffyNodeId)>,
}

impl Builder<'_> {
    /// Create the Taffy node for `id` and its subtree.
    ///
    /// Resolved insets and the effective direction are stored on the node
    /// as they are computed.
    fn build(&mut self, id: NodeId, inherited: LayoutDirection) -> Result<TaffyNodeId> {
        let node = self.tree.node_mut(id)?;
        let direction = node.style.direction.unwrap_or(inherited);
        let margin = node.style.margin.resolve_insets(direction);
        let padding = node.style.padding.resolve_insets(direction);
        let border = node.style.border.resolve_insets(direction);
        let touch_expansion = if node.flags.has_touch_handler() {
            node.style.touch_expansion.resolve_insets(direction)
        } else {
            Insets::ZERO
        };

        node.layout.direction = direction;
        node.layout.margin = margin;
        node.layout.padding = padding;
        node.layout.border = border;
        node.layout.touch_expansion = touch_expansion;

        let style = build_style(&node.style, direction, margin, padding, border);
        let children = node.children.clone();
        let measure = match node.tail_component().mount_spec() {
            Some(spec) if children.is_empty() => spec.measure.clone(),
            _ => None,
        };

        let taffy_node = match measure {
            Some(measure) => {
                self.measures.insert(id, measure);
                self.taffy.new_leaf_with_context(style, id)
            }
            None => self.taffy.new_leaf(style),
        }
        .map_err(solver_error)?;
        self.nodes.push((id, taffy_node));

        for child in children {
            let child_node = self.build(child, direction)?;
            self.taffy
                .add_child(taffy_node, child_node)
                .map_err(solver_error)?;
        }
        Ok(taffy_node)
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Lay out the subtree at `root` under the given specs.
///
/// Writes position (relative to the parent's border box), size and resolved
/// insets into every node and returns the root size in whole pixels.
pub fn compute_layout(
    tree: &mut NodeTree,
    root: NodeId,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
) -> Result<PixelSize> {
    let mut builder = Builder {
        tree,
        taffy: TaffyTree::new(),
        measures: HashMap::new(),
        nodes: Vec::new(),
    };
    let root_node = builder.build(root, LayoutDirection::Ltr)?;

    let Builder {
        tree,
        mut taffy,
        measures,
        nodes,
    } = builder;

    let mut root_style = taffy.style(root_node).map_err(solver_error)?.clone();
    apply_root_specs(&mut root_style, width_spec, height_spec);
    taffy.set_style(root_node, root_style).map_err(solver_error)?;

    let available = Size {
        width: to_available(width_spec),
        height: to_available(height_spec),
    };

    let measure_fn = |known_dimensions: Size<Option<f32>>,
                      available_space: Size<AvailableSpace>,
                      _node_id: TaffyNodeId,
                      context: Option<&mut NodeId>,
                      _style: &Style| {
        let Some(measure) = context.and_then(|id| measures.get(id)) else {
            return Size::ZERO;
        };
        let measured = measure(
            to_size_spec(known_dimensions.width, available_space.width),
            to_size_spec(known_dimensions.height, available_space.height),
        );
        Size {
            width: known_dimensions.width.unwrap_or(measured.width as f32),
            height: known_dimensions.height.unwrap_or(measured.height as f32),
        }
    };
    taffy
        .compute_layout_with_measure(root_node, available, measure_fn)
        .map_err(solver_error)?;

    // Extract results
    for (id, taffy_node) in nodes {
        let layout = taffy.layout(taffy_node).map_err(solver_error)?;
        let node = tree.node_mut(id)?;
        node.layout.x = layout.location.x;
        node.layout.y = layout.location.y;
        node.layout.width = layout.size.width;
        node.layout.height = layout.size.height;
    }

    let root_layout = tree.node(root)?.layout;
    tracing::trace!(
        width = root_layout.width,
        height = root_layout.height,
        %width_spec,
        %height_spec,
        "computed layout"
    );
    Ok(PixelSize::new(
        root_layout.width.round() as i32,
        root_layout.height.round() as i32,
    ))
}
