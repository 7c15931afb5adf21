//! Builtin components.
//!
//! Just enough to drive the pipeline: flex containers, mount leaves,
//! composites, selectors, error boundaries and a measured text leaf.

use std::sync::Arc;

use crate::error::RenderError;
use crate::layout::{SizeSpec, SizeSpecMode};
use crate::types::{FlexDirection, Size};

use super::context::RenderScope;
use super::model::{Component, ComponentKind, ContentKind, MountSpec};
use super::props::Props;

/// Vertical flex container.
pub fn column(children: Vec<Component>) -> Component {
    Component::new(
        "Column",
        ComponentKind::Container {
            direction: FlexDirection::Column,
            children,
        },
    )
}

/// Horizontal flex container.
pub fn row(children: Vec<Component>) -> Component {
    Component::new(
        "Row",
        ComponentKind::Container {
            direction: FlexDirection::Row,
            children,
        },
    )
}

/// Leaf mounting a drawable. Sized by its style only.
pub fn drawable(type_name: &'static str) -> Component {
    Component::new(
        type_name,
        ComponentKind::Mount(MountSpec {
            content: ContentKind::Drawable,
            measure: None,
        }),
    )
}

/// Leaf mounting a native view; the view carries its own attributes.
pub fn view(type_name: &'static str) -> Component {
    Component::new(
        type_name,
        ComponentKind::Mount(MountSpec {
            content: ContentKind::View,
            measure: None,
        }),
    )
}

/// Drawable leaf with a measure function.
pub fn measured<F>(type_name: &'static str, measure: F) -> Component
where
    F: Fn(SizeSpec, SizeSpec) -> Size + Send + Sync + 'static,
{
    Component::new(
        type_name,
        ComponentKind::Mount(MountSpec {
            content: ContentKind::Drawable,
            measure: Some(Arc::new(measure)),
        }),
    )
}

/// Composite rendering through `render`.
pub fn composite<F>(type_name: &'static str, render: F) -> Component
where
    F: Fn(&mut RenderScope<'_>) -> Result<Option<Component>, RenderError> + Send + Sync + 'static,
{
    Component::composite(type_name, render)
}

/// Renders the first candidate that produces a node.
pub fn selector(candidates: Vec<Component>) -> Component {
    Component::new("Selector", ComponentKind::Selector(candidates))
}

/// Renders `fallback(error)` when resolving `child` fails.
pub fn error_boundary<F>(child: Component, fallback: F) -> Component
where
    F: Fn(&RenderError) -> Option<Component> + Send + Sync + 'static,
{
    Component::new(
        "ErrorBoundary",
        ComponentKind::ErrorBoundary {
            child,
            fallback: Arc::new(fallback),
        },
    )
}

// =============================================================================
// Text
// =============================================================================

/// Single-style text leaf, one unit per character, wrapped at the available
/// width.
pub fn text(content: &str) -> Component {
    let width = content.chars().count() as i32;
    measured("Text", move |width_spec, height_spec| {
        measure_text(width, width_spec, height_spec)
    })
    .with_props(Props::new().with("text", content))
}

fn measure_text(text_width: i32, width_spec: SizeSpec, height_spec: SizeSpec) -> Size {
    let width = width_spec.resolve(text_width);
    let lines = if text_width == 0 {
        0
    } else if width <= 0 {
        1
    } else {
        (text_width + width - 1) / width
    };
    let height = match height_spec.mode {
        SizeSpecMode::Exactly => height_spec.size,
        SizeSpecMode::AtMost => lines.min(height_spec.size),
        SizeSpecMode::Unspecified => lines,
    };
    Size::new(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_wraps_to_available_width() {
        assert_eq!(
            measure_text(10, SizeSpec::at_most(4), SizeSpec::unspecified()),
            Size::new(4, 3)
        );
        assert_eq!(
            measure_text(3, SizeSpec::at_most(40), SizeSpec::unspecified()),
            Size::new(3, 1)
        );
        assert_eq!(
            measure_text(3, SizeSpec::exactly(40), SizeSpec::exactly(2)),
            Size::new(40, 2)
        );
        assert_eq!(
            measure_text(0, SizeSpec::unspecified(), SizeSpec::unspecified()),
            Size::ZERO
        );
    }

    #[test]
    fn test_builtin_kinds() {
        assert!(view("Video").is_view_mount());
        assert!(!drawable("Image").is_view_mount());
        assert_eq!(row(Vec::new()).type_name(), "Row");
        assert_eq!(text("hi").props().get("text").and_then(|v| v.as_str()), Some("hi"));
        assert!(matches!(selector(Vec::new()).kind(), ComponentKind::Selector(_)));
    }
}
