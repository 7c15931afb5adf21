//! Core types for spark-mount.
//!
//! Geometry and flexbox enums shared by the node tree, the layout adapter,
//! the layout state and the mount engine.

use std::fmt;

// =============================================================================
// Rect
// =============================================================================

/// Integer rectangle in pixels, edges inclusive on left/top and exclusive on
/// right/bottom.
///
/// Output bounds are absolute (relative to the root host); visible rects are
/// expressed in the same coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// The empty rect at the origin.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a rect from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rect from an origin and a size.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True when the rect has no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// True when both rects share a non-empty area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// True when `other` lies fully inside this rect.
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Translate the rect by `(dx, dy)`.
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Shrink each edge inwards by the given insets.
    pub const fn inset(&self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            self.left + left,
            self.top + top,
            self.right - right,
            self.bottom - bottom,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {} - {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// =============================================================================
// Size
// =============================================================================

/// Resolved pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Dimension - Supports absolute and percentage values
// =============================================================================

/// A style dimension: content-sized, absolute pixels, or percentage of parent.
///
/// ```
/// use spark_mount::types::Dimension;
///
/// let width = Dimension::Px(48.0);
/// let height = Dimension::Percent(100.0);
/// assert_ne!(width, height);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Size from content.
    #[default]
    Auto,
    /// Absolute size in pixels.
    Px(f32),
    /// Percentage of parent size (0-100).
    Percent(f32),
}

impl From<i32> for Dimension {
    fn from(value: i32) -> Self {
        Self::Px(value as f32)
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Self::Px(value)
    }
}

// =============================================================================
// Flexbox enums
// =============================================================================

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    /// Check if this is a row direction.
    pub fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment for items and `align_self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Inherit from the parent (only meaningful for `align_self`).
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
}

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

/// Resolved text/layout direction, used to map START/END edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

impl LayoutDirection {
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Rtl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 15, 15)));
        // Touching edges do not intersect
        assert!(!a.intersects(&Rect::new(10, 0, 20, 10)));
        assert!(!a.intersects(&Rect::new(0, 10, 10, 20)));
        // Empty rects never intersect
        assert!(!a.intersects(&Rect::EMPTY));
    }

    #[test]
    fn test_rect_geometry() {
        let r = Rect::from_xywh(5, 10, 20, 30);
        assert_eq!(r, Rect::new(5, 10, 25, 40));
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 30);
        assert_eq!(r.offset(1, 2), Rect::new(6, 12, 26, 42));
        assert_eq!(r.inset(1, 1, 1, 1), Rect::new(6, 11, 24, 39));
        assert!(r.contains(&Rect::new(6, 11, 24, 39)));
        assert!(!r.contains(&Rect::new(0, 0, 24, 39)));
    }

    #[test]
    fn test_dimension_default() {
        assert_eq!(Dimension::default(), Dimension::Auto);
        assert_eq!(Dimension::from(12), Dimension::Px(12.0));
    }
}
