//! SizeSpec - Measurement constraint along one axis.

use std::fmt;

/// How a size constraint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeSpecMode {
    /// No constraint.
    #[default]
    Unspecified,
    /// The size is imposed.
    Exactly,
    /// Any size up to the given one.
    AtMost,
}

/// A mode plus a size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizeSpec {
    pub mode: SizeSpecMode,
    pub size: i32,
}

impl SizeSpec {
    pub const fn exactly(size: i32) -> Self {
        Self {
            mode: SizeSpecMode::Exactly,
            size,
        }
    }

    pub const fn at_most(size: i32) -> Self {
        Self {
            mode: SizeSpecMode::AtMost,
            size,
        }
    }

    pub const fn unspecified() -> Self {
        Self {
            mode: SizeSpecMode::Unspecified,
            size: 0,
        }
    }

    /// Size to use when the content wants `desired`.
    pub fn resolve(&self, desired: i32) -> i32 {
        match self.mode {
            SizeSpecMode::Exactly => self.size,
            SizeSpecMode::AtMost => desired.min(self.size),
            SizeSpecMode::Unspecified => desired,
        }
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            SizeSpecMode::Exactly => write!(f, "EXACTLY {}", self.size),
            SizeSpecMode::AtMost => write!(f, "AT_MOST {}", self.size),
            SizeSpecMode::Unspecified => f.write_str("UNSPECIFIED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(SizeSpec::exactly(100).resolve(30), 100);
        assert_eq!(SizeSpec::at_most(100).resolve(30), 30);
        assert_eq!(SizeSpec::at_most(100).resolve(300), 100);
        assert_eq!(SizeSpec::unspecified().resolve(300), 300);
    }

    #[test]
    fn test_display() {
        assert_eq!(SizeSpec::exactly(10).to_string(), "EXACTLY 10");
        assert_eq!(SizeSpec::at_most(5).to_string(), "AT_MOST 5");
        assert_eq!(SizeSpec::unspecified().to_string(), "UNSPECIFIED");
    }
}
