//! Props - Structurally comparable component properties.
//!
//! Props are what `is_equivalent_to` compares: two components of the same
//! type with equal props render the same thing.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Vec<PropValue>),
}

impl PropValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

/// Ordered prop map; ordering keeps equality independent of insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Props::new().with("title", "Hello").with("count", 3);
        let b = Props::new().with("count", 3).with("title", "Hello");
        assert_eq!(a, b);
        assert_ne!(a, b.with("count", 4));
    }

    #[test]
    fn test_accessors() {
        let props = Props::new().with("n", 7).with("s", "x").with("b", true);
        assert_eq!(props.get("n").and_then(PropValue::as_int), Some(7));
        assert_eq!(props.get("s").and_then(PropValue::as_str), Some("x"));
        assert_eq!(props.get("b").and_then(PropValue::as_bool), Some(true));
        assert!(props.get("missing").is_none());
    }
}
