//! Error types.
//!
//! Usage violations (releasing an attached node, unbalanced mount refs,
//! duplicate transition ids, id overflow, affinity-group conflicts) are
//! reported as `Err` at the call that violated the invariant and are never
//! swallowed internally. Component failures carry the component and the
//! lifecycle method they came from.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::output::{OutputType, TransitionId};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle method a component failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleMethod {
    OnCreateLayout,
    OnMeasure,
    OnMount,
}

impl fmt::Display for LifecycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnCreateLayout => "onCreateLayout",
            Self::OnMeasure => "onMeasure",
            Self::OnMount => "onMount",
        };
        f.write_str(name)
    }
}

/// Failure raised by user code inside a component (render or mount).
///
/// Cheap to clone so an error boundary can hand it to its fallback while the
/// original still propagates in logs.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    message: Arc<str>,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// All errors produced by the layout and mount pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Cannot release node {node}: it is still attached to parent {parent}")]
    NodeStillAttached { node: usize, parent: usize },

    #[error("Cannot release node {node}: it still has {children} children")]
    NodeHasChildren { node: usize, children: usize },

    #[error("Node {0} is not allocated")]
    UnknownNode(usize),

    #[error("Node {child} already has parent {parent}")]
    NodeAlreadyParented { child: usize, parent: usize },

    #[error("Trying to release mount ref of output {0} which was never acquired")]
    MountRefNotAcquired(u64),

    #[error("The transitionId '{0}' is defined multiple times in the same layout.")]
    DuplicateTransitionId(TransitionId),

    #[error("{field} must be non-negative and no greater than {max}, actual {field}: {value}")]
    IdOutOfRange {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("Already contains unit for type {0}")]
    AffinityDuplicate(OutputType),

    #[error("Cannot add {added} unit to a group that already contains {existing} unit(s)")]
    AffinityHostConflict { added: OutputType, existing: String },

    #[error("Incremental mount is not supported inside {container}: {reason}")]
    IncompatibleScrollContainer { container: String, reason: String },

    #[error("Error in {method} of {component}: {source}")]
    ComponentRender {
        component: String,
        method: LifecycleMethod,
        #[source]
        source: RenderError,
    },

    #[error("Layout solver failed: {0}")]
    Layout(String),

    #[error("Failed to start layout thread: {0}")]
    LayoutThreadSpawn(String),

    #[error("Layout thread is no longer running")]
    LayoutThreadGone,
}

impl Error {
    /// True for errors that came out of component code rather than misuse.
    pub fn is_component_failure(&self) -> bool {
        matches!(self, Self::ComponentRender { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TransitionKeyScope;

    #[test]
    fn test_component_render_message() {
        let err = Error::ComponentRender {
            component: "Header".to_string(),
            method: LifecycleMethod::OnCreateLayout,
            source: RenderError::new("boom"),
        };
        assert_eq!(err.to_string(), "Error in onCreateLayout of Header: boom");
        assert!(err.is_component_failure());
    }

    #[test]
    fn test_duplicate_transition_message() {
        let id = TransitionId::new("test", TransitionKeyScope::Global);
        let err = Error::DuplicateTransitionId(id);
        assert_eq!(
            err.to_string(),
            "The transitionId 'TransitionId{\"test\", GLOBAL}' is defined multiple times in the same layout."
        );
    }
}
