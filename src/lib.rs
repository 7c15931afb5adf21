//! # spark-mount
//!
//! Declarative component layout, diffing and incremental mount engine.
//!
//! ## Architecture
//!
//! Components are immutable descriptions. A layout pass resolves them into an
//! arena of internal nodes, lays the arena out with Taffy and flattens it into
//! a list of mountable outputs with stable ids:
//! ```text
//! Component → resolve_tree → NodeTree → compute_layout → LayoutState → MountState
//! ```
//!
//! Layout runs on a dedicated layout thread (or synchronously on the caller);
//! mounting happens on the caller's thread against a [`MountTarget`].
//!
//! ## Modules
//!
//! - [`types`] - Geometry and flexbox enums
//! - [`component`] - Components, props, layout context, state
//! - [`engine`] - Node arena and the node tree builder
//! - [`layout`] - Size specs and the Taffy bridge
//! - [`output`] - Layout outputs, stable ids, affinity groups, transitions
//! - [`diff`] - Update states and reconciliation
//! - [`layout_state`] - The result of one layout pass
//! - [`mount`] - Mount state, delegate and incremental mount
//! - [`pipeline`] - Component tree, layout futures, layout thread
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use spark_mount::component::primitives::{column, text};
//! use spark_mount::mount::{MountState, RecordingMountTarget};
//! use spark_mount::{ComponentTree, Config, SizeSpec};
//!
//! let tree = ComponentTree::new(Config::default()).unwrap();
//! let size = tree
//!     .set_root_and_size_spec(
//!         column(vec![text("Hello"), text("World")]),
//!         SizeSpec::exactly(80),
//!         SizeSpec::unspecified(),
//!     )
//!     .unwrap();
//! assert_eq!(size.height, 2);
//!
//! let mut mount_state = MountState::new(RecordingMountTarget::new(), Arc::new(Config::default()));
//! let stats = tree.mount_into(&mut mount_state, None).unwrap();
//! assert_eq!(stats.mounted, 2);
//! ```

pub mod component;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod layout;
pub mod layout_state;
pub mod mount;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::Config;
pub use error::{Error, LifecycleMethod, RenderError, Result};

pub use component::{Component, ComponentId, LayoutContext, PropValue, Props, RenderScope};
pub use engine::{Edge, Edges, NodeTree, Resolution, resolve_tree};
pub use layout::{SizeSpec, SizeSpecMode, compute_layout};
pub use layout_state::LayoutState;
pub use mount::{MountState, MountStats, MountTarget};
pub use output::{LayoutOutput, OutputType, TransitionId, UpdateState};
pub use pipeline::{ComponentTree, NewLayoutStateReadyListener};
