//! Layout Pipeline
//!
//! Connects a root component to committed layout states.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ComponentTree → LayoutStateFuture → LayoutState::calculate → commit → listener
//!                                                                 │
//!                                                   MountState::mount (main thread)
//! ```
//!
//! ## Key Design Principles
//!
//! - **One layout thread**: async requests queue up and only the latest runs
//! - **Versioned commits**: a result older than the committed one is dropped
//! - **Cooperative cancellation**: released futures stop at the next
//!   checkpoint of the node tree builder

pub mod component_tree;
pub mod future;

pub use component_tree::{ComponentTree, NewLayoutStateReadyListener, TreeStats};
pub use future::{CancellationToken, LayoutRequest, LayoutStateFuture};
