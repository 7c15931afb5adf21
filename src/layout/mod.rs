//! Layout Module
//!
//! Flexbox layout computation using Taffy.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. The bridge:
//!
//! 1. Resolves node edges (START/END, aliases) for each node's direction
//! 2. Converts node styles → Taffy styles and builds the Taffy tree
//! 3. Applies the root [`SizeSpec`]s and runs measure functions for leaves
//! 4. Writes computed geometry back into the [`NodeTree`](crate::engine::NodeTree)

mod size_spec;
mod taffy_bridge;

pub use size_spec::{SizeSpec, SizeSpecMode};
pub use taffy_bridge::compute_layout;
