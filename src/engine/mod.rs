//! Engine - The resolved node tree and the builder that produces it.
//!
//! - [`Edges`]: sparse per-edge spacing values
//! - [`NodeStyle`]: flexbox style of a node
//! - [`InternalNode`] / [`NodeTree`]: arena of resolved nodes with checked release
//! - [`resolve_tree`]: component tree → node tree
//!
//! # Architecture
//!
//! Nodes are not reference-counted objects. They are slots in an arena,
//! addressed by [`NodeId`]:
//!
//! ```text
//! #0: Column  (parent=None, children=[#1, #2])
//! #1: Text    (parent=#0)
//! #2: Image   (parent=#0)
//! ```
//!
//! Release returns a slot to the free list and is only valid once the node
//! is detached and childless.

mod edges;
mod node;
mod node_tree;
mod resolve;
mod style;

pub use edges::{Edge, Edges, Insets, UNDEFINED};
pub use node::{InternalNode, NodeFlags, NodeId, NodeLayout};
pub use node_tree::NodeTree;
pub use resolve::{Resolution, compute_global_key, resolve_tree};
pub use style::NodeStyle;

pub(crate) use resolve::resolve_component;
