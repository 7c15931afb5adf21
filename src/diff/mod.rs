//! Tree diffing and reconciliation.
//!
//! - [`DiffNode`]: per-node record kept by each layout state
//! - [`compute_update_state`]: UNKNOWN / UPDATED / DIRTY marking
//! - [`Reconciler`]: reuse of unchanged previous subtrees

mod diff_node;
mod reconcile;

pub use diff_node::{DiffNode, compute_update_state};
pub use reconcile::{Reconciler, is_key_dirty};
