//! StateStore - Component state keyed by global key.
//!
//! Updates are queued and applied when the next layout starts. The keys
//! touched since the last committed layout are the "dirty" keys that block
//! reconciliation of the owning subtrees.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::context::StateSnapshot;
use super::props::PropValue;

#[derive(Debug, Default)]
pub struct StateStore {
    values: HashMap<String, PropValue>,
    pending: Vec<(String, PropValue)>,
    dirty: HashSet<String>,
    snapshot: Option<StateSnapshot>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an update for the component at `global_key`.
    pub fn enqueue(&mut self, global_key: impl Into<String>, value: impl Into<PropValue>) {
        self.pending.push((global_key.into(), value.into()));
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// True when updates were applied that no committed layout has seen yet.
    pub fn has_uncommitted(&self) -> bool {
        !self.pending.is_empty() || !self.dirty.is_empty()
    }

    /// Apply queued updates and return the snapshot plus the dirty keys a
    /// layout computed from it must treat as changed.
    pub fn prepare_layout(&mut self) -> (StateSnapshot, HashSet<String>) {
        if !self.pending.is_empty() {
            for (key, value) in self.pending.drain(..) {
                self.dirty.insert(key.clone());
                self.values.insert(key, value);
            }
            self.snapshot = None;
        }
        let snapshot = self
            .snapshot
            .get_or_insert_with(|| Arc::new(self.values.clone()))
            .clone();
        (snapshot, self.dirty.clone())
    }

    /// A layout built with `keys` as dirty was committed.
    pub fn mark_committed(&mut self, keys: &HashSet<String>) {
        self.dirty.retain(|key| !keys.contains(key));
    }

    pub fn get(&self, global_key: &str) -> Option<&PropValue> {
        self.values.get(global_key)
    }
}
