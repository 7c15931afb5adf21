//! Mount delegate - Extensions and per-output mount refs.
//!
//! Extensions decide which outputs may be mounted by acquiring and releasing
//! refs. Refs are counted: every release must match an earlier acquire.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::layout_state::LayoutState;
use crate::types::Rect;

// =============================================================================
// Mount refs
// =============================================================================

/// Reference counts per output id.
#[derive(Debug, Default)]
pub struct MountRefs {
    counts: HashMap<u64, usize>,
}

impl MountRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, id: u64) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    /// Drop one ref; releasing a ref that is not held fails.
    pub fn release(&mut self, id: u64) -> Result<()> {
        match self.counts.get_mut(&id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => {
                self.counts.remove(&id);
                Ok(())
            }
            None => Err(Error::MountRefNotAcquired(id)),
        }
    }

    pub fn count(&self, id: u64) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn is_acquired(&self, id: u64) -> bool {
        self.count(id) > 0
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

// =============================================================================
// Extension
// =============================================================================

/// Hook into the mount pass.
pub trait MountExtension: Any + Send {
    fn name(&self) -> &'static str;

    /// True when the extension decides which outputs mount.
    fn can_prevent_mount(&self) -> bool {
        false
    }

    /// A new layout state is about to be mounted. `None` means everything is
    /// visible.
    fn before_mount(
        &mut self,
        refs: &mut MountRefs,
        layout: &Arc<LayoutState>,
        visible_rect: Option<Rect>,
    ) -> Result<()>;

    /// The visible rect changed while the layout state stayed the same.
    fn on_visible_bounds_changed(&mut self, refs: &mut MountRefs, visible_rect: Rect)
    -> Result<()>;

    /// Everything is being unmounted; drop every ref this extension holds.
    fn on_unmount(&mut self, refs: &mut MountRefs) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// Delegate
// =============================================================================

#[derive(Default)]
pub struct MountDelegate {
    refs: MountRefs,
    extensions: Vec<Box<dyn MountExtension>>,
}

impl std::fmt::Debug for MountDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("MountDelegate")
            .field("refs", &self.refs)
            .field("extensions", &names)
            .finish()
    }
}

impl MountDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_extension(&mut self, extension: Box<dyn MountExtension>) {
        self.extensions.push(extension);
    }

    /// First registered extension of type `E`.
    pub fn extension<E: MountExtension>(&self) -> Option<&E> {
        self.extensions
            .iter()
            .find_map(|extension| extension.as_any().downcast_ref::<E>())
    }

    pub fn refs(&self) -> &MountRefs {
        &self.refs
    }

    pub fn acquire_mount_ref(&mut self, id: u64) {
        self.refs.acquire(id);
    }

    pub fn release_mount_ref(&mut self, id: u64) -> Result<()> {
        self.refs.release(id)
    }

    pub fn has_extension_that_can_prevent_mount(&self) -> bool {
        self.extensions.iter().any(|e| e.can_prevent_mount())
    }

    /// True when the output may be mounted.
    pub fn is_locked_for_mount(&self, id: u64) -> bool {
        !self.has_extension_that_can_prevent_mount() || self.refs.is_acquired(id)
    }

    pub(crate) fn before_mount(
        &mut self,
        layout: &Arc<LayoutState>,
        visible_rect: Option<Rect>,
    ) -> Result<()> {
        for extension in &mut self.extensions {
            extension.before_mount(&mut self.refs, layout, visible_rect)?;
        }
        Ok(())
    }

    pub(crate) fn on_visible_bounds_changed(&mut self, visible_rect: Rect) -> Result<()> {
        for extension in &mut self.extensions {
            extension.on_visible_bounds_changed(&mut self.refs, visible_rect)?;
        }
        Ok(())
    }

    pub(crate) fn on_unmount(&mut self) -> Result<()> {
        for extension in &mut self.extensions {
            extension.on_unmount(&mut self.refs)?;
        }
        Ok(())
    }
}
