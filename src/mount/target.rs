//! MountTarget - The sink mounted content is handed to.

use std::fmt;

use crate::error::RenderError;
use crate::output::{LayoutOutput, ViewAttributes};
use crate::types::Rect;

/// Scroll container the mount target lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollContainer {
    pub name: String,
    /// False when the container lays out all children eagerly, which defeats
    /// incremental mount.
    pub supports_incremental_mount: bool,
}

impl ScrollContainer {
    pub fn new(name: impl Into<String>, supports_incremental_mount: bool) -> Self {
        Self {
            name: name.into(),
            supports_incremental_mount,
        }
    }
}

/// Native view/drawable API driven by [`MountState`](super::MountState).
///
/// Content handles are opaque to the engine; it only clones them and passes
/// them back.
pub trait MountTarget {
    type Content: Clone + fmt::Debug;

    /// Content standing for the root host (output id 0).
    fn root_host(&self) -> Self::Content;

    /// Create the content for an output about to be mounted.
    fn create_content(&mut self, output: &LayoutOutput) -> Result<Self::Content, RenderError>;

    fn mount(&mut self, host: &Self::Content, content: &Self::Content, bounds: Rect, index: usize);

    fn unmount(&mut self, host: &Self::Content, content: &Self::Content);

    fn update_bounds(&mut self, content: &Self::Content, bounds: Rect);

    /// Rebind mounted content to a changed output.
    fn update_content(&mut self, content: &Self::Content, output: &LayoutOutput);

    fn set_attributes(&mut self, content: &Self::Content, attributes: &ViewAttributes);

    fn enclosing_scroll_container(&self) -> Option<ScrollContainer> {
        None
    }
}
