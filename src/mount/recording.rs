//! RecordingMountTarget - In-memory mount target that logs every call.

use std::collections::{HashMap, HashSet};

use crate::error::RenderError;
use crate::output::{LayoutOutput, ViewAttributes};
use crate::types::Rect;

use super::target::{MountTarget, ScrollContainer};

/// Content handle of the root host.
pub const RECORDING_ROOT_HOST: usize = 0;

/// One call made on a [`RecordingMountTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOp {
    Create { content: usize, output_id: u64 },
    Mount { host: usize, content: usize, bounds: Rect, index: usize },
    Unmount { host: usize, content: usize },
    UpdateBounds { content: usize, bounds: Rect },
    UpdateContent { content: usize, output_id: u64 },
    SetAttributes { content: usize, attributes: ViewAttributes },
}

#[derive(Debug, Default)]
pub struct RecordingMountTarget {
    next_content: usize,
    ops: Vec<MountOp>,
    /// Currently mounted content and the host holding it.
    attached: HashMap<usize, usize>,
    failing_types: HashSet<String>,
    scroll_container: Option<ScrollContainer>,
}

impl RecordingMountTarget {
    pub fn new() -> Self {
        Self {
            next_content: RECORDING_ROOT_HOST + 1,
            ..Self::default()
        }
    }

    /// Fail `create_content` for outputs of the given component type.
    pub fn fail_on(mut self, type_name: impl Into<String>) -> Self {
        self.failing_types.insert(type_name.into());
        self
    }

    /// Let every component type create content again.
    pub fn clear_failures(&mut self) {
        self.failing_types.clear();
    }

    pub fn with_scroll_container(mut self, container: ScrollContainer) -> Self {
        self.scroll_container = Some(container);
        self
    }

    pub fn ops(&self) -> &[MountOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<MountOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of content handles currently attached to a host.
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn host_of(&self, content: usize) -> Option<usize> {
        self.attached.get(&content).copied()
    }
}

impl MountTarget for RecordingMountTarget {
    type Content = usize;

    fn root_host(&self) -> usize {
        RECORDING_ROOT_HOST
    }

    fn create_content(&mut self, output: &LayoutOutput) -> Result<usize, RenderError> {
        let type_name = output.component.type_name();
        if self.failing_types.contains(type_name) {
            return Err(RenderError::new(format!(
                "cannot create content for {type_name}"
            )));
        }
        let content = self.next_content;
        self.next_content += 1;
        self.ops.push(MountOp::Create {
            content,
            output_id: output.id,
        });
        Ok(content)
    }

    fn mount(&mut self, host: &usize, content: &usize, bounds: Rect, index: usize) {
        self.attached.insert(*content, *host);
        self.ops.push(MountOp::Mount {
            host: *host,
            content: *content,
            bounds,
            index,
        });
    }

    fn unmount(&mut self, host: &usize, content: &usize) {
        self.attached.remove(content);
        self.ops.push(MountOp::Unmount {
            host: *host,
            content: *content,
        });
    }

    fn update_bounds(&mut self, content: &usize, bounds: Rect) {
        self.ops.push(MountOp::UpdateBounds {
            content: *content,
            bounds,
        });
    }

    fn update_content(&mut self, content: &usize, output: &LayoutOutput) {
        self.ops.push(MountOp::UpdateContent {
            content: *content,
            output_id: output.id,
        });
    }

    fn set_attributes(&mut self, content: &usize, attributes: &ViewAttributes) {
        self.ops.push(MountOp::SetAttributes {
            content: *content,
            attributes: attributes.clone(),
        });
    }

    fn enclosing_scroll_container(&self) -> Option<ScrollContainer> {
        self.scroll_container.clone()
    }
}
