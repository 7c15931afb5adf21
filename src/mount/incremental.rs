//! Incremental mount - Keep only outputs intersecting the visible rect.
//!
//! The layout state carries two index lists: outputs sorted by top edge and
//! outputs sorted by bottom edge. Two cursors into them describe the current
//! vertical window:
//!
//! ```text
//! previous_tops_index    = number of outputs whose top    <  visible.bottom
//! previous_bottoms_index = number of outputs whose bottom <= visible.top
//! ```
//!
//! When the visible rect moves vertically, the cursors sweep forward or
//! backward from where they were, touching only the outputs that crossed an
//! edge. A horizontal change, a new layout state or a previously empty rect
//! forces a full pass.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::layout_state::LayoutState;
use crate::types::Rect;

use super::delegate::{MountExtension, MountRefs};

#[derive(Debug, Default)]
pub struct IncrementalMountExtension {
    input: Option<Arc<LayoutState>>,
    previous_visible_rect: Rect,
    previous_tops_index: usize,
    previous_bottoms_index: usize,
    /// Outputs this extension holds a mount ref for.
    acquired: HashSet<u64>,
}

impl IncrementalMountExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_tops_index(&self) -> usize {
        self.previous_tops_index
    }

    pub fn previous_bottoms_index(&self) -> usize {
        self.previous_bottoms_index
    }

    pub fn previous_visible_rect(&self) -> Rect {
        self.previous_visible_rect
    }

    /// True while this extension keeps `id` mountable.
    pub fn owns_reference(&self, id: u64) -> bool {
        self.acquired.contains(&id)
    }

    fn setup_previous_indices(&mut self, layout: &LayoutState, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let outputs = layout.outputs();
        let tops = layout.tops();
        let bottoms = layout.bottoms();

        self.previous_tops_index = tops
            .iter()
            .position(|&i| rect.bottom <= outputs[i].bounds.top)
            .unwrap_or(tops.len());
        self.previous_bottoms_index = bottoms
            .iter()
            .position(|&i| rect.top < outputs[i].bounds.bottom)
            .unwrap_or(bottoms.len());
    }

    /// Acquire or release every output against `rect`.
    fn full_pass(&mut self, refs: &mut MountRefs, rect: Option<Rect>) -> Result<()> {
        let Some(layout) = self.input.clone() else {
            return Ok(());
        };
        if let Some(rect) = rect {
            self.setup_previous_indices(&layout, rect);
        }

        let mut visible = HashSet::with_capacity(layout.output_count());
        for output in layout.outputs() {
            if rect.is_none_or(|rect| is_visible(output.bounds, rect)) {
                visible.insert(output.id);
            }
        }

        let stale: Vec<u64> = self.acquired.difference(&visible).copied().collect();
        for id in stale {
            self.release(refs, id)?;
        }
        for id in visible {
            self.acquire(refs, id);
        }
        Ok(())
    }

    /// Sweep the cursors from their previous position to `rect`.
    fn sweep(&mut self, refs: &mut MountRefs, layout: &LayoutState, rect: Rect) -> Result<()> {
        let outputs = layout.outputs();
        let tops = layout.tops();
        let bottoms = layout.bottoms();
        let count = outputs.len();

        // Outputs leaving or entering over the top edge.
        while self.previous_bottoms_index < count
            && outputs[bottoms[self.previous_bottoms_index]].bounds.bottom <= rect.top
        {
            let output = &outputs[bottoms[self.previous_bottoms_index]];
            self.sync(refs, output.id, is_visible(output.bounds, rect))?;
            self.previous_bottoms_index += 1;
        }
        while self.previous_bottoms_index > 0
            && outputs[bottoms[self.previous_bottoms_index - 1]].bounds.bottom > rect.top
        {
            self.previous_bottoms_index -= 1;
            let output = &outputs[bottoms[self.previous_bottoms_index]];
            self.sync(refs, output.id, is_visible(output.bounds, rect))?;
        }

        // Outputs entering or leaving over the bottom edge.
        while self.previous_tops_index < count
            && outputs[tops[self.previous_tops_index]].bounds.top < rect.bottom
        {
            let output = &outputs[tops[self.previous_tops_index]];
            self.sync(refs, output.id, is_visible(output.bounds, rect))?;
            self.previous_tops_index += 1;
        }
        while self.previous_tops_index > 0
            && outputs[tops[self.previous_tops_index - 1]].bounds.top >= rect.bottom
        {
            self.previous_tops_index -= 1;
            let output = &outputs[tops[self.previous_tops_index]];
            self.sync(refs, output.id, is_visible(output.bounds, rect))?;
        }
        Ok(())
    }

    fn sync(&mut self, refs: &mut MountRefs, id: u64, visible: bool) -> Result<()> {
        if visible {
            self.acquire(refs, id);
            Ok(())
        } else {
            self.release(refs, id)
        }
    }

    fn acquire(&mut self, refs: &mut MountRefs, id: u64) {
        if self.acquired.insert(id) {
            refs.acquire(id);
        }
    }

    fn release(&mut self, refs: &mut MountRefs, id: u64) -> Result<()> {
        if self.acquired.remove(&id) {
            refs.release(id)?;
        }
        Ok(())
    }
}

impl MountExtension for IncrementalMountExtension {
    fn name(&self) -> &'static str {
        "IncrementalMountExtension"
    }

    fn can_prevent_mount(&self) -> bool {
        true
    }

    fn before_mount(
        &mut self,
        refs: &mut MountRefs,
        layout: &Arc<LayoutState>,
        visible_rect: Option<Rect>,
    ) -> Result<()> {
        self.input = Some(layout.clone());
        self.full_pass(refs, visible_rect)?;
        self.previous_visible_rect = visible_rect.unwrap_or_default();
        tracing::trace!(
            tops = self.previous_tops_index,
            bottoms = self.previous_bottoms_index,
            acquired = self.acquired.len(),
            "incremental mount prepared"
        );
        Ok(())
    }

    fn on_visible_bounds_changed(&mut self, refs: &mut MountRefs, visible_rect: Rect) -> Result<()> {
        let Some(layout) = self.input.clone() else {
            return Ok(());
        };
        let previous = self.previous_visible_rect;
        if previous == visible_rect {
            return Ok(());
        }

        if previous.is_empty()
            || visible_rect.is_empty()
            || previous.left != visible_rect.left
            || previous.right != visible_rect.right
        {
            self.full_pass(refs, Some(visible_rect))?;
        } else {
            self.sweep(refs, &layout, visible_rect)?;
        }
        self.previous_visible_rect = visible_rect;
        Ok(())
    }

    fn on_unmount(&mut self, refs: &mut MountRefs) -> Result<()> {
        for id in std::mem::take(&mut self.acquired) {
            refs.release(id)?;
        }
        self.input = None;
        self.previous_visible_rect = Rect::EMPTY;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Edge-exclusive overlap; zero-sized outputs count when inside the rect.
fn is_visible(bounds: Rect, rect: Rect) -> bool {
    bounds.left < rect.right
        && rect.left < bounds.right.max(bounds.left + 1)
        && bounds.top < rect.bottom
        && rect.top < bounds.bottom.max(bounds.top + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::primitives::{column, drawable};
    use crate::output::{LayoutOutput, OutputType};

    fn stacked(count: i32) -> Arc<LayoutState> {
        let outputs = (0..count)
            .map(|i| {
                LayoutOutput::new(
                    i as u64 + 1,
                    drawable("Row"),
                    OutputType::Content,
                    Rect::from_xywh(0, i * 10, 10, 10),
                )
            })
            .collect();
        Arc::new(LayoutState::from_outputs(
            column(Vec::new()),
            outputs,
            10,
            count * 10,
        ))
    }

    #[test]
    fn test_initial_window() {
        let mut refs = MountRefs::new();
        let mut extension = IncrementalMountExtension::new();
        extension
            .before_mount(&mut refs, &stacked(10), Some(Rect::new(0, 0, 10, 50)))
            .unwrap();

        assert_eq!(extension.previous_tops_index(), 5);
        assert_eq!(extension.previous_bottoms_index(), 0);
        assert_eq!(refs.len(), 5);
        assert!((1..=5).all(|id| refs.is_acquired(id)));
    }

    #[test]
    fn test_scrolling_sweeps_both_cursors() {
        let mut refs = MountRefs::new();
        let mut extension = IncrementalMountExtension::new();
        extension
            .before_mount(&mut refs, &stacked(10), Some(Rect::new(0, 0, 10, 50)))
            .unwrap();

        extension
            .on_visible_bounds_changed(&mut refs, Rect::new(0, 25, 10, 75))
            .unwrap();
        assert_eq!(extension.previous_tops_index(), 8);
        assert_eq!(extension.previous_bottoms_index(), 2);
        let mounted: Vec<u64> = (1..=10).filter(|&id| refs.is_acquired(id)).collect();
        assert_eq!(mounted, vec![3, 4, 5, 6, 7, 8]);

        extension
            .on_visible_bounds_changed(&mut refs, Rect::new(0, 0, 10, 50))
            .unwrap();
        assert_eq!(extension.previous_tops_index(), 5);
        assert_eq!(extension.previous_bottoms_index(), 0);
        let mounted: Vec<u64> = (1..=10).filter(|&id| refs.is_acquired(id)).collect();
        assert_eq!(mounted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_rect_then_new_input() {
        let mut refs = MountRefs::new();
        let mut extension = IncrementalMountExtension::new();
        extension
            .before_mount(&mut refs, &stacked(10), Some(Rect::new(0, 0, 10, 50)))
            .unwrap();

        extension
            .before_mount(&mut refs, &stacked(3), Some(Rect::EMPTY))
            .unwrap();
        extension
            .on_visible_bounds_changed(&mut refs, Rect::new(0, 0, 10, 50))
            .unwrap();

        assert_eq!(extension.previous_tops_index(), 3);
        assert_eq!(extension.previous_bottoms_index(), 0);
        assert_eq!(refs.len(), 3);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut refs = MountRefs::new();
        let mut extension = IncrementalMountExtension::new();
        extension.before_mount(&mut refs, &stacked(4), None).unwrap();
        assert_eq!(refs.len(), 4);

        extension.on_unmount(&mut refs).unwrap();
        assert!(refs.is_empty());
        assert!(!extension.owns_reference(1));
    }

    #[test]
    fn test_visibility_edges() {
        let rect = Rect::new(0, 0, 10, 50);
        assert!(is_visible(Rect::new(0, 40, 10, 50), rect));
        assert!(!is_visible(Rect::new(0, 50, 10, 60), rect));
        assert!(is_visible(Rect::new(0, 20, 10, 20), rect));
        assert!(!is_visible(Rect::new(20, 0, 30, 10), rect));
    }
}
