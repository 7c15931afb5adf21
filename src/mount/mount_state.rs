//! MountState - Apply a layout state to a mount target.
//!
//! Each pass works out which outputs should be on the target (every output,
//! or only the visible ones when incremental mount is on), then:
//!
//! 1. unmounts what should no longer be there, children before hosts
//! 2. walks the outputs in order, mounting what is missing and updating
//!    what moved or changed; hosts come before their children in output
//!    order, so a host is always mounted before anything inside it

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, LifecycleMethod, Result};
use crate::layout_state::LayoutState;
use crate::output::{LayoutOutput, ROOT_HOST_ID, UpdateState};
use crate::types::Rect;

use super::delegate::MountDelegate;
use super::incremental::IncrementalMountExtension;
use super::mount_item::MountItem;
use super::target::MountTarget;

/// What one mount pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountStats {
    pub mounted: usize,
    pub unmounted: usize,
    /// Mounted items whose bounds changed.
    pub moved: usize,
    /// Mounted items rebound to changed content.
    pub updated: usize,
}

impl MountStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct MountState<T: MountTarget> {
    config: Arc<Config>,
    target: T,
    delegate: MountDelegate,
    layout: Option<Arc<LayoutState>>,
    visible_rect: Option<Rect>,
    items: HashMap<u64, MountItem<T::Content>>,
}

impl<T: MountTarget> MountState<T> {
    pub fn new(target: T, config: Arc<Config>) -> Self {
        let mut delegate = MountDelegate::new();
        if config.incremental_mount_enabled {
            delegate.add_extension(Box::new(IncrementalMountExtension::new()));
        }
        Self {
            config,
            target,
            delegate,
            layout: None,
            visible_rect: None,
            items: HashMap::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn delegate(&self) -> &MountDelegate {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut MountDelegate {
        &mut self.delegate
    }

    pub fn layout_state(&self) -> Option<&Arc<LayoutState>> {
        self.layout.as_ref()
    }

    pub fn visible_rect(&self) -> Option<Rect> {
        self.visible_rect
    }

    pub fn is_mounted(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    pub fn mount_item(&self, id: u64) -> Option<&MountItem<T::Content>> {
        self.items.get(&id)
    }

    /// Ids of mounted outputs, ascending.
    pub fn mounted_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.items.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    /// Mount `layout`, restricted to `visible_rect` when incremental mount is
    /// enabled. `None` mounts everything.
    ///
    /// Mounting the same layout state with the same rect again does nothing.
    /// A failed pass keeps what it mounted but records no layout state, so
    /// the next call runs a full pass again.
    pub fn mount(
        &mut self,
        layout: Arc<LayoutState>,
        visible_rect: Option<Rect>,
    ) -> Result<MountStats> {
        if let Some(current) = &self.layout
            && Arc::ptr_eq(current, &layout)
            && self.visible_rect == visible_rect
        {
            return Ok(MountStats::default());
        }

        if self.config.incremental_mount_enabled {
            self.check_scroll_container()?;
        }

        self.delegate.before_mount(&layout, visible_rect)?;
        let stats = match self.apply(&layout) {
            Ok(stats) => stats,
            Err(err) => {
                self.layout = None;
                self.visible_rect = None;
                return Err(err);
            }
        };
        self.layout = Some(layout.clone());
        self.visible_rect = visible_rect;
        tracing::debug!(
            layout_state = layout.id(),
            mounted = stats.mounted,
            unmounted = stats.unmounted,
            moved = stats.moved,
            updated = stats.updated,
            "mount pass"
        );
        Ok(stats)
    }

    /// Move the visible rect over the currently mounted layout state.
    pub fn set_visible_rect(&mut self, visible_rect: Rect) -> Result<MountStats> {
        let Some(layout) = self.layout.clone() else {
            return Ok(MountStats::default());
        };
        if self.visible_rect == Some(visible_rect) {
            return Ok(MountStats::default());
        }

        self.delegate.on_visible_bounds_changed(visible_rect)?;
        let stats = self.apply(&layout)?;
        self.visible_rect = Some(visible_rect);
        tracing::trace!(
            mounted = stats.mounted,
            unmounted = stats.unmounted,
            "visible rect changed"
        );
        Ok(stats)
    }

    /// Unmount everything and forget the current layout state.
    pub fn unmount_all(&mut self) -> Result<usize> {
        let stale: HashSet<u64> = self.items.keys().copied().collect();
        let unmounted = self.unmount_children_first(stale);
        self.delegate.on_unmount()?;
        self.layout = None;
        self.visible_rect = None;
        Ok(unmounted)
    }

    fn check_scroll_container(&self) -> Result<()> {
        let Some(container) = self.target.enclosing_scroll_container() else {
            return Ok(());
        };
        if container.supports_incremental_mount {
            return Ok(());
        }
        let err = Error::IncompatibleScrollContainer {
            container: container.name,
            reason: "it lays out all of its children up front".to_string(),
        };
        if self.config.strict_mode {
            return Err(err);
        }
        tracing::warn!(error = %err, "mounting without incremental mount benefits");
        Ok(())
    }

    fn apply(&mut self, layout: &LayoutState) -> Result<MountStats> {
        let mut stats = MountStats::default();
        let desired = self.desired_outputs(layout);

        let stale: HashSet<u64> = self
            .items
            .values()
            .filter(|item| {
                !desired.contains(&item.id)
                    || layout
                        .output_by_id(item.id)
                        .is_none_or(|output| host_of(output) != item.host)
            })
            .map(|item| item.id)
            .collect();
        stats.unmounted = self.unmount_children_first(stale);

        for output in layout.outputs() {
            if output.id == ROOT_HOST_ID || !desired.contains(&output.id) {
                continue;
            }

            let Some(item) = self.items.get_mut(&output.id) else {
                self.mount_output(layout, output)?;
                stats.mounted += 1;
                continue;
            };
            if item.layout_id == layout.id() {
                continue;
            }

            if item.bounds != output.bounds {
                self.target.update_bounds(&item.content, output.bounds);
                item.bounds = output.bounds;
                stats.moved += 1;
            }
            let unchanged = item.component.is_same_instance(&output.component)
                || item.component.is_equivalent_to(&output.component);
            if output.update_state == UpdateState::Dirty || !unchanged {
                self.target.update_content(&item.content, output);
                if let Some(attributes) = &output.attributes {
                    self.target.set_attributes(&item.content, attributes);
                }
                stats.updated += 1;
            }
            item.component = output.component.clone();
            item.index = output.index;
            item.layout_id = layout.id();
        }
        Ok(stats)
    }

    /// Outputs allowed on the target, plus every host they need.
    fn desired_outputs(&self, layout: &LayoutState) -> HashSet<u64> {
        let mut desired: HashSet<u64> = layout
            .outputs()
            .iter()
            .filter(|output| {
                output.id == ROOT_HOST_ID || self.delegate.is_locked_for_mount(output.id)
            })
            .map(|output| output.id)
            .collect();

        let mut pending: Vec<u64> = desired.iter().copied().collect();
        while let Some(id) = pending.pop() {
            if let Some(output) = layout.output_by_id(id)
                && let Some(host) = output.host_id()
                && desired.insert(host)
            {
                pending.push(host);
            }
        }
        desired
    }

    fn mount_output(&mut self, layout: &LayoutState, output: &LayoutOutput) -> Result<()> {
        let content = self
            .target
            .create_content(output)
            .map_err(|source| Error::ComponentRender {
                component: output.component.type_name().to_string(),
                method: LifecycleMethod::OnMount,
                source,
            })?;

        let host = host_of(output);
        let host_content = self.host_content(host);
        self.target
            .mount(&host_content, &content, output.bounds, output.index);
        if let Some(attributes) = &output.attributes
            && !attributes.is_empty()
        {
            self.target.set_attributes(&content, attributes);
        }

        self.items.insert(
            output.id,
            MountItem {
                id: output.id,
                host,
                content,
                component: output.component.clone(),
                bounds: output.bounds,
                index: output.index,
                layout_id: layout.id(),
            },
        );
        Ok(())
    }

    fn host_content(&self, host: u64) -> T::Content {
        if host == ROOT_HOST_ID {
            return self.target.root_host();
        }
        match self.items.get(&host) {
            Some(item) => item.content.clone(),
            None => {
                tracing::warn!(host, "host output is not mounted, using the root host");
                self.target.root_host()
            }
        }
    }

    /// Unmount `stale` items, never a host before the items inside it.
    fn unmount_children_first(&mut self, mut stale: HashSet<u64>) -> usize {
        // Items inside a stale host go too.
        loop {
            let inside: Vec<u64> = self
                .items
                .values()
                .filter(|item| !stale.contains(&item.id) && stale.contains(&item.host))
                .map(|item| item.id)
                .collect();
            if inside.is_empty() {
                break;
            }
            stale.extend(inside);
        }

        let mut unmounted = 0;
        while !stale.is_empty() {
            let mut leaves: Vec<(usize, u64)> = stale
                .iter()
                .filter(|&&id| {
                    !self
                        .items
                        .values()
                        .any(|item| item.host == id && stale.contains(&item.id))
                })
                .filter_map(|id| self.items.get(id).map(|item| (item.index, item.id)))
                .collect();
            if leaves.is_empty() {
                // Ids with no mounted item left.
                stale.retain(|id| self.items.contains_key(id));
                if stale.is_empty() {
                    break;
                }
                leaves = stale
                    .iter()
                    .filter_map(|id| self.items.get(id).map(|item| (item.index, item.id)))
                    .collect();
            }
            leaves.sort_unstable_by(|a, b| b.cmp(a));

            for (_, id) in leaves {
                stale.remove(&id);
                if let Some(item) = self.items.remove(&id) {
                    if item.id != ROOT_HOST_ID {
                        let host = self.host_content(item.host);
                        self.target.unmount(&host, &item.content);
                    }
                    unmounted += 1;
                }
            }
        }
        unmounted
    }
}

impl<T: MountTarget> std::fmt::Debug for MountState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountState")
            .field("layout", &self.layout.as_ref().map(|l| l.id()))
            .field("visible_rect", &self.visible_rect)
            .field("mounted", &self.items.len())
            .field("delegate", &self.delegate)
            .finish()
    }
}

/// Host an output mounts into; outputs without a host go into the root.
fn host_of(output: &LayoutOutput) -> u64 {
    output.host_id().unwrap_or(ROOT_HOST_ID)
}
