//! ComponentTree - Owns a root component and keeps its layout current.
//!
//! ```text
//! set_root / set_size_spec / update_state
//!        │
//!        ├── sync:  compute on the calling thread ──────────┐
//!        └── async: queue on the layout thread ─────────────┤
//!                   (queued requests drained, latest wins)  ▼
//!                                               commit (versioned, stale dropped)
//!                                                          │
//!                                          NewLayoutStateReadyListener
//! ```
//!
//! A request is skipped when the committed layout already matches it: same
//! or equivalent root, same specs and no state update waiting. A request
//! matching one still in flight joins that computation instead of starting
//! another.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::component::{Component, LayoutContext, PropValue, StateStore};
use crate::config::Config;
use crate::diff::Reconciler;
use crate::error::{Error, Result};
use crate::layout::SizeSpec;
use crate::layout_state::LayoutState;
use crate::mount::{MountState, MountStats, MountTarget};
use crate::types::{Rect, Size};

use super::future::{CancellationToken, LayoutRequest, LayoutStateFuture};

/// Called once for every layout state committed to the tree.
pub type NewLayoutStateReadyListener = Arc<dyn Fn(&Arc<LayoutState>) + Send + Sync>;

/// Counters describing the tree's layout activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Layout computations started.
    pub layouts_computed: usize,
    /// Computations that reconciled against the committed layout.
    pub reconcile_calls: usize,
    /// Layout states committed.
    pub committed: usize,
    /// Version of the committed layout state, 0 before the first commit.
    pub committed_version: u64,
}

enum Job {
    Layout(Arc<LayoutStateFuture>),
    Flush(mpsc::Sender<()>),
}

#[derive(Default)]
struct TreeState {
    root: Option<Component>,
    width_spec: Option<SizeSpec>,
    height_spec: Option<SizeSpec>,
    committed: Option<Arc<LayoutState>>,
    committed_version: u64,
    next_version: u64,
    in_flight: Vec<Arc<LayoutStateFuture>>,
    listener: Option<NewLayoutStateReadyListener>,
    last_error: Option<Error>,
}

struct Shared {
    config: Arc<Config>,
    tree: Mutex<TreeState>,
    store: Mutex<StateStore>,
    layouts_computed: AtomicUsize,
    reconcile_calls: AtomicUsize,
    commits: AtomicUsize,
}

pub struct ComponentTree {
    shared: Arc<Shared>,
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl ComponentTree {
    /// Create a tree and start its layout thread.
    pub fn new(config: Config) -> Result<Self> {
        let shared = Arc::new(Shared {
            config: Arc::new(config),
            tree: Mutex::new(TreeState::default()),
            store: Mutex::new(StateStore::new()),
            layouts_computed: AtomicUsize::new(0),
            reconcile_calls: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
        });

        let (sender, receiver) = mpsc::channel();
        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name(shared.config.layout_thread_name.clone())
            .spawn(move || run_layout_thread(worker_shared, receiver))
            .map_err(|err| Error::LayoutThreadSpawn(err.to_string()))?;

        Ok(Self {
            shared,
            jobs: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Set the root and compute its layout on this thread.
    pub fn set_root(&self, root: Component) -> Result<Option<Arc<LayoutState>>> {
        self.shared.tree.lock().root = Some(root);
        self.request_sync()
    }

    pub fn set_root_async(&self, root: Component) -> Result<()> {
        self.shared.tree.lock().root = Some(root);
        self.request_async()
    }

    pub fn set_size_spec(
        &self,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
    ) -> Result<Option<Arc<LayoutState>>> {
        self.store_specs(width_spec, height_spec);
        self.request_sync()
    }

    pub fn set_size_spec_async(&self, width_spec: SizeSpec, height_spec: SizeSpec) -> Result<()> {
        self.store_specs(width_spec, height_spec);
        self.request_async()
    }

    /// Set root and specs together and return the resulting size.
    pub fn set_root_and_size_spec(
        &self,
        root: Component,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
    ) -> Result<Size> {
        {
            let mut tree = self.shared.tree.lock();
            tree.root = Some(root);
            tree.width_spec = Some(width_spec);
            tree.height_spec = Some(height_spec);
        }
        let layout = self.request_sync()?;
        Ok(layout
            .or_else(|| self.main_thread_layout_state())
            .map(|state| state.size())
            .unwrap_or_default())
    }

    /// Store `value` for the component at `global_key` and lay out again.
    pub fn update_state(
        &self,
        global_key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Result<Option<Arc<LayoutState>>> {
        self.shared.store.lock().enqueue(global_key, value);
        self.request_sync()
    }

    pub fn update_state_async(
        &self,
        global_key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Result<()> {
        self.shared.store.lock().enqueue(global_key, value);
        self.request_async()
    }

    pub fn set_new_layout_state_ready_listener(
        &self,
        listener: Option<NewLayoutStateReadyListener>,
    ) {
        self.shared.tree.lock().listener = listener;
    }

    fn store_specs(&self, width_spec: SizeSpec, height_spec: SizeSpec) {
        let mut tree = self.shared.tree.lock();
        tree.width_spec = Some(width_spec);
        tree.height_spec = Some(height_spec);
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    /// The committed layout state.
    pub fn main_thread_layout_state(&self) -> Option<Arc<LayoutState>> {
        self.shared.tree.lock().committed.clone()
    }

    pub fn root(&self) -> Option<Component> {
        self.shared.tree.lock().root.clone()
    }

    /// Component state stored under `global_key`.
    pub fn state_value(&self, global_key: &str) -> Option<PropValue> {
        self.shared.store.lock().get(global_key).cloned()
    }

    /// Error of the last failed background layout, if any.
    pub fn take_last_error(&self) -> Option<Error> {
        self.shared.tree.lock().last_error.take()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            layouts_computed: self.shared.layouts_computed.load(Ordering::Acquire),
            reconcile_calls: self.shared.reconcile_calls.load(Ordering::Acquire),
            committed: self.shared.commits.load(Ordering::Acquire),
            committed_version: self.shared.tree.lock().committed_version,
        }
    }

    /// Mount the committed layout state.
    pub fn mount_into<T: MountTarget>(
        &self,
        mount_state: &mut MountState<T>,
        visible_rect: Option<Rect>,
    ) -> Result<MountStats> {
        match self.main_thread_layout_state() {
            Some(layout) => mount_state.mount(layout, visible_rect),
            None => Ok(MountStats::default()),
        }
    }

    /// Block until the layout thread has handled everything queued so far.
    pub fn wait_for_layouts(&self) -> Result<()> {
        let (ack, done) = mpsc::channel();
        self.send(Job::Flush(ack))?;
        done.recv().map_err(|_| Error::LayoutThreadGone)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    fn request_sync(&self) -> Result<Option<Arc<LayoutState>>> {
        match self.shared.prepare_request()? {
            Request::Skip(layout) => Ok(layout),
            Request::Run(future) => self.shared.run(&future),
        }
    }

    fn request_async(&self) -> Result<()> {
        match self.shared.prepare_request()? {
            Request::Skip(_) => Ok(()),
            Request::Run(future) => {
                if future.is_done() {
                    return Ok(());
                }
                self.send(Job::Layout(future))
            }
        }
    }

    fn send(&self, job: Job) -> Result<()> {
        let jobs = self.jobs.as_ref().ok_or(Error::LayoutThreadGone)?;
        jobs.send(job).map_err(|_| Error::LayoutThreadGone)
    }

    /// Release in-flight layouts and stop the layout thread.
    pub fn release(&mut self) {
        {
            let mut tree = self.shared.tree.lock();
            for future in tree.in_flight.drain(..) {
                future.release();
            }
            tree.listener = None;
        }
        self.jobs = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("layout thread panicked");
        }
    }

    pub fn is_released(&self) -> bool {
        self.jobs.is_none()
    }
}

impl Drop for ComponentTree {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTree")
            .field("stats", &self.stats())
            .field("released", &self.is_released())
            .finish()
    }
}

// =============================================================================
// Shared
// =============================================================================

enum Request {
    /// Nothing to compute; carries the committed layout state.
    Skip(Option<Arc<LayoutState>>),
    Run(Arc<LayoutStateFuture>),
}

impl Shared {
    fn prepare_request(&self) -> Result<Request> {
        let mut tree = self.tree.lock();
        let (Some(root), Some(width_spec), Some(height_spec)) =
            (tree.root.clone(), tree.width_spec, tree.height_spec)
        else {
            return Ok(Request::Skip(None));
        };
        let state_pending = self.store.lock().has_uncommitted();

        if !state_pending {
            if let Some(future) = tree.in_flight.iter().rev().find(|future| {
                !future.is_released() && future.request().matches(&root, width_spec, height_spec)
            }) {
                tracing::trace!(version = future.version(), "joining in-flight layout");
                return Ok(Request::Run(future.clone()));
            }
            if tree.in_flight.is_empty()
                && let Some(committed) = &tree.committed
                && committed.is_compatible_spec(width_spec, height_spec)
                && committed.component().type_name() == root.type_name()
                && (committed.component().is_same_instance(&root)
                    || committed.component().is_equivalent_to(&root))
            {
                return Ok(Request::Skip(Some(committed.clone())));
            }
        }

        tree.next_version += 1;
        let future = Arc::new(LayoutStateFuture::new(LayoutRequest {
            component: root,
            width_spec,
            height_spec,
            version: tree.next_version,
        }));
        if self.config.use_cancelable_layout_futures {
            for superseded in &tree.in_flight {
                tracing::debug!(version = superseded.version(), "releasing superseded layout");
                superseded.release();
            }
        }
        tree.in_flight.push(future.clone());
        Ok(Request::Run(future))
    }

    /// Run `future` (or wait for whoever runs it) and commit the result.
    fn run(&self, future: &Arc<LayoutStateFuture>) -> Result<Option<Arc<LayoutState>>> {
        let result = future.run_and_get(|token| self.calculate(future.request(), token));
        match &result {
            Ok(Some(layout)) => self.commit(future.version(), layout),
            Ok(None) => {
                tracing::debug!(version = future.version(), "layout released before commit");
                self.forget(future.version());
            }
            Err(_) => self.forget(future.version()),
        }
        result
    }

    fn calculate(&self, request: &LayoutRequest, token: CancellationToken) -> Result<Option<LayoutState>> {
        let (snapshot, dirty_keys) = self.store.lock().prepare_layout();
        let previous = self.tree.lock().committed.clone();

        let mut ctx = LayoutContext::new(self.config.clone())
            .with_token(token)
            .with_state(snapshot)
            .with_dirty_keys(dirty_keys);
        if self.config.is_reconciliation_enabled
            && let Some(previous) = &previous
            && previous.is_compatible_spec(request.width_spec, request.height_spec)
            && previous.component().type_name() == request.component.type_name()
        {
            ctx = ctx.with_reconciler(Reconciler::new(previous.clone()));
            self.reconcile_calls.fetch_add(1, Ordering::AcqRel);
        }

        self.layouts_computed.fetch_add(1, Ordering::AcqRel);
        LayoutState::calculate(
            ctx,
            &request.component,
            request.width_spec,
            request.height_spec,
            previous.as_deref(),
        )
    }

    fn commit(&self, version: u64, layout: &Arc<LayoutState>) {
        let mut tree = self.tree.lock();
        tree.in_flight.retain(|future| future.version() != version);
        if version <= tree.committed_version {
            if version < tree.committed_version {
                tracing::debug!(version, committed = tree.committed_version, "dropping stale layout");
            }
            return;
        }

        tree.committed = Some(layout.clone());
        tree.committed_version = version;
        layout.mark_committed();
        self.store.lock().mark_committed(layout.dirty_keys());
        self.commits.fetch_add(1, Ordering::AcqRel);
        let listener = tree.listener.clone();
        drop(tree);

        tracing::debug!(
            version,
            layout_state = layout.id(),
            width = layout.width(),
            height = layout.height(),
            "layout committed"
        );
        if let Some(listener) = listener {
            listener(layout);
        }
    }

    fn forget(&self, version: u64) {
        self.tree
            .lock()
            .in_flight
            .retain(|future| future.version() != version);
    }
}

// =============================================================================
// Layout thread
// =============================================================================

fn run_layout_thread(shared: Arc<Shared>, jobs: mpsc::Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        let mut latest: Option<Arc<LayoutStateFuture>> = None;
        let mut flushes = Vec::new();
        for job in std::iter::once(job).chain(jobs.try_iter()) {
            match job {
                Job::Layout(future) => {
                    // A joined request queues the same future again.
                    if let Some(skipped) = latest.replace(future.clone())
                        && !Arc::ptr_eq(&skipped, &future)
                    {
                        tracing::trace!(version = skipped.version(), "coalesced queued layout");
                        if !skipped.is_done() {
                            shared.forget(skipped.version());
                        }
                    }
                }
                Job::Flush(ack) => flushes.push(ack),
            }
        }

        if let Some(future) = latest
            && let Err(err) = shared.run(&future)
        {
            tracing::warn!(error = %err, version = future.version(), "background layout failed");
            shared.tree.lock().last_error = Some(err);
        }
        for ack in flushes {
            let _ = ack.send(());
        }
    }
    tracing::trace!("layout thread stopped");
}
