//! Layout futures - One in-flight layout computation.
//!
//! A future computes its layout at most once. Callers arriving while it runs
//! block on a condvar and receive the same result. Releasing a future flips
//! its [`CancellationToken`], which the node tree builder polls before every
//! component and every child.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::component::Component;
use crate::error::Result;
use crate::layout::SizeSpec;
use crate::layout_state::LayoutState;

// =============================================================================
// CancellationToken
// =============================================================================

/// Shared release flag of one layout computation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// =============================================================================
// LayoutRequest
// =============================================================================

/// Root and size specs of one layout computation.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub component: Component,
    pub width_spec: SizeSpec,
    pub height_spec: SizeSpec,
    /// Position in the tree's request order; later requests win.
    pub version: u64,
}

impl LayoutRequest {
    /// True when this request would produce the same layout as `component`
    /// under the given specs.
    pub fn matches(&self, component: &Component, width_spec: SizeSpec, height_spec: SizeSpec) -> bool {
        self.width_spec == width_spec
            && self.height_spec == height_spec
            && self.component.type_name() == component.type_name()
            && (self.component.is_same_instance(component)
                || self.component.is_equivalent_to(component))
    }
}

// =============================================================================
// LayoutStateFuture
// =============================================================================

type LayoutResult = Result<Option<Arc<LayoutState>>>;

#[derive(Debug)]
enum Slot {
    Pending,
    Running,
    Done(LayoutResult),
}

#[derive(Debug)]
pub struct LayoutStateFuture {
    request: LayoutRequest,
    token: CancellationToken,
    slot: Mutex<Slot>,
    done: Condvar,
}

impl LayoutStateFuture {
    pub fn new(request: LayoutRequest) -> Self {
        Self {
            request,
            token: CancellationToken::new(),
            slot: Mutex::new(Slot::Pending),
            done: Condvar::new(),
        }
    }

    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }

    pub fn version(&self) -> u64 {
        self.request.version
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop the computation at its next checkpoint.
    pub fn release(&self) {
        self.token.cancel();
    }

    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_done(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Done(_))
    }

    /// Run `compute` unless another caller already did; everyone gets the
    /// same result. `Ok(None)` means the future was released.
    pub fn run_and_get(
        &self,
        compute: impl FnOnce(CancellationToken) -> Result<Option<LayoutState>>,
    ) -> LayoutResult {
        let mut slot = self.slot.lock();
        loop {
            match &*slot {
                Slot::Done(result) => return result.clone(),
                Slot::Running => self.done.wait(&mut slot),
                Slot::Pending => break,
            }
        }
        *slot = Slot::Running;
        drop(slot);

        let result = if self.is_released() {
            Ok(None)
        } else {
            compute(self.token.clone()).map(|state| state.map(Arc::new))
        };

        let mut slot = self.slot.lock();
        *slot = Slot::Done(result.clone());
        self.done.notify_all();
        result
    }
}
