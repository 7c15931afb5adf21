//! Mount - Put layout outputs onto a mount target.
//!
//! - [`MountState`] diffs the mounted items against a layout state
//! - [`MountDelegate`] holds extensions and the per-output mount refs
//! - [`IncrementalMountExtension`] restricts mounting to the visible rect
//! - [`MountTarget`] is the native sink; [`RecordingMountTarget`] logs calls

mod delegate;
mod incremental;
mod mount_item;
mod mount_state;
mod recording;
mod target;

pub use delegate::{MountDelegate, MountExtension, MountRefs};
pub use incremental::IncrementalMountExtension;
pub use mount_item::MountItem;
pub use mount_state::{MountState, MountStats};
pub use recording::{MountOp, RECORDING_ROOT_HOST, RecordingMountTarget};
pub use target::{MountTarget, ScrollContainer};
