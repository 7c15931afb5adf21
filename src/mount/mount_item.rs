//! MountItem - One output currently mounted on the target.

use crate::component::Component;
use crate::types::Rect;

#[derive(Debug, Clone)]
pub struct MountItem<C> {
    pub id: u64,
    /// Id of the host output the content is mounted in.
    pub host: u64,
    pub content: C,
    pub component: Component,
    pub bounds: Rect,
    /// Output index in the layout state it was last bound to.
    pub index: usize,
    /// Layout state it was last bound to.
    pub layout_id: u64,
}
