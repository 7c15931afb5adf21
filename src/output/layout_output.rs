//! LayoutOutput - One mountable unit produced by a layout pass.

use std::fmt;

use crate::component::Component;
use crate::types::Rect;

use super::transition::TransitionId;

/// Id of the root host output.
pub const ROOT_HOST_ID: u64 = 0;

/// Host marker of outputs without a host (the root host itself).
pub const NO_HOST: i64 = -1;

/// Role of an output within its component's affinity group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputType {
    Content,
    Background,
    Foreground,
    Host,
    Border,
}

impl OutputType {
    pub const ALL: [OutputType; 5] = [
        OutputType::Content,
        OutputType::Background,
        OutputType::Foreground,
        OutputType::Host,
        OutputType::Border,
    ];

    /// Value of the 2-bit type field in output ids.
    ///
    /// BORDER shares the HOST value: a border is never emitted at the level
    /// of a host of the same component, and both draw from one sequence.
    pub const fn id_bits(self) -> u64 {
        match self {
            Self::Content => 0,
            Self::Background => 1,
            Self::Foreground => 2,
            Self::Host | Self::Border => 3,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Content => "CONTENT",
            Self::Background => "BACKGROUND",
            Self::Foreground => "FOREGROUND",
            Self::Host => "HOST",
            Self::Border => "BORDER",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Per-output flags handed to the mount target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u8 {
        /// Drawable state follows the hosting view.
        const DUPLICATE_PARENT_STATE = 1 << 0;
        /// The host view propagates its state to its children.
        const DUPLICATE_CHILDREN_STATE = 1 << 1;
        /// The output is a native view (not a drawable).
        const IS_VIEW = 1 << 2;
        /// Hosting view needs touch expansion applied.
        const HAS_TOUCH_EXPANSION = 1 << 3;
    }
}

/// How an output relates to the previous layout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdateState {
    /// No previous output to compare with (first layout).
    #[default]
    Unknown,
    /// Same component semantics; bounds may have moved.
    Updated,
    /// Content changed and must be re-applied.
    Dirty,
}

/// Attributes a host view (or view content) receives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewAttributes {
    pub clickable: bool,
    pub focusable: bool,
    pub content_description: Option<String>,
    pub view_tag: Option<String>,
    pub click_handler: Option<String>,
    pub touch_handler: Option<String>,
}

impl ViewAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One mountable output.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    pub id: u64,
    pub component: Component,
    pub output_type: OutputType,
    /// Absolute bounds in root coordinates.
    pub bounds: Rect,
    /// Id of the hosting output, [`NO_HOST`] for the root host.
    pub host_marker: i64,
    pub flags: OutputFlags,
    pub update_state: UpdateState,
    /// Position in the mountable output list.
    pub index: usize,
    pub attributes: Option<ViewAttributes>,
    pub transition_id: Option<TransitionId>,
    /// Global key of the node this output came from.
    pub global_key: String,
}

impl LayoutOutput {
    pub fn new(id: u64, component: Component, output_type: OutputType, bounds: Rect) -> Self {
        Self {
            id,
            component,
            output_type,
            bounds,
            host_marker: NO_HOST,
            flags: OutputFlags::empty(),
            update_state: UpdateState::Unknown,
            index: 0,
            attributes: None,
            transition_id: None,
            global_key: String::new(),
        }
    }

    pub fn with_host(mut self, host_marker: u64) -> Self {
        self.host_marker = host_marker as i64;
        self
    }

    pub fn with_flags(mut self, flags: OutputFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_host(&self) -> bool {
        self.output_type == OutputType::Host
    }

    pub fn host_id(&self) -> Option<u64> {
        u64::try_from(self.host_marker).ok()
    }
}

/// Bounds reported to a visibility handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityOutput {
    pub id: u64,
    pub global_key: String,
    pub bounds: Rect,
    pub handler: String,
}
