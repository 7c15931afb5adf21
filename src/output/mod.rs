//! Output model - What a layout pass hands to the mount state.
//!
//! - [`LayoutOutput`]: one mountable unit with absolute bounds and a stable id
//! - [`OutputIdCalculator`]: stable id packing and sequence allocation
//! - [`OutputUnitsAffinityGroup`]: the outputs of one component instance
//! - [`TransitionId`] / [`Transition`]: keys and animation descriptions

mod affinity_group;
mod layout_output;
mod output_id;
mod transition;

pub use affinity_group::OutputUnitsAffinityGroup;
pub use layout_output::{
    LayoutOutput, NO_HOST, OutputFlags, OutputType, ROOT_HOST_ID, UpdateState, ViewAttributes,
    VisibilityOutput,
};
pub use output_id::{
    MAX_LEVEL, MAX_SEQUENCE, OutputIdCalculator, calculate_id, calculate_visibility_id,
};
pub use transition::{
    AnimatedProperty, RootBoundsTransition, Transition, TransitionId, TransitionKeyScope,
    TransitionTarget, TransitionUnit, collect_root_bounds_transitions,
};
