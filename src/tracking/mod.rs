//! Stateful trackers driven by the host scheduler

pub mod occupancy;
pub mod visibility;

pub use occupancy::{StructureOccupancy, Transition, ZoneOccupancyTracker};
pub use visibility::{
    Concealment, HiddenEntity, SpottingGeometry, TrackedReplacement, VisibilityTracker,
};
