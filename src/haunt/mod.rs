//! Haunted house host integration

pub mod events;
pub mod module;

pub use events::{HostEvents, SpawnCandidate, SpawnOutcome};
pub use module::HauntedHouse;
