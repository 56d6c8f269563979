//! Host event interface
//!
//! The host integration layer calls one method per event kind. Everything
//! the handlers need from the world comes in through the `Host` bound.

use crate::core::config::HauntConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Orientation, Position, Timestamp, TypeId};
use crate::tracking::{HiddenEntity, Transition};
use crate::world::Host;

/// A mob the host is about to finalize
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnCandidate {
    pub type_id: TypeId,
    pub position: Position,
    pub orientation: Orientation,
}

impl SpawnCandidate {
    pub fn new(type_id: impl Into<String>, position: Position) -> Self {
        Self {
            type_id: TypeId::new(type_id),
            position,
            orientation: Orientation::default(),
        }
    }
}

/// What the host should do with the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Let the spawn finish normally
    Proceed,
    /// Let the spawn finish; an extra mob was added next to it
    Boosted { extra: EntityId },
    /// Cancel the spawn. `replacement` is `None` when creating it failed.
    Cancelled { replacement: Option<EntityId> },
}

impl SpawnOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SpawnOutcome::Cancelled { .. })
    }
}

pub trait HostEvents {
    fn on_spawn_candidate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        candidate: &SpawnCandidate,
    ) -> SpawnOutcome;

    /// Returns true when the entity was revealed by this tick
    fn on_entity_tick<H: Host + ?Sized>(&mut self, host: &mut H, entity: &HiddenEntity) -> bool;

    fn on_observer_tick<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        observer_id: EntityId,
        location: Position,
        now: Timestamp,
    ) -> Transition;

    fn on_entity_removed(&mut self, entity_id: EntityId);

    fn on_observer_left(&mut self, observer_id: EntityId);

    /// Swap in a new configuration. An invalid one is rejected and the old
    /// one stays active.
    fn on_config_reload(&mut self, config: HauntConfig) -> Result<()>;
}
