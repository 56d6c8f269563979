//! Which observers are currently inside a target structure

use ahash::AHashMap;

use crate::core::types::{EntityId, Position, Timestamp};
use crate::rules::ReplacementRuleSet;
use crate::world::StructureMembershipOracle;

/// Membership change reported by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Entered,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureOccupancy {
    pub observer_id: EntityId,
    pub entered_at: Timestamp,
}

/// Enter/leave tracking. The signal itself is never rate limited; callers
/// own how often they refresh effects while an observer stays inside.
#[derive(Debug, Clone)]
pub struct ZoneOccupancyTracker {
    occupants: AHashMap<EntityId, StructureOccupancy>,
    refresh_interval: u64,
    debug_log: bool,
}

impl Default for ZoneOccupancyTracker {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ZoneOccupancyTracker {
    pub fn new(refresh_interval: u64) -> Self {
        Self {
            occupants: AHashMap::new(),
            refresh_interval: refresh_interval.max(1),
            debug_log: false,
        }
    }

    pub fn set_refresh_interval(&mut self, refresh_interval: u64) {
        self.refresh_interval = refresh_interval.max(1);
    }

    pub fn set_debug_log(&mut self, enabled: bool) {
        self.debug_log = enabled;
    }

    pub fn debug_log(&self) -> bool {
        self.debug_log
    }

    pub fn tick<O>(
        &mut self,
        observer_id: EntityId,
        location: Position,
        oracle: &O,
        rules: &ReplacementRuleSet,
        now: Timestamp,
    ) -> Transition
    where
        O: StructureMembershipOracle + ?Sized,
    {
        let inside_target = match oracle.structures_at(location) {
            Ok(structures) => rules.any_target(&structures),
            Err(err) => {
                if self.debug_log {
                    tracing::debug!("Structure lookup failed for {}: {}", observer_id, err);
                }
                false
            }
        };

        match (inside_target, self.occupants.contains_key(&observer_id)) {
            (true, false) => {
                self.occupants.insert(
                    observer_id,
                    StructureOccupancy {
                        observer_id,
                        entered_at: now,
                    },
                );
                Transition::Entered
            }
            (false, true) => {
                self.occupants.remove(&observer_id);
                Transition::Left
            }
            _ => Transition::None,
        }
    }

    pub fn entered_at(&self, observer_id: EntityId) -> Option<Timestamp> {
        self.occupants.get(&observer_id).map(|o| o.entered_at)
    }

    pub fn is_inside(&self, observer_id: EntityId) -> bool {
        self.occupants.contains_key(&observer_id)
    }

    /// Drop an observer that disconnected while inside
    pub fn forget(&mut self, observer_id: EntityId) -> Option<StructureOccupancy> {
        self.occupants.remove(&observer_id)
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// True on every `refresh_interval`-th tick after the observer entered.
    /// The entry tick itself is not a refresh; the caller applies the effect
    /// on `Entered` already.
    pub fn is_refresh_due(&self, observer_id: EntityId, now: Timestamp) -> bool {
        match self.entered_at(observer_id) {
            Some(entered_at) if now > entered_at => {
                (now - entered_at) % self.refresh_interval as i64 == 0
            }
            _ => false,
        }
    }
}
