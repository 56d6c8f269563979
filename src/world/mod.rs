//! Host collaborator interfaces
//!
//! The host engine owns structures, raycasting, the player roster, entity
//! creation and status effects. The haunted house logic only talks to it
//! through these traits so it can run against a mocked world.

use crate::core::error::{OracleUnavailable, SpawnError};
use crate::core::types::{EntityId, Orientation, Position, TypeId};

/// Structures overlapping a point
pub trait StructureMembershipOracle {
    /// Registry ids of every structure at `location`. May be empty.
    fn structures_at(&self, location: Position) -> Result<Vec<String>, OracleUnavailable>;
}

/// Result of a single raycast against solid collision geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub hit: bool,
    pub hit_distance: f64,
    pub hit_point: Position,
}

impl RayHit {
    /// The ray reached its end point unobstructed
    pub fn miss(from: Position, to: Position) -> Self {
        Self {
            hit: false,
            hit_distance: from.distance(to),
            hit_point: to,
        }
    }

    pub fn blocked_at(from: Position, point: Position) -> Self {
        Self {
            hit: true,
            hit_distance: from.distance(point),
            hit_point: point,
        }
    }
}

pub trait LineOfSightOracle {
    /// Cast from `from` to `to`, ignoring the `ignoring` entity's own hitbox
    fn query(
        &self,
        from: Position,
        to: Position,
        ignoring: EntityId,
    ) -> Result<RayHit, OracleUnavailable>;
}

/// A participant whose gaze can reveal hidden entities
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    pub id: EntityId,
    pub name: String,
    pub eye_position: Position,
    /// Not necessarily normalized
    pub look_vector: Position,
    pub is_spectating: bool,
}

pub trait ObserverRoster {
    /// Observers in the entity's world, in host iteration order
    fn active_observers(&self) -> Result<Vec<Observer>, OracleUnavailable>;
}

pub trait EntityLifecycle {
    fn create(
        &mut self,
        type_id: &TypeId,
        position: Position,
        orientation: Orientation,
    ) -> Result<EntityId, SpawnError>;
}

/// Status effects the module applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Keeps a replacement unseen until someone looks straight at it
    Invisibility,
    /// Ambient dread while inside a target structure
    Darkness,
}

/// Fire-and-forget effect delivery
pub trait EffectChannel {
    fn apply(&mut self, target: EntityId, kind: EffectKind, duration_ticks: u32);

    fn remove(&mut self, target: EntityId, kind: EffectKind);
}

/// Duration used for effects that should never expire on their own
pub const INDEFINITE: u32 = u32::MAX;

/// Everything the module needs from the host, in one bound
pub trait Host:
    StructureMembershipOracle + LineOfSightOracle + ObserverRoster + EntityLifecycle + EffectChannel
{
}

impl<T> Host for T where
    T: StructureMembershipOracle
        + LineOfSightOracle
        + ObserverRoster
        + EntityLifecycle
        + EffectChannel
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hit_constructors() {
        let from = Position::new(0.0, 0.0, 0.0);
        let to = Position::new(3.0, 4.0, 0.0);

        let miss = RayHit::miss(from, to);
        assert!(!miss.hit);
        assert!((miss.hit_distance - 5.0).abs() < 1e-9);

        let blocked = RayHit::blocked_at(from, Position::new(0.0, 2.0, 0.0));
        assert!(blocked.hit);
        assert!((blocked.hit_distance - 2.0).abs() < 1e-9);
    }
}
