//! Hidden-until-spotted tracking for replacement entities
//!
//! A replacement spawns concealed and stays that way until an observer looks
//! straight at it with a clear line of sight. Once spotted it is never
//! concealed again.

use ahash::AHashMap;

use crate::core::config::{TuningConfig, GAZE_THRESHOLD, OCCLUSION_TOLERANCE, SPOT_RADIUS};
use crate::core::types::{EntityId, Position, Tick};
use crate::world::{LineOfSightOracle, Observer};

/// Per-entity visibility state. `Visible` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concealment {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedReplacement {
    pub entity_id: EntityId,
    pub spotted: bool,
}

impl TrackedReplacement {
    pub fn state(&self) -> Concealment {
        if self.spotted {
            Concealment::Visible
        } else {
            Concealment::Hidden
        }
    }
}

/// The entity being checked, as seen by the host this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiddenEntity {
    pub id: EntityId,
    pub eye_position: Position,
    /// Ticks since the entity was created, drives the check cadence
    pub age: Tick,
}

/// What counts as "looking at" an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpottingGeometry {
    pub radius: f64,
    /// Cosine of the gaze cone half-angle
    pub gaze_threshold: f64,
    pub occlusion_tolerance: f64,
}

impl Default for SpottingGeometry {
    fn default() -> Self {
        Self {
            radius: SPOT_RADIUS,
            gaze_threshold: GAZE_THRESHOLD,
            occlusion_tolerance: OCCLUSION_TOLERANCE,
        }
    }
}

impl SpottingGeometry {
    /// Distance and gaze gates. Cheap, so they run before any raycast.
    pub fn in_view(&self, observer: &Observer, target_eye: Position) -> bool {
        let offset = target_eye - observer.eye_position;
        if offset.length_squared() > self.radius * self.radius {
            return false;
        }

        let to_target = offset.normalize_or_zero();
        let look = observer.look_vector.normalize_or_zero();
        look.dot(to_target) >= self.gaze_threshold
    }

    /// Whether a raycast hit lands clearly in front of the target
    ///
    /// The tolerance is subtracted from the *squared* distance to the target,
    /// so it is not a linear slack: at 30 blocks it amounts to under a
    /// hundredth of a block. Switching to a linear comparison changes which
    /// observers count as blocked.
    pub fn is_occluded(
        &self,
        observer_eye: Position,
        target_eye: Position,
        hit_point: Position,
    ) -> bool {
        let to_hit = hit_point.distance_squared(observer_eye);
        let to_target = target_eye.distance_squared(observer_eye);
        to_hit < to_target - self.occlusion_tolerance
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    entries: AHashMap<EntityId, TrackedReplacement>,
    geometry: SpottingGeometry,
    check_interval: Tick,
    debug_log: bool,
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::with_tuning(&TuningConfig::default())
    }

    pub fn with_tuning(tuning: &TuningConfig) -> Self {
        Self {
            entries: AHashMap::new(),
            geometry: SpottingGeometry {
                radius: tuning.spot_radius,
                gaze_threshold: tuning.gaze_threshold,
                occlusion_tolerance: tuning.occlusion_tolerance,
            },
            check_interval: tuning.visibility_check_interval.max(1),
            debug_log: false,
        }
    }

    /// Apply new tuning without dropping tracked entities
    pub fn retune(&mut self, tuning: &TuningConfig) {
        let entries = std::mem::take(&mut self.entries);
        let debug_log = self.debug_log;
        *self = Self::with_tuning(tuning);
        self.entries = entries;
        self.debug_log = debug_log;
    }

    /// Per-check debug logs are off unless this is set
    pub fn set_debug_log(&mut self, enabled: bool) {
        self.debug_log = enabled;
    }

    pub fn debug_log(&self) -> bool {
        self.debug_log
    }

    /// Start tracking a freshly spawned replacement. Returns false if it was
    /// already tracked, in which case its state is left alone.
    pub fn track(&mut self, entity_id: EntityId) -> bool {
        if self.entries.contains_key(&entity_id) {
            return false;
        }
        self.entries.insert(
            entity_id,
            TrackedReplacement {
                entity_id,
                spotted: false,
            },
        );
        true
    }

    /// Drop an entity the host has removed
    pub fn forget(&mut self, entity_id: EntityId) -> Option<TrackedReplacement> {
        self.entries.remove(&entity_id)
    }

    pub fn is_tracked(&self, entity_id: EntityId) -> bool {
        self.entries.contains_key(&entity_id)
    }

    pub fn state_of(&self, entity_id: EntityId) -> Option<Concealment> {
        self.entries.get(&entity_id).map(TrackedReplacement::state)
    }

    pub fn is_spotted(&self, entity_id: EntityId) -> bool {
        self.state_of(entity_id) == Some(Concealment::Visible)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hidden_count(&self) -> usize {
        self.entries.values().filter(|e| !e.spotted).count()
    }

    pub fn geometry(&self) -> &SpottingGeometry {
        &self.geometry
    }

    /// Checks run every `check_interval` ticks of entity age, not every tick
    pub fn is_check_due(&self, age: Tick) -> bool {
        age % self.check_interval == 0
    }

    /// Evaluate observers in order; the first one with the entity centred in
    /// view and an unobstructed ray reveals it.
    ///
    /// Returns true only on the call that flips the entity to `Visible`.
    /// Untracked and already-visible entities return false without querying
    /// anything.
    pub fn check_visibility<L>(
        &mut self,
        entity: &HiddenEntity,
        observers: &[Observer],
        los: &L,
    ) -> bool
    where
        L: LineOfSightOracle + ?Sized,
    {
        let geometry = self.geometry;
        let debug_log = self.debug_log;
        let Some(entry) = self.entries.get_mut(&entity.id) else {
            return false;
        };
        if entry.spotted {
            return false;
        }

        for observer in observers {
            if observer.is_spectating || !geometry.in_view(observer, entity.eye_position) {
                continue;
            }

            let hit = match los.query(observer.eye_position, entity.eye_position, observer.id) {
                Ok(hit) => hit,
                Err(err) => {
                    if debug_log {
                        tracing::debug!("Line of sight unavailable for {}: {}", observer.name, err);
                    }
                    continue;
                }
            };

            if hit.hit
                && geometry.is_occluded(observer.eye_position, entity.eye_position, hit.hit_point)
            {
                continue;
            }

            entry.spotted = true;
            if debug_log {
                tracing::debug!(
                    "Observer {} spotted {} at {}",
                    observer.name,
                    entity.id,
                    entity.eye_position
                );
            }
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::OracleUnavailable;
    use crate::world::RayHit;
    use std::cell::Cell;

    /// Open field: every ray reaches its target
    #[derive(Default)]
    struct ClearSky {
        queries: Cell<usize>,
    }

    impl LineOfSightOracle for ClearSky {
        fn query(
            &self,
            from: Position,
            to: Position,
            _: EntityId,
        ) -> Result<RayHit, OracleUnavailable> {
            self.queries.set(self.queries.get() + 1);
            Ok(RayHit::miss(from, to))
        }
    }

    /// A wall at x = `wall_x` blocks every ray crossing it
    struct Wall {
        wall_x: f64,
    }

    impl LineOfSightOracle for Wall {
        fn query(
            &self,
            from: Position,
            to: Position,
            _: EntityId,
        ) -> Result<RayHit, OracleUnavailable> {
            if (from.x < self.wall_x) == (to.x < self.wall_x) {
                return Ok(RayHit::miss(from, to));
            }
            let t = (self.wall_x - from.x) / (to.x - from.x);
            Ok(RayHit::blocked_at(from, from + (to - from) * t))
        }
    }

    struct Blind;

    impl LineOfSightOracle for Blind {
        fn query(
            &self,
            _: Position,
            _: Position,
            _: EntityId,
        ) -> Result<RayHit, OracleUnavailable> {
            Err(OracleUnavailable::new("line of sight", "world unloading"))
        }
    }

    fn observer_looking(eye: Position, look: Position) -> Observer {
        Observer {
            id: EntityId::new(),
            name: "Steve".to_string(),
            eye_position: eye,
            look_vector: look,
            is_spectating: false,
        }
    }

    fn hidden_at(x: f64) -> (VisibilityTracker, HiddenEntity) {
        let mut tracker = VisibilityTracker::new();
        let entity = HiddenEntity {
            id: EntityId::new(),
            eye_position: Position::new(x, 1.6, 0.0),
            age: 0,
        };
        tracker.track(entity.id);
        (tracker, entity)
    }

    fn eye() -> Position {
        Position::new(0.0, 1.6, 0.0)
    }

    #[test]
    fn test_close_centred_unobstructed_spots() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);

        assert!(tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
        assert_eq!(tracker.state_of(entity.id), Some(Concealment::Visible));
    }

    #[test]
    fn test_visible_is_terminal() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);
        let sky = ClearSky::default();

        assert!(tracker.check_visibility(&entity, &[observer.clone()], &sky));
        let queries = sky.queries.get();

        assert!(!tracker.check_visibility(&entity, &[observer], &sky));
        let away = observer_looking(eye(), Position::NEG_X);
        assert!(!tracker.check_visibility(&entity, &[away], &sky));
        assert!(!tracker.check_visibility(&entity, &[], &sky));

        assert!(tracker.is_spotted(entity.id));
        assert_eq!(sky.queries.get(), queries);
    }

    #[test]
    fn test_out_of_range_never_spots() {
        let (mut tracker, entity) = hidden_at(32.5);
        let observer = observer_looking(eye(), Position::X);
        let sky = ClearSky::default();

        assert!(!tracker.check_visibility(&entity, &[observer], &sky));
        assert_eq!(sky.queries.get(), 0);
        assert_eq!(tracker.state_of(entity.id), Some(Concealment::Hidden));
    }

    #[test]
    fn test_exactly_at_radius_still_spots() {
        let (mut tracker, entity) = hidden_at(32.0);
        let observer = observer_looking(eye(), Position::X);
        assert!(tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
    }

    #[test]
    fn test_looking_away_never_spots() {
        let (mut tracker, entity) = hidden_at(10.0);
        // About 25 degrees off target
        let look = Position::new(1.0, 0.0, 0.466);
        let observer = observer_looking(eye(), look);
        let sky = ClearSky::default();

        assert!(!tracker.check_visibility(&entity, &[observer], &sky));
        assert_eq!(sky.queries.get(), 0);
    }

    #[test]
    fn test_slightly_off_centre_spots() {
        let (mut tracker, entity) = hidden_at(10.0);
        // About 10 degrees off target, unnormalized on purpose
        let look = Position::new(3.0, 0.0, 0.53);
        let observer = observer_looking(eye(), look);
        assert!(tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
    }

    #[test]
    fn test_occluded_never_spots() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);
        assert!(!tracker.check_visibility(&entity, &[observer], &Wall { wall_x: 5.0 }));
        assert!(!tracker.is_spotted(entity.id));
    }

    #[test]
    fn test_hit_at_target_is_not_occlusion() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);
        // The ray clips a block right at the target, inside the tolerance
        assert!(tracker.check_visibility(&entity, &[observer], &Wall { wall_x: 9.99 }));
    }

    #[test]
    fn test_spectators_skipped() {
        let (mut tracker, entity) = hidden_at(10.0);
        let mut observer = observer_looking(eye(), Position::X);
        observer.is_spectating = true;
        assert!(!tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
    }

    #[test]
    fn test_first_qualifying_observer_wins() {
        let (mut tracker, entity) = hidden_at(10.0);
        let away = observer_looking(eye(), Position::NEG_X);
        let first = observer_looking(eye(), Position::X);
        let second = observer_looking(Position::new(1.0, 1.6, 0.0), Position::X);
        let sky = ClearSky::default();

        assert!(tracker.check_visibility(&entity, &[away, first, second], &sky));
        assert_eq!(sky.queries.get(), 1);
    }

    #[test]
    fn test_los_failure_skips_observer() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);
        assert!(!tracker.check_visibility(&entity, &[observer], &Blind));
        assert!(!tracker.is_spotted(entity.id));
    }

    #[test]
    fn test_untracked_entity_ignored() {
        let mut tracker = VisibilityTracker::new();
        let entity = HiddenEntity {
            id: EntityId::new(),
            eye_position: Position::new(5.0, 1.6, 0.0),
            age: 0,
        };
        let observer = observer_looking(eye(), Position::X);
        assert!(!tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
        assert!(!tracker.is_tracked(entity.id));
    }

    #[test]
    fn test_track_is_idempotent_and_forget_evicts() {
        let (mut tracker, entity) = hidden_at(10.0);
        let observer = observer_looking(eye(), Position::X);
        tracker.check_visibility(&entity, &[observer], &ClearSky::default());

        // Re-tracking never re-hides
        assert!(!tracker.track(entity.id));
        assert!(tracker.is_spotted(entity.id));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.hidden_count(), 0);

        let removed = tracker.forget(entity.id).expect("entity was tracked");
        assert!(removed.spotted);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_check_cadence() {
        let tracker = VisibilityTracker::new();
        assert!(tracker.is_check_due(0));
        assert!(!tracker.is_check_due(5));
        assert!(tracker.is_check_due(10));
        assert!(tracker.is_check_due(20));
    }

    #[test]
    fn test_retune_keeps_entries() {
        let (mut tracker, entity) = hidden_at(20.0);
        let tuning = TuningConfig {
            spot_radius: 16.0,
            ..TuningConfig::default()
        };
        tracker.retune(&tuning);

        assert!(tracker.is_tracked(entity.id));
        let observer = observer_looking(eye(), Position::X);
        assert!(!tracker.check_visibility(&entity, &[observer], &ClearSky::default()));
    }

    #[test]
    fn test_tolerance_applies_to_squared_distance() {
        let geometry = SpottingGeometry::default();
        let observer = Position::ZERO;
        let target = Position::new(30.0, 0.0, 0.0);

        // 0.1 blocks short of a 30 block target: inside a linear 0.5 slack,
        // but 894.01 < 900 - 0.5 in squared terms
        assert!(geometry.is_occluded(observer, target, Position::new(29.9, 0.0, 0.0)));
        assert!(!geometry.is_occluded(observer, target, Position::new(29.995, 0.0, 0.0)));
    }

    #[test]
    fn test_retune_keeps_debug_log() {
        let mut tracker = VisibilityTracker::new();
        assert!(!tracker.debug_log());
        tracker.set_debug_log(true);
        tracker.retune(&TuningConfig::default());
        assert!(tracker.debug_log());
    }
}
