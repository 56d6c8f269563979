//! The haunted house feature
//!
//! Witches spawning inside a witch villa are sometimes swapped for a murmur
//! that stays invisible until a player looks right at it. Players inside a
//! villa get an ambient darkness effect while they stay there.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::HauntConfig;
use crate::core::error::{HauntError, Result};
use crate::core::types::{EntityId, Position, Timestamp};
use crate::haunt::events::{HostEvents, SpawnCandidate, SpawnOutcome};
use crate::spawn::{Decision, RandomSource, SpawnDecisionEngine};
use crate::tracking::{HiddenEntity, Transition, VisibilityTracker, ZoneOccupancyTracker};
use crate::world::{EffectKind, Host, INDEFINITE};

pub struct HauntedHouse<R = ChaCha8Rng> {
    config: HauntConfig,
    engine: SpawnDecisionEngine,
    visibility: VisibilityTracker,
    occupancy: ZoneOccupancyTracker,
    rng: R,
}

impl HauntedHouse<ChaCha8Rng> {
    pub fn new(config: HauntConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Deterministic draws for replays and tests
    pub fn with_seed(config: HauntConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> HauntedHouse<R> {
    /// Fails with `InvalidConfig` on the same settings a reload would reject
    pub fn with_rng(config: HauntConfig, rng: R) -> Result<Self> {
        config.validate().map_err(HauntError::InvalidConfig)?;

        let engine = SpawnDecisionEngine::from_config(&config);
        let mut visibility = VisibilityTracker::with_tuning(&config.tuning);
        visibility.set_debug_log(config.debug_log);
        let mut occupancy = ZoneOccupancyTracker::new(config.tuning.ambient_refresh_interval);
        occupancy.set_debug_log(config.debug_log);

        if config.enabled {
            tracing::info!(
                "Haunted house initialized - {} replacement rules across {} target structures",
                engine.rules().len(),
                engine.rules().target_structures().len()
            );
        }

        Ok(Self {
            config,
            engine,
            visibility,
            occupancy,
            rng,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.rules().default_enabled()
    }

    pub fn config(&self) -> &HauntConfig {
        &self.config
    }

    pub fn engine(&self) -> &SpawnDecisionEngine {
        &self.engine
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    pub fn occupancy(&self) -> &ZoneOccupancyTracker {
        &self.occupancy
    }

    /// The feature only makes sense when the content packs providing the
    /// replacement mob and the structures are installed.
    pub fn should_initialize<S: AsRef<str>>(&self, loaded_mods: &[S]) -> bool {
        let missing: Vec<&str> = self
            .config
            .required_mods
            .iter()
            .map(String::as_str)
            .filter(|required| !loaded_mods.iter().any(|m| m.as_ref() == *required))
            .collect();

        if missing.is_empty() {
            return true;
        }

        tracing::warn!(
            "Haunted house not initialized - missing required mods: {}",
            missing.join(" and ")
        );
        false
    }

    fn debug_enabled(&self) -> bool {
        self.config.debug_log
    }
}

impl<R: RandomSource> HostEvents for HauntedHouse<R> {
    fn on_spawn_candidate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        candidate: &SpawnCandidate,
    ) -> SpawnOutcome {
        if !self.is_enabled() {
            return SpawnOutcome::Proceed;
        }

        let decision = self.engine.decide(
            candidate.type_id.as_str(),
            candidate.position,
            &*host,
            &mut self.rng,
        );

        match decision {
            Decision::Ignore => SpawnOutcome::Proceed,
            Decision::BoostTo(type_id) => {
                match host.create(&type_id, candidate.position, candidate.orientation) {
                    Ok(extra) => {
                        if self.debug_enabled() {
                            tracing::debug!(
                                "Boosted {} spawn with {} at {}",
                                candidate.type_id,
                                type_id,
                                candidate.position
                            );
                        }
                        SpawnOutcome::Boosted { extra }
                    }
                    Err(err) => {
                        tracing::error!("Failed to spawn boost mob {}: {}", type_id, err);
                        SpawnOutcome::Proceed
                    }
                }
            }
            Decision::ReplaceWith(type_id) => {
                if self.debug_enabled() {
                    tracing::debug!(
                        "Cancelled {} spawn in target structure at {}",
                        candidate.type_id,
                        candidate.position
                    );
                }

                // The original stays cancelled even if the replacement fails
                match host.create(&type_id, candidate.position, candidate.orientation) {
                    Ok(replacement) => {
                        host.apply(replacement, EffectKind::Invisibility, INDEFINITE);
                        self.visibility.track(replacement);
                        if self.debug_enabled() {
                            tracing::debug!(
                                "Spawned invisible {} at {}",
                                type_id,
                                candidate.position
                            );
                        }
                        SpawnOutcome::Cancelled {
                            replacement: Some(replacement),
                        }
                    }
                    Err(err) => {
                        tracing::error!("Failed to spawn {} in target structure: {}", type_id, err);
                        SpawnOutcome::Cancelled { replacement: None }
                    }
                }
            }
        }
    }

    fn on_entity_tick<H: Host + ?Sized>(&mut self, host: &mut H, entity: &HiddenEntity) -> bool {
        if !self.is_enabled()
            || !self.visibility.is_check_due(entity.age)
            || !self.visibility.is_tracked(entity.id)
            || self.visibility.is_spotted(entity.id)
        {
            return false;
        }

        let observers = match host.active_observers() {
            Ok(observers) => observers,
            Err(err) => {
                if self.debug_enabled() {
                    tracing::debug!("Observer roster unavailable: {}", err);
                }
                return false;
            }
        };

        if !self.visibility.check_visibility(entity, &observers, &*host) {
            return false;
        }

        host.remove(entity.id, EffectKind::Invisibility);
        true
    }

    fn on_observer_tick<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        observer_id: EntityId,
        location: Position,
        now: Timestamp,
    ) -> Transition {
        if !self.is_enabled() {
            return Transition::None;
        }

        let duration = self.config.tuning.ambient_duration_ticks;
        let transition = self
            .occupancy
            .tick(observer_id, location, &*host, self.engine.rules(), now);

        match transition {
            Transition::Entered => {
                host.apply(observer_id, EffectKind::Darkness, duration);
                if self.debug_enabled() {
                    tracing::debug!(
                        "Observer {} entered a target structure at {}",
                        observer_id,
                        location
                    );
                }
            }
            Transition::Left => {
                host.remove(observer_id, EffectKind::Darkness);
                if self.debug_enabled() {
                    tracing::debug!("Observer {} left a target structure", observer_id);
                }
            }
            Transition::None => {
                if self.occupancy.is_refresh_due(observer_id, now) {
                    host.apply(observer_id, EffectKind::Darkness, duration);
                }
            }
        }

        transition
    }

    fn on_entity_removed(&mut self, entity_id: EntityId) {
        if let Some(entry) = self.visibility.forget(entity_id) {
            if self.debug_enabled() {
                tracing::debug!(
                    "Stopped tracking {} (spotted: {})",
                    entry.entity_id,
                    entry.spotted
                );
            }
        }
    }

    fn on_observer_left(&mut self, observer_id: EntityId) {
        self.occupancy.forget(observer_id);
    }

    fn on_config_reload(&mut self, config: HauntConfig) -> Result<()> {
        if let Err(message) = config.validate() {
            tracing::warn!("Rejected haunted house config reload: {}", message);
            return Err(HauntError::InvalidConfig(message));
        }

        self.engine = SpawnDecisionEngine::from_config(&config);
        self.visibility.retune(&config.tuning);
        self.visibility.set_debug_log(config.debug_log);
        self.occupancy
            .set_refresh_interval(config.tuning.ambient_refresh_interval);
        self.occupancy.set_debug_log(config.debug_log);

        tracing::info!(
            "Haunted house config reloaded - enabled: {}, {} rules, {} rejected entries",
            config.enabled,
            self.engine.rules().len(),
            self.engine.rules().rejected().len()
        );
        self.config = config;
        Ok(())
    }
}
