//! Spawn decision engine
//!
//! Decides, for each candidate about to spawn, whether to leave it alone,
//! bring an extra boost mob alongside it, or cancel it in favour of the
//! replacement mob. Two passes run in order; a successful boost wins the
//! event outright.
//!
//! Structure membership is looked up at most once per call, and never when
//! neither pass needs it. Zero probabilities never consume a draw.

use crate::core::config::HauntConfig;
use crate::core::types::{Position, TypeId};
use crate::rules::ReplacementRuleSet;
use crate::spawn::random::RandomSource;
use crate::world::StructureMembershipOracle;

/// Outcome of a single spawn event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Ignore,
    /// Keep the candidate and add one of these next to it
    BoostTo(TypeId),
    /// Cancel the candidate and spawn this instead
    ReplaceWith(TypeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoostPolicy {
    /// Probability in [0, 1]; 0 disables the pass
    pub chance: f64,
    pub target: TypeId,
}

impl BoostPolicy {
    pub fn disabled(target: TypeId) -> Self {
        Self { chance: 0.0, target }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnDecisionEngine {
    rules: ReplacementRuleSet,
    boost: BoostPolicy,
    replacement: TypeId,
}

impl SpawnDecisionEngine {
    pub fn new(rules: ReplacementRuleSet, boost: BoostPolicy, replacement: TypeId) -> Self {
        Self {
            rules,
            boost,
            replacement,
        }
    }

    pub fn from_config(config: &HauntConfig) -> Self {
        Self::new(
            ReplacementRuleSet::from_config(config),
            BoostPolicy {
                chance: config.boost_chance,
                target: TypeId::new(config.boost_mob.clone()),
            },
            TypeId::new(config.replacement_mob.clone()),
        )
    }

    pub fn rules(&self) -> &ReplacementRuleSet {
        &self.rules
    }

    pub fn boost(&self) -> &BoostPolicy {
        &self.boost
    }

    pub fn replacement(&self) -> &TypeId {
        &self.replacement
    }

    pub fn decide<O, R>(
        &self,
        candidate_id: &str,
        location: Position,
        oracle: &O,
        rng: &mut R,
    ) -> Decision
    where
        O: StructureMembershipOracle + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut inside: Option<bool> = None;
        let mut inside_target = || {
            *inside.get_or_insert_with(|| self.in_target_structure(location, oracle))
        };

        // Boost pass
        if self.boost.chance > 0.0
            && candidate_id != self.boost.target.as_str()
            && inside_target()
            && passes(self.boost.chance, rng)
        {
            return Decision::BoostTo(self.boost.target.clone());
        }

        // Replacement pass
        if !self.rules.has_rule(candidate_id) || !inside_target() {
            return Decision::Ignore;
        }

        if passes(self.rules.rate_for(candidate_id), rng) {
            Decision::ReplaceWith(self.replacement.clone())
        } else {
            Decision::Ignore
        }
    }

    /// Oracle failures count as "no structure here"
    fn in_target_structure<O>(&self, location: Position, oracle: &O) -> bool
    where
        O: StructureMembershipOracle + ?Sized,
    {
        match oracle.structures_at(location) {
            Ok(structures) => self.rules.any_target(&structures),
            Err(err) => {
                tracing::warn!("Structure lookup failed at {}: {}", location, err);
                false
            }
        }
    }
}

/// `r < probability` for one uniform draw. The endpoints are decided
/// without touching the source.
fn passes<R: RandomSource + ?Sized>(probability: f64, rng: &mut R) -> bool {
    if probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.next_unit() < probability
    }
}
