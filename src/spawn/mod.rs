//! Spawn replacement policy

pub mod decision;
pub mod random;

pub use decision::{BoostPolicy, Decision, SpawnDecisionEngine};
pub use random::{RandomSource, ScriptedDraws};
