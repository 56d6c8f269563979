//! Haunted house configuration with documented constants
//!
//! The list-valued fields are kept as raw strings here; they are parsed (and
//! individually rejected when malformed) by `ReplacementRuleSet::load`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{HauntError, Result};

/// Default spotting radius in blocks
pub const SPOT_RADIUS: f64 = 32.0;

/// Minimum dot product between look vector and direction to the target.
/// 0.95 is roughly an 18 degree cone around the crosshair.
pub const GAZE_THRESHOLD: f64 = 0.95;

/// Slack applied when comparing a raycast hit against the target distance.
/// Subtracted from the squared distance, not the linear one.
pub const OCCLUSION_TOLERANCE: f64 = 0.5;

/// Tuning knobs for the trackers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Observers farther than this never spot a hidden replacement
    pub spot_radius: f64,

    /// Gaze cone as a cosine (see `GAZE_THRESHOLD`)
    pub gaze_threshold: f64,

    /// Raycast hit tolerance (see `OCCLUSION_TOLERANCE`)
    pub occlusion_tolerance: f64,

    /// Hidden entities are checked once every N ticks of their age
    ///
    /// At 10 ticks a murmur is noticed at most half a second late while the
    /// per-tick cost drops tenfold.
    pub visibility_check_interval: u64,

    /// How often the ambient effect is re-applied to observers inside a
    /// target structure
    pub ambient_refresh_interval: u64,

    /// Duration of each ambient application. Must outlast the refresh
    /// interval or the effect flickers.
    pub ambient_duration_ticks: u32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            spot_radius: SPOT_RADIUS,
            gaze_threshold: GAZE_THRESHOLD,
            occlusion_tolerance: OCCLUSION_TOLERANCE,
            visibility_check_interval: 10,
            ambient_refresh_interval: 20,
            ambient_duration_ticks: 60,
        }
    }
}

/// Complete haunted house configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HauntConfig {
    /// Feature opt-in. Off unless the operator turns it on.
    pub enabled: bool,

    /// Emit per-decision debug logs
    pub debug_log: bool,

    /// `namespace:mob_id:percent` entries
    pub target_mobs: Vec<String>,

    /// `namespace:structure_id` entries, matched as substrings
    pub target_structures: Vec<String>,

    /// Mob spawned in place of a cancelled candidate
    pub replacement_mob: String,

    /// Chance in [0, 1] that a spawn inside a target structure also brings
    /// an extra `boost_mob`
    pub boost_chance: f64,

    pub boost_mob: String,

    /// Content packs that must be loaded for the feature to initialize
    pub required_mods: Vec<String>,

    pub tuning: TuningConfig,
}

impl Default for HauntConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debug_log: false,
            target_mobs: vec!["minecraft:witch:10".to_string()],
            target_structures: vec!["nova_structures:witch_villa".to_string()],
            replacement_mob: "alexsmobs:murmur".to_string(),
            boost_chance: 0.0,
            boost_mob: "minecraft:witch".to_string(),
            required_mods: vec!["alexsmobs".to_string(), "mr_dungeons_andtaverns".to_string()],
            tuning: TuningConfig::default(),
        }
    }
}

impl HauntConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: HauntConfig = toml::from_str(contents)?;
        config.validate().map_err(HauntError::InvalidConfig)?;
        Ok(config)
    }

    /// Load from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate scalar settings. List entries are checked per entry at
    /// rule-set load instead, so one bad line never rejects the file.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.boost_chance) {
            return Err(format!(
                "boost_chance ({}) must be between 0.0 and 1.0",
                self.boost_chance
            ));
        }

        if self.replacement_mob.trim().is_empty() {
            return Err("replacement_mob must not be empty".into());
        }

        if self.boost_chance > 0.0 && self.boost_mob.trim().is_empty() {
            return Err("boost_mob must be set when boost_chance is positive".into());
        }

        let tuning = &self.tuning;
        if tuning.spot_radius <= 0.0 {
            return Err(format!("spot_radius ({}) must be positive", tuning.spot_radius));
        }

        if !(-1.0..=1.0).contains(&tuning.gaze_threshold) {
            return Err(format!(
                "gaze_threshold ({}) must be a cosine in [-1, 1]",
                tuning.gaze_threshold
            ));
        }

        if tuning.occlusion_tolerance < 0.0 {
            return Err("occlusion_tolerance must not be negative".into());
        }

        if tuning.visibility_check_interval == 0 || tuning.ambient_refresh_interval == 0 {
            return Err("check and refresh intervals must be at least 1 tick".into());
        }

        Ok(())
    }
}
