//! Replacement rules and target structures

use ahash::AHashMap;

use crate::core::config::HauntConfig;
use crate::core::error::ConfigError;
use crate::rules::loader::{parse_rule_entry, parse_structure_entry};

/// A single candidate → replacement probability rule
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementRule {
    pub candidate_id: String,
    /// As configured, 0 to 100. Kept so rules serialize back verbatim.
    pub percent: f64,
}

impl ReplacementRule {
    /// Normalized probability in [0, 1]
    pub fn rate(&self) -> f64 {
        self.percent / 100.0
    }

    /// Canonical `namespace:id:percent` form
    pub fn to_entry(&self) -> String {
        format!("{}:{}", self.candidate_id, self.percent)
    }
}

/// Effective rules after a (re)load
///
/// Immutable once built; a config reload builds a fresh set.
#[derive(Debug, Clone, Default)]
pub struct ReplacementRuleSet {
    rules: AHashMap<String, ReplacementRule>,
    target_structures: Vec<String>,
    enabled: bool,
    rejected: Vec<ConfigError>,
}

impl ReplacementRuleSet {
    /// Parse rule and structure entries. Malformed entries are logged and
    /// skipped; duplicates resolve last-wins.
    pub fn load<R, T>(rule_entries: R, target_entries: T, enabled: bool) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut rules = AHashMap::new();
        let mut target_structures = Vec::new();
        let mut rejected = Vec::new();

        for entry in rule_entries {
            match parse_rule_entry(entry.as_ref()) {
                Ok(rule) => {
                    if let Some(previous) = rules.insert(rule.candidate_id.clone(), rule) {
                        tracing::debug!(
                            "Duplicate replacement rule for {}, later entry wins",
                            previous.candidate_id
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    rejected.push(err);
                }
            }
        }

        for entry in target_entries {
            match parse_structure_entry(entry.as_ref()) {
                Ok(structure) => {
                    if !target_structures.contains(&structure) {
                        target_structures.push(structure);
                    }
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    rejected.push(err);
                }
            }
        }

        Self {
            rules,
            target_structures,
            enabled,
            rejected,
        }
    }

    pub fn from_config(config: &HauntConfig) -> Self {
        Self::load(&config.target_mobs, &config.target_structures, config.enabled)
    }

    /// Replacement probability for a candidate, 0.0 when unconfigured
    pub fn rate_for(&self, candidate_id: &str) -> f64 {
        self.rules
            .get(candidate_id)
            .map(ReplacementRule::rate)
            .unwrap_or(0.0)
    }

    /// Whether a rule exists, even one with rate 0
    pub fn has_rule(&self, candidate_id: &str) -> bool {
        self.rules.contains_key(candidate_id)
    }

    /// Loose match: a configured target matches any structure id containing it
    pub fn is_target_structure(&self, structure_id: &str) -> bool {
        self.target_structures
            .iter()
            .any(|target| structure_id.contains(target.as_str()))
    }

    /// True if any of the given structure ids is a target
    pub fn any_target<S: AsRef<str>>(&self, structure_ids: &[S]) -> bool {
        structure_ids
            .iter()
            .any(|id| self.is_target_structure(id.as_ref()))
    }

    pub fn default_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target_structures(&self) -> &[String] {
        &self.target_structures
    }

    /// Entries skipped during load
    pub fn rejected(&self) -> &[ConfigError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by candidate id
    pub fn rules(&self) -> Vec<&ReplacementRule> {
        let mut rules: Vec<_> = self.rules.values().collect();
        rules.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
        rules
    }

    /// Effective rules in canonical `namespace:id:percent` form
    pub fn to_entries(&self) -> Vec<String> {
        self.rules().into_iter().map(ReplacementRule::to_entry).collect()
    }
}
