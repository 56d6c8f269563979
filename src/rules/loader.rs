//! Parse replacement rule and target structure entries
//!
//! Entries arrive as raw strings from configuration. Each one is parsed on
//! its own so a single bad line only costs that line.

use crate::core::error::ConfigError;
use crate::rules::replacement_rules::ReplacementRule;

/// Parse a `namespace:id:percent` entry
pub fn parse_rule_entry(entry: &str) -> Result<ReplacementRule, ConfigError> {
    let parts: Vec<&str> = entry.trim().split(':').collect();
    if parts.len() != 3 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::MalformedRule(entry.to_string()));
    }

    let percent: f64 = parts[2]
        .trim()
        .parse()
        .map_err(|_| ConfigError::RateNotNumeric(entry.to_string()))?;

    // NaN fails the range check too
    if !(0.0..=100.0).contains(&percent) {
        return Err(ConfigError::RateOutOfRange {
            entry: entry.to_string(),
            rate: percent,
        });
    }

    Ok(ReplacementRule {
        candidate_id: format!("{}:{}", parts[0], parts[1]),
        percent,
    })
}

/// Validate a `namespace:structure_id` entry
pub fn parse_structure_entry(entry: &str) -> Result<String, ConfigError> {
    let trimmed = entry.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::MalformedStructure(entry.to_string()));
    }
    Ok(trimmed.to_string())
}
