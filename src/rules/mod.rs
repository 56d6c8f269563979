//! Replacement rules loaded from configuration

mod loader;
pub mod replacement_rules;

pub use loader::{parse_rule_entry, parse_structure_entry};
pub use replacement_rules::{ReplacementRule, ReplacementRuleSet};
