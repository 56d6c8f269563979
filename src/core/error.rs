use thiserror::Error;

/// A single rejected configuration entry.
///
/// These never abort a load: the offending entry is logged and skipped while
/// its siblings still take effect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid mob entry format: '{0}'. Expected format: 'namespace:mob_id:replacement_rate'")]
    MalformedRule(String),

    #[error("Invalid replacement rate in entry '{0}'. Must be a number")]
    RateNotNumeric(String),

    #[error("Invalid replacement rate in entry '{entry}'. Rate must be between 0 and 100, got {rate}")]
    RateOutOfRange { entry: String, rate: f64 },

    #[error("Invalid structure entry format: '{0}'. Expected format: 'namespace:structure_id'")]
    MalformedStructure(String),
}

/// The host could not instantiate a replacement entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpawnError {
    #[error("Unknown entity type: {0}")]
    UnknownType(String),

    #[error("Failed to create {type_id}: {reason}")]
    CreationFailed { type_id: String, reason: String },
}

/// A collaborator query could not be answered this cycle.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{oracle} unavailable: {reason}")]
pub struct OracleUnavailable {
    pub oracle: &'static str,
    pub reason: String,
}

impl OracleUnavailable {
    pub fn new(oracle: &'static str, reason: impl Into<String>) -> Self {
        Self {
            oracle,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HauntError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HauntError>;
