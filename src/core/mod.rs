pub mod config;
pub mod error;
pub mod types;

pub use config::{HauntConfig, TuningConfig};
pub use error::{ConfigError, HauntError, OracleUnavailable, Result, SpawnError};
