//! Errors surfaced while loading configuration and content definitions.
//! Generation itself never fails; it recovers locally and logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to parse content definitions: {0}")]
    Content(#[from] serde_json::Error),

    #[error("unload radius {unload} must be at least the load radius {load}")]
    InvalidRadius { load: u32, unload: u32 },

    #[error("chunk load radius must be at most {max}, got {actual}")]
    InvalidChunkRadius { max: u32, actual: u32 },

    #[error("island radius must be positive and finite, got {0}")]
    InvalidIsland(f64),

    #[error("{name} must be positive, got {value}")]
    InvalidSpacing { name: &'static str, value: f64 },

    #[error("near-town band is empty: min {min} >= max {max}")]
    InvalidNearTownBand { min: f64, max: f64 },
}
