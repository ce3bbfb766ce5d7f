//! World configuration: noise shaping, chunk streaming radii, and feature placement limits.
//! Every section has a default that yields a playable world, so a config file may be partial.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Pos;

pub const MAX_LOAD_RADIUS: u32 = 16;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub biome: BiomeConfig,
    pub streaming: StreamingConfig,
    pub placement: PlacementConfig,
}

impl WorldConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let streaming = &self.streaming;
        if streaming.load_radius > MAX_LOAD_RADIUS {
            return Err(ConfigError::InvalidChunkRadius {
                max: MAX_LOAD_RADIUS,
                actual: streaming.load_radius,
            });
        }
        if streaming.unload_radius < streaming.load_radius {
            return Err(ConfigError::InvalidRadius {
                load: streaming.load_radius,
                unload: streaming.unload_radius,
            });
        }
        if let Some(island) = &self.biome.island
            && (!island.radius.is_finite() || island.radius <= 0.0)
        {
            return Err(ConfigError::InvalidIsland(island.radius));
        }

        let placement = &self.placement;
        for (name, value) in [
            ("town_min_spacing", placement.town_min_spacing),
            ("entrance_min_spacing", placement.entrance_min_spacing),
            ("spawn_distance", placement.spawn_distance),
            ("fallback_island_radius", placement.fallback_island_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSpacing { name, value });
            }
        }
        if placement.near_town_min >= placement.near_town_max {
            return Err(ConfigError::InvalidNearTownBand {
                min: placement.near_town_min,
                max: placement.near_town_max,
            });
        }
        Ok(())
    }

    /// Island centre and radius used by the placement passes.
    pub fn island_bounds(&self) -> (Pos, f64) {
        match &self.biome.island {
            Some(island) => (island.center, island.radius),
            None => (Pos::new(0, 0), self.placement.fallback_island_radius),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    pub elevation_frequency: f64,
    pub moisture_frequency: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Exponent applied to normalised elevation; above 1 biases toward ocean, below 1 toward peaks.
    pub elevation_power: f64,
    pub island: Option<IslandConfig>,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            elevation_frequency: 0.012,
            moisture_frequency: 0.018,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            elevation_power: 1.0,
            island: Some(IslandConfig::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    pub center: Pos,
    pub radius: f64,
    pub falloff_exponent: f64,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self { center: Pos::new(0, 0), radius: 256.0, falloff_exponent: 2.2 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub load_radius: u32,
    pub unload_radius: u32,
    /// Multiplier on a biome's tree density giving the per-tile tree probability.
    pub tree_scale: f64,
    pub rock_scale: f64,
    /// Chance that a rock rolled in a mountain biome is an ore vein instead.
    pub ore_chance: f64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: 2,
            unload_radius: 3,
            tree_scale: 0.35,
            rock_scale: 0.12,
            ore_chance: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub town_min_spacing: f64,
    pub entrance_min_spacing: f64,
    pub wilderness_min_town_distance: f64,
    pub near_town_min: f64,
    pub near_town_max: f64,
    pub town_attempts: u32,
    /// Failed attempts after which secondary towns accept any land biome.
    pub relax_after: u32,
    pub entrance_attempts: u32,
    pub coastal_radius: i32,
    pub spawn_distance: f64,
    pub spiral_step: i32,
    /// Search radius used when the biome field has no island configured.
    pub fallback_island_radius: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            town_min_spacing: 60.0,
            entrance_min_spacing: 24.0,
            wilderness_min_town_distance: 70.0,
            near_town_min: 20.0,
            near_town_max: 60.0,
            town_attempts: 400,
            relax_after: 250,
            entrance_attempts: 300,
            coastal_radius: 10,
            spawn_distance: 8.0,
            spiral_step: 2,
            fallback_island_radius: 256.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        WorldConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let config = WorldConfig::from_toml_str(
            r#"
            [streaming]
            load_radius = 1
            unload_radius = 4

            [biome.island]
            radius = 128.0
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.streaming.load_radius, 1);
        assert_eq!(config.streaming.unload_radius, 4);
        assert_eq!(config.placement, PlacementConfig::default());
        let island = config.biome.island.expect("island section present");
        assert_eq!(island.radius, 128.0);
        assert_eq!(island.falloff_exponent, IslandConfig::default().falloff_exponent);
    }

    #[test]
    fn unload_radius_below_load_radius_is_rejected() {
        let error = WorldConfig::from_toml_str(
            r#"
            [streaming]
            load_radius = 3
            unload_radius = 2
            "#,
        )
        .expect_err("hysteresis band must not be negative");
        assert!(matches!(error, ConfigError::InvalidRadius { load: 3, unload: 2 }));
    }

    #[test]
    fn malformed_toml_surfaces_parse_error() {
        let error = WorldConfig::from_toml_str("[streaming\nload_radius = ")
            .expect_err("broken toml should fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn island_bounds_fall_back_when_island_mode_is_off() {
        let mut config = WorldConfig::default();
        config.biome.island = None;
        let (center, radius) = config.island_bounds();
        assert_eq!(center, Pos::new(0, 0));
        assert_eq!(radius, config.placement.fallback_island_radius);
    }
}
