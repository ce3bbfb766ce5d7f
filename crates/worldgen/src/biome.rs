//! Biome classification from two coherent-noise layers plus an optional island falloff.
//! The field is immutable after construction; `classify` is a pure function of its inputs.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::config::{BiomeConfig, IslandConfig};
use crate::seed::{NOISE_ELEVATION_PASS, NOISE_MOISTURE_PASS, WorldSeed, derive_pass_seed};
use crate::types::{Rgb, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeId {
    DeepOcean,
    Ocean,
    Beach,
    Marsh,
    Desert,
    Grassland,
    Forest,
    Swamp,
    Savanna,
    Taiga,
    Jungle,
    Tundra,
    Mountain,
    SnowyPeak,
}

impl BiomeId {
    pub const fn is_water(self) -> bool {
        matches!(self, BiomeId::DeepOcean | BiomeId::Ocean)
    }

    pub const fn is_coastal(self) -> bool {
        matches!(self, BiomeId::Ocean | BiomeId::Beach)
    }

    pub const fn is_mountainous(self) -> bool {
        matches!(self, BiomeId::Mountain | BiomeId::SnowyPeak)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Value type describing one biome. Two biomes with the same id are interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Biome {
    pub id: BiomeId,
    pub base_tile_kind: TileKind,
    pub tree_density: f64,
    pub rock_density: f64,
    pub glyph: char,
    pub color: Rgb,
}

impl Biome {
    pub const fn of(id: BiomeId) -> Self {
        let (base_tile_kind, tree_density, rock_density, glyph, color) = match id {
            BiomeId::DeepOcean => (TileKind::DeepWater, 0.0, 0.0, '≈', Rgb(16, 32, 110)),
            BiomeId::Ocean => (TileKind::Water, 0.0, 0.0, '~', Rgb(36, 84, 176)),
            BiomeId::Beach => (TileKind::Sand, 0.02, 0.05, ':', Rgb(222, 206, 148)),
            BiomeId::Marsh => (TileKind::Mud, 0.1, 0.02, ';', Rgb(94, 110, 70)),
            BiomeId::Desert => (TileKind::Sand, 0.0, 0.15, ':', Rgb(230, 190, 120)),
            BiomeId::Grassland => (TileKind::Grass, 0.08, 0.05, '"', Rgb(96, 170, 72)),
            BiomeId::Forest => (TileKind::Grass, 0.55, 0.08, '"', Rgb(40, 120, 48)),
            BiomeId::Swamp => (TileKind::Mud, 0.35, 0.02, ';', Rgb(70, 96, 56)),
            BiomeId::Savanna => (TileKind::Dirt, 0.1, 0.1, ',', Rgb(176, 164, 84)),
            BiomeId::Taiga => (TileKind::Grass, 0.45, 0.15, '"', Rgb(60, 104, 84)),
            BiomeId::Jungle => (TileKind::Grass, 0.8, 0.03, '"', Rgb(24, 140, 40)),
            BiomeId::Tundra => (TileKind::Snow, 0.05, 0.2, '*', Rgb(200, 210, 220)),
            BiomeId::Mountain => (TileKind::Stone, 0.02, 0.45, '^', Rgb(128, 120, 112)),
            BiomeId::SnowyPeak => (TileKind::Snow, 0.0, 0.35, '^', Rgb(240, 244, 250)),
        };
        Self { id, base_tile_kind, tree_density, rock_density, glyph, color }
    }
}

/// Upper bounds (exclusive) of each elevation bucket except the last, which is open.
const ELEVATION_THRESHOLDS: [f64; 5] = [0.28, 0.38, 0.43, 0.62, 0.8];
const MOISTURE_THRESHOLDS: [f64; 3] = [0.3, 0.5, 0.7];

/// Rows are elevation buckets (low to high), columns moisture buckets (dry to wet).
const BIOME_MATRIX: [[BiomeId; 4]; 6] = [
    [BiomeId::DeepOcean; 4],
    [BiomeId::Ocean; 4],
    [BiomeId::Beach, BiomeId::Beach, BiomeId::Beach, BiomeId::Marsh],
    [BiomeId::Desert, BiomeId::Grassland, BiomeId::Forest, BiomeId::Swamp],
    [BiomeId::Savanna, BiomeId::Grassland, BiomeId::Taiga, BiomeId::Jungle],
    [BiomeId::Tundra, BiomeId::Mountain, BiomeId::Mountain, BiomeId::SnowyPeak],
];

pub fn matrix_biomes() -> impl Iterator<Item = BiomeId> {
    BIOME_MATRIX.into_iter().flatten()
}

fn bucket(value: f64, thresholds: &[f64]) -> usize {
    thresholds.iter().position(|&threshold| value < threshold).unwrap_or(thresholds.len())
}

/// Bucket lookup with indices clamped into the matrix.
pub fn lookup_biome(elevation: f64, moisture: f64) -> BiomeId {
    let row = bucket(elevation, &ELEVATION_THRESHOLDS).min(BIOME_MATRIX.len() - 1);
    let column = bucket(moisture, &MOISTURE_THRESHOLDS).min(BIOME_MATRIX[row].len() - 1);
    BIOME_MATRIX[row][column]
}

/// Raw climate values for one coordinate, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateSample {
    pub elevation: f64,
    pub moisture: f64,
}

pub struct BiomeField {
    config: BiomeConfig,
    elevation: Fbm<Perlin>,
    moisture: Fbm<Perlin>,
}

impl BiomeField {
    pub fn new(world_seed: WorldSeed, config: BiomeConfig) -> Self {
        let elevation_seed = derive_pass_seed(world_seed, NOISE_ELEVATION_PASS) as u32;
        let elevation = Fbm::<Perlin>::new(elevation_seed)
            .set_octaves(config.octaves.max(1))
            .set_frequency(config.elevation_frequency)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        let moisture_seed = derive_pass_seed(world_seed, NOISE_MOISTURE_PASS) as u32;
        let moisture = Fbm::<Perlin>::new(moisture_seed)
            .set_octaves(config.octaves.max(1))
            .set_frequency(config.moisture_frequency)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        Self { config, elevation, moisture }
    }

    pub fn config(&self) -> &BiomeConfig {
        &self.config
    }

    pub fn classify(&self, x: i32, y: i32) -> Biome {
        Biome::of(self.classify_id(x, y))
    }

    pub fn classify_id(&self, x: i32, y: i32) -> BiomeId {
        if let Some(island) = &self.config.island
            && island_distance(island, x, y) > 1.5
        {
            return BiomeId::DeepOcean;
        }
        let sample = self.sample(x, y);
        lookup_biome(sample.elevation, sample.moisture)
    }

    pub fn sample(&self, x: i32, y: i32) -> ClimateSample {
        let point = [f64::from(x), f64::from(y)];
        let mut elevation = normalize(self.elevation.get(point));
        let moisture = normalize(self.moisture.get(point));

        if self.config.elevation_power.is_finite() && self.config.elevation_power > 0.0 {
            elevation = elevation.powf(self.config.elevation_power);
        }
        if let Some(island) = &self.config.island {
            let falloff = island_distance(island, x, y).powf(island.falloff_exponent);
            elevation = (elevation - falloff).clamp(0.0, 1.0);
        }
        ClimateSample { elevation, moisture }
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        !self.classify_id(x, y).is_water()
    }
}

/// Distance from the island centre as a fraction of the radius.
fn island_distance(island: &IslandConfig, x: i32, y: i32) -> f64 {
    let dx = f64::from(x) - f64::from(island.center.x);
    let dy = f64::from(y) - f64::from(island.center.y);
    (dx * dx + dy * dy).sqrt() / island.radius
}

fn normalize(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.5;
    }
    ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Convenience form for callers that only hold a seed.
pub fn classify(x: i32, y: i32, world_seed: WorldSeed) -> Biome {
    BiomeField::new(world_seed, BiomeConfig::default()).classify(x, y)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lookup_clamps_out_of_range_samples() {
        assert_eq!(lookup_biome(-5.0, -5.0), BiomeId::DeepOcean);
        assert_eq!(lookup_biome(5.0, 5.0), BiomeId::SnowyPeak);
        assert_eq!(lookup_biome(f64::NAN, 0.5), BiomeId::Mountain);
    }

    #[test]
    fn far_outside_island_is_deep_ocean() {
        let field = BiomeField::new(42, BiomeConfig::default());
        for (x, y) in [(10_000, 0), (0, -10_000), (i32::MAX, i32::MIN), (i32::MIN, i32::MAX)] {
            assert_eq!(field.classify_id(x, y), BiomeId::DeepOcean);
        }
    }

    #[test]
    fn island_produces_both_land_and_water() {
        let field = BiomeField::new(1_000, BiomeConfig::default());
        let mut kinds = BTreeSet::new();
        for y in (-256..256).step_by(8) {
            for x in (-256..256).step_by(8) {
                kinds.insert(field.classify_id(x, y).is_water());
            }
        }
        assert_eq!(kinds.len(), 2, "island should contain land and water");
    }

    #[test]
    fn classify_is_pure() {
        let left = BiomeField::new(5, BiomeConfig::default());
        let right = BiomeField::new(5, BiomeConfig::default());
        for y in -50..50 {
            for x in -50..50 {
                assert_eq!(left.classify(x, y), right.classify(x, y));
            }
        }
    }

    #[test]
    fn higher_elevation_power_yields_more_water() {
        let count_water = |power: f64| {
            let config = BiomeConfig { elevation_power: power, ..BiomeConfig::default() };
            let field = BiomeField::new(17, config);
            let mut water = 0;
            for y in (-200..200).step_by(10) {
                for x in (-200..200).step_by(10) {
                    water += usize::from(field.classify_id(x, y).is_water());
                }
            }
            water
        };
        assert!(count_water(2.5) >= count_water(1.0));
    }

    proptest! {
        #[test]
        fn classify_always_returns_a_matrix_biome(
            seed in any::<u64>(),
            x in any::<i32>(),
            y in any::<i32>(),
            island in any::<bool>(),
        ) {
            let mut config = BiomeConfig::default();
            if !island {
                config.island = None;
            }
            let field = BiomeField::new(seed, config);
            let id = field.classify_id(x, y);
            prop_assert!(matrix_biomes().any(|known| known == id));
        }
    }
}
