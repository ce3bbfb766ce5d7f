//! Dungeon-type content as the generator reads it: size, strategy, parameters, pools, curve.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::seed::{
    DUNGEON_DEPTH_PASS, DeterministicRng, WorldSeed, derive_floor_seed, derive_pass_seed,
};

pub const MIN_FLOOR_WIDTH: usize = 20;
pub const MIN_FLOOR_HEIGHT: usize = 15;
pub const MAX_FLOOR_DIMENSION: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonDefinition {
    pub id: String,
    #[serde(default)]
    pub floors: FloorRange,
    #[serde(default)]
    pub map_size: MapSize,
    #[serde(default = "default_generator")]
    pub generator: String,
    #[serde(default)]
    pub params: GenerationParams,
    #[serde(default)]
    pub enemy_pool: Vec<PoolEntry>,
    #[serde(default)]
    pub features: SpawnTable,
    #[serde(default)]
    pub hazards: SpawnTable,
    #[serde(default)]
    pub difficulty: DifficultyCurve,
}

fn default_generator() -> String {
    "rooms".to_string()
}

impl DungeonDefinition {
    pub fn new(id: impl Into<String>, generator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            floors: FloorRange::default(),
            map_size: MapSize::default(),
            generator: generator.into(),
            params: GenerationParams::default(),
            enemy_pool: Vec::new(),
            features: SpawnTable::default(),
            hazards: SpawnTable::default(),
            difficulty: DifficultyCurve::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Depth of this dungeon in the given world, drawn once from `floors`.
    pub fn floor_count(&self, world_seed: WorldSeed) -> u32 {
        let (min, max) = self.floors.normalized();
        let seed = derive_pass_seed(derive_floor_seed(world_seed, &self.id, 0), DUNGEON_DEPTH_PASS);
        let mut rng = DeterministicRng::new(seed);
        rng.range_inclusive_usize(min as usize, max as usize) as u32
    }

    pub fn is_final_floor(&self, floor_number: u32, world_seed: WorldSeed) -> bool {
        floor_number >= self.floor_count(world_seed)
    }
}

/// Inclusive floor range. Floors are numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRange {
    pub min: u32,
    pub max: u32,
}

impl FloorRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(self, floor_number: u32) -> bool {
        let (min, max) = self.normalized();
        (min..=max).contains(&floor_number)
    }

    fn normalized(self) -> (u32, u32) {
        let min = self.min.max(1);
        (min, self.max.max(min))
    }
}

impl Default for FloorRange {
    fn default() -> Self {
        Self { min: 1, max: u32::MAX }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSize {
    pub width: usize,
    pub height: usize,
    /// Tiles added to each dimension per floor below the first.
    pub growth_per_floor: usize,
    pub max_width: Option<usize>,
    pub max_height: Option<usize>,
}

impl MapSize {
    /// Dimensions for `floor_number`, never below 20×15.
    pub fn for_floor(&self, floor_number: u32) -> (usize, usize) {
        let growth = self.growth_per_floor.saturating_mul(floor_number.saturating_sub(1) as usize);
        let grow = |base: usize, limit: Option<usize>, minimum: usize| {
            base.saturating_add(growth)
                .min(limit.unwrap_or(MAX_FLOOR_DIMENSION))
                .min(MAX_FLOOR_DIMENSION)
                .max(minimum)
        };
        (
            grow(self.width, self.max_width, MIN_FLOOR_WIDTH),
            grow(self.height, self.max_height, MIN_FLOOR_HEIGHT),
        )
    }
}

impl Default for MapSize {
    fn default() -> Self {
        Self { width: 48, height: 32, growth_per_floor: 0, max_width: None, max_height: None }
    }
}

/// Knobs read by the layout strategies. Each strategy reads only the fields it understands and
/// substitutes its own default for anything absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub min_rooms: Option<usize>,
    pub max_rooms: Option<usize>,
    pub room_min_size: Option<usize>,
    pub room_max_size: Option<usize>,
    pub door_chance: Option<f64>,
    pub fill_probability: Option<f64>,
    pub smoothing_passes: Option<usize>,
    pub cell_size: Option<usize>,
    pub extra_connection_chance: Option<f64>,
    pub min_leaf_size: Option<usize>,
    pub max_depth: Option<usize>,
    pub wall_count: Option<usize>,
    pub ring_count: Option<usize>,
    pub ring_spacing: Option<usize>,
    pub symmetry_axis: Option<String>,
    pub walker_count: Option<usize>,
    pub walk_length: Option<usize>,
    pub turn_chance: Option<f64>,
}

/// One weighted entry in an enemy, feature, or hazard pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: String,
    #[serde(default)]
    pub floors: FloorRange,
    /// Falls back to the definition's `spawn_weight` stat, then to 1.
    #[serde(default)]
    pub weight: Option<u32>,
}

impl PoolEntry {
    pub fn new(id: impl Into<String>, floors: FloorRange, weight: u32) -> Self {
        Self { id: id.into(), floors, weight: Some(weight) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    pub min: usize,
    pub max: usize,
    pub entries: Vec<PoolEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    pub base_enemies: f64,
    pub enemies_per_floor: f64,
    pub max_enemies: usize,
    pub level_multiplier: f64,
}

impl DifficultyCurve {
    pub fn enemy_count(&self, floor_number: u32) -> usize {
        let depth = f64::from(floor_number.saturating_sub(1));
        let count = self.base_enemies + self.enemies_per_floor * depth;
        if !count.is_finite() || count <= 0.0 {
            return 0;
        }
        (count.round() as usize).min(self.max_enemies)
    }

    /// `floor_number × level_multiplier` truncated, at least 1.
    pub fn enemy_level(&self, floor_number: u32) -> u32 {
        let level = f64::from(floor_number) * self.level_multiplier;
        if !level.is_finite() || level < 1.0 {
            return 1;
        }
        level.trunc().min(f64::from(u32::MAX)) as u32
    }
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self { base_enemies: 4.0, enemies_per_floor: 1.0, max_enemies: 24, level_multiplier: 1.0 }
    }
}
