//! Instanced dungeon floors: content definitions, the shared floor pipeline, and the layout
//! strategies selected by name.

mod definition;
mod factory;
mod grid;
mod model;
mod pipeline;
mod spawns;
mod strategies;

pub use definition::{
    DifficultyCurve, DungeonDefinition, FloorRange, GenerationParams, MAX_FLOOR_DIMENSION,
    MIN_FLOOR_HEIGHT, MIN_FLOOR_WIDTH, MapSize, PoolEntry, SpawnTable,
};
pub use factory::{
    FALLBACK_GENERATOR, GeneratorRegistry, StrategyConstructor, create_generator, generate_floor,
};
pub use grid::{Grid, Rect};
pub use model::{FloorMap, SpawnIntent, SpawnKind};
pub use pipeline::{CarveHints, FloorGenerator};
pub use strategies::{
    BspRooms, CellularCaves, CircularFloor, ConcentricRings, GridTunnels, RectangularRooms,
    SymmetricLayout, WindingTunnels, symmetry_center,
};
