//! Deterministic world generation: a biome field, a streamed chunk overworld, one-shot
//! town and dungeon placement, and instanced dungeon floors from pluggable layout strategies.
//!
//! Every entry point takes its seed explicitly; nothing here keeps global RNG state.

pub mod biome;
pub mod config;
pub mod content;
pub mod dungeon;
pub mod error;
pub mod overworld;
pub mod placement;
pub mod seed;
pub mod types;

pub use biome::{Biome, BiomeField, BiomeId};
pub use config::WorldConfig;
pub use content::{ContentRegistry, DefinitionKind, DefinitionLookup, StatBlock};
pub use dungeon::{DungeonDefinition, FloorGenerator, FloorMap, GeneratorRegistry, SpawnIntent};
pub use error::ConfigError;
pub use overworld::{Chunk, ChunkCoord, ChunkStreamer};
pub use placement::{FeaturePlacer, WorldLayout};
pub use seed::{DeterministicRng, WorldSeed};
pub use types::{Pos, Tile, TileKind};
