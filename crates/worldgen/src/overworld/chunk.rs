//! Chunk coordinates, chunk contents, and the pure per-chunk generation pass.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::biome::BiomeField;
use crate::config::StreamingConfig;
use crate::seed::{DeterministicRng, WorldSeed, derive_chunk_seed};
use crate::types::{Pos, Tile};

pub const CHUNK_SIZE: i32 = 32;
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Chunk coordinates whose every tile has an `i32` world position.
pub const MIN_CHUNK: i32 = i32::MIN / CHUNK_SIZE;
pub const MAX_CHUNK: i32 = i32::MAX / CHUNK_SIZE;

const fn clamp_chunk(value: i32) -> i32 {
    if value < MIN_CHUNK {
        MIN_CHUNK
    } else if value > MAX_CHUNK {
        MAX_CHUNK
    } else {
        value
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// Clamped into `MIN_CHUNK..=MAX_CHUNK` on both axes.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x: clamp_chunk(x), y: clamp_chunk(y) }
    }

    pub fn containing(pos: Pos) -> Self {
        Self { x: pos.x.div_euclid(CHUNK_SIZE), y: pos.y.div_euclid(CHUNK_SIZE) }
    }

    pub fn origin(self) -> Pos {
        Pos { y: clamp_chunk(self.y) * CHUNK_SIZE, x: clamp_chunk(self.x) * CHUNK_SIZE }
    }

    pub fn chebyshev(self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Offset of `pos` inside whichever chunk contains it.
    pub fn local_offset(pos: Pos) -> (usize, usize) {
        (pos.x.rem_euclid(CHUNK_SIZE) as usize, pos.y.rem_euclid(CHUNK_SIZE) as usize)
    }

    /// Offset of `pos` inside this chunk, or `None` if it lies elsewhere.
    pub fn local(self, pos: Pos) -> Option<(usize, usize)> {
        if ChunkCoord::containing(pos) != self {
            return None;
        }
        let origin = self.origin();
        Some((pos.x.abs_diff(origin.x) as usize, pos.y.abs_diff(origin.y) as usize))
    }

    /// Every coordinate within `radius` (Chebyshev) of `self`, row-major.
    pub fn square(self, radius: u32) -> Vec<ChunkCoord> {
        let radius = radius as i32;
        let mut coords = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                coords.push(ChunkCoord::new(self.x.saturating_add(dx), self.y.saturating_add(dy)));
            }
        }
        coords.sort();
        coords.dedup();
        coords
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tree,
    Rock,
    OreVein,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceInstance {
    pub kind: ResourceKind,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub seed: u64,
    pub loaded: bool,
    tiles: Vec<Tile>,
    resources: Vec<ResourceInstance>,
}

impl Chunk {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn resources(&self) -> &[ResourceInstance] {
        &self.resources
    }

    pub fn local_tile(&self, local_x: usize, local_y: usize) -> Tile {
        self.tiles[local_y * CHUNK_SIZE as usize + local_x]
    }

    pub fn tile_at(&self, pos: Pos) -> Option<Tile> {
        let (local_x, local_y) = self.coord.local(pos)?;
        Some(self.local_tile(local_x, local_y))
    }

    pub(super) fn set_tile(&mut self, pos: Pos, tile: Tile) -> bool {
        let Some((local_x, local_y)) = self.coord.local(pos) else {
            return false;
        };
        self.tiles[local_y * CHUNK_SIZE as usize + local_x] = tile;
        true
    }

    pub fn resource_at(&self, pos: Pos) -> Option<ResourceInstance> {
        self.resources.iter().find(|resource| resource.pos == pos).copied()
    }

    pub(super) fn remove_resource(&mut self, pos: Pos) -> Option<ResourceInstance> {
        let index = self.resources.iter().position(|resource| resource.pos == pos)?;
        Some(self.resources.remove(index))
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(16 + CHUNK_AREA * 8 + self.resources.len() * 9);
        bytes.extend(self.coord.x.to_le_bytes());
        bytes.extend(self.coord.y.to_le_bytes());
        bytes.extend(self.seed.to_le_bytes());
        for tile in &self.tiles {
            bytes.push(tile.kind.code());
            bytes.push(u8::from(tile.walkable) | (u8::from(tile.transparent) << 1));
            bytes.extend(u32::from(tile.glyph).to_le_bytes());
            bytes.extend([tile.color.0, tile.color.1, tile.color.2]);
        }
        bytes.extend((self.resources.len() as u32).to_le_bytes());
        for resource in &self.resources {
            bytes.push(resource.kind as u8);
            bytes.extend(resource.pos.y.to_le_bytes());
            bytes.extend(resource.pos.x.to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write(&self.canonical_bytes());
        hasher.finish()
    }
}

/// Builds the base chunk for `coord`. Reads nothing but its arguments, so generation order
/// across chunks never changes the result.
pub fn generate_chunk(
    coord: ChunkCoord,
    world_seed: WorldSeed,
    field: &BiomeField,
    config: &StreamingConfig,
) -> Chunk {
    let seed = derive_chunk_seed(world_seed, coord.x, coord.y);
    let mut rng = DeterministicRng::new(seed);
    let origin = coord.origin();

    let mut tiles = Vec::with_capacity(CHUNK_AREA);
    let mut resources = Vec::new();
    for local_y in 0..CHUNK_SIZE {
        for local_x in 0..CHUNK_SIZE {
            let pos = origin.offset(local_x, local_y);
            let biome = field.classify(pos.x, pos.y);
            tiles.push(Tile::with_look(biome.base_tile_kind, biome.glyph, biome.color));

            // Both rolls are drawn for every tile so the stream position depends only on the index.
            let roll = rng.next_f64();
            let ore_roll = rng.next_f64();
            if biome.id.is_water() {
                continue;
            }
            let tree_chance = biome.tree_density * config.tree_scale;
            let rock_chance = biome.rock_density * config.rock_scale;
            let kind = if roll < tree_chance {
                Some(ResourceKind::Tree)
            } else if roll < tree_chance + rock_chance {
                if biome.id.is_mountainous() && ore_roll < config.ore_chance {
                    Some(ResourceKind::OreVein)
                } else {
                    Some(ResourceKind::Rock)
                }
            } else {
                None
            };
            if let Some(kind) = kind {
                resources.push(ResourceInstance { kind, pos });
            }
        }
    }

    Chunk { coord, seed, loaded: false, tiles, resources }
}
