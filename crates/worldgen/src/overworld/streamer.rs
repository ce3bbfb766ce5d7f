//! The overworld's finite window onto an unbounded chunk grid.
//! All load/evict transitions go through `update_reference`; tile queries outside the window
//! generate the chunk on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::chunk::{Chunk, ChunkCoord, ResourceInstance, generate_chunk};
use super::delta::{ChunkSnapshot, Mutation, MutationDelta, apply_mutation};
use crate::biome::BiomeField;
use crate::config::{BiomeConfig, StreamingConfig};
use crate::seed::{WorldSeed, derive_chunk_seed};
use crate::types::{Pos, Tile, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Unloaded,
    Loaded,
}

/// Transitions caused by one reference update, each list sorted by coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamUpdate {
    pub center: ChunkCoord,
    pub loaded: Vec<ChunkCoord>,
    pub evicted: Vec<ChunkCoord>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    pub generated: u64,
    pub evicted: u64,
    /// Chunks generated by a tile query rather than by a reference update.
    pub on_demand: u64,
}

pub struct ChunkStreamer {
    world_seed: WorldSeed,
    config: StreamingConfig,
    field: BiomeField,
    chunks: BTreeMap<ChunkCoord, Chunk>,
    delta: MutationDelta,
    reference: Option<ChunkCoord>,
    stats: StreamStats,
}

impl ChunkStreamer {
    pub fn new(world_seed: WorldSeed, biome: BiomeConfig, config: StreamingConfig) -> Self {
        debug_assert!(config.unload_radius >= config.load_radius);
        Self {
            world_seed,
            config,
            field: BiomeField::new(world_seed, biome),
            chunks: BTreeMap::new(),
            delta: MutationDelta::new(),
            reference: None,
            stats: StreamStats::default(),
        }
    }

    pub fn world_seed(&self) -> WorldSeed {
        self.world_seed
    }

    pub fn field(&self) -> &BiomeField {
        &self.field
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn reference(&self) -> Option<ChunkCoord> {
        self.reference
    }

    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        if self.chunks.contains_key(&coord) { ChunkState::Loaded } else { ChunkState::Unloaded }
    }

    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Moves the reference point. Chunks within `load_radius` are materialised; loaded chunks
    /// beyond `unload_radius` are dropped. Chunks in between keep their current state.
    pub fn update_reference(&mut self, pos: Pos) -> StreamUpdate {
        let center = ChunkCoord::containing(pos);
        let mut update = StreamUpdate { center, ..StreamUpdate::default() };
        if self.reference != Some(center) {
            debug!(x = center.x, y = center.y, "stream reference moved");
        }
        self.reference = Some(center);

        let unload_radius = self.config.unload_radius;
        let evicted: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|coord| coord.chebyshev(center) > unload_radius)
            .collect();
        for coord in evicted {
            self.chunks.remove(&coord);
            self.stats.evicted += 1;
            trace!(x = coord.x, y = coord.y, "chunk evicted");
            update.evicted.push(coord);
        }

        for coord in center.square(self.config.load_radius) {
            if self.chunks.contains_key(&coord) {
                continue;
            }
            self.load(coord);
            update.loaded.push(coord);
        }

        if !update.loaded.is_empty() || !update.evicted.is_empty() {
            debug!(
                loaded = update.loaded.len(),
                evicted = update.evicted.len(),
                resident = self.chunks.len(),
                "stream window updated"
            );
        }
        update
    }

    /// Never reports missing terrain: an unloaded chunk is generated and kept resident.
    pub fn tile_at(&mut self, pos: Pos) -> Tile {
        let (local_x, local_y) = ChunkCoord::local_offset(pos);
        self.ensure(ChunkCoord::containing(pos)).local_tile(local_x, local_y)
    }

    pub fn resource_at(&mut self, pos: Pos) -> Option<ResourceInstance> {
        self.ensure(ChunkCoord::containing(pos)).resource_at(pos)
    }

    /// Removes the resource at `pos` and remembers the removal across reloads.
    pub fn harvest(&mut self, pos: Pos) -> Option<ResourceInstance> {
        let removed = self.ensure(ChunkCoord::containing(pos)).remove_resource(pos)?;
        self.delta.record(pos, Mutation::Harvested);
        Some(removed)
    }

    /// Replaces the tile at `pos`; any resource there is cleared.
    pub fn place_structure(&mut self, pos: Pos, kind: TileKind) {
        let mutation = Mutation::Structure(kind);
        apply_mutation(self.ensure(ChunkCoord::containing(pos)), pos, mutation);
        self.delta.record(pos, mutation);
    }

    pub fn delta(&self) -> &MutationDelta {
        &self.delta
    }

    pub fn snapshot(&self, coord: ChunkCoord) -> ChunkSnapshot {
        ChunkSnapshot {
            coord,
            seed: derive_chunk_seed(self.world_seed, coord.x, coord.y),
            mutations: self.delta.entries_in(coord),
        }
    }

    /// One snapshot per chunk that carries at least one mutation, loaded or not.
    pub fn export_mutations(&self) -> Vec<ChunkSnapshot> {
        self.delta.coords().map(|coord| self.snapshot(coord)).collect()
    }

    pub fn import_mutations(&mut self, snapshots: &[ChunkSnapshot]) {
        for snapshot in snapshots {
            for entry in &snapshot.mutations {
                self.delta.record(entry.pos, entry.mutation);
                if let Some(chunk) = self.chunks.get_mut(&ChunkCoord::containing(entry.pos)) {
                    apply_mutation(chunk, entry.pos, entry.mutation);
                }
            }
        }
    }

    fn ensure(&mut self, coord: ChunkCoord) -> &mut Chunk {
        if !self.chunks.contains_key(&coord) {
            self.stats.on_demand += 1;
            trace!(x = coord.x, y = coord.y, "chunk generated on demand");
        }
        self.chunks.entry(coord).or_insert_with(|| {
            let (field, config, delta) = (&self.field, &self.config, &self.delta);
            materialize(coord, self.world_seed, field, config, delta, &mut self.stats)
        })
    }

    fn load(&mut self, coord: ChunkCoord) {
        let (field, config, delta) = (&self.field, &self.config, &self.delta);
        let chunk = materialize(coord, self.world_seed, field, config, delta, &mut self.stats);
        trace!(x = coord.x, y = coord.y, resources = chunk.resources().len(), "chunk loaded");
        self.chunks.insert(coord, chunk);
    }
}

/// Base generation, then the delta on top.
fn materialize(
    coord: ChunkCoord,
    world_seed: WorldSeed,
    field: &BiomeField,
    config: &StreamingConfig,
    delta: &MutationDelta,
    stats: &mut StreamStats,
) -> Chunk {
    let mut chunk = generate_chunk(coord, world_seed, field, config);
    delta.apply_to(&mut chunk);
    chunk.loaded = true;
    stats.generated += 1;
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overworld::chunk::CHUNK_SIZE;

    fn streamer(seed: u64) -> ChunkStreamer {
        ChunkStreamer::new(seed, BiomeConfig::default(), StreamingConfig::default())
    }

    #[test]
    fn reference_update_loads_square_window() {
        let mut streamer = streamer(42);
        let update = streamer.update_reference(Pos::new(5, 5));
        assert_eq!(update.center, ChunkCoord::new(0, 0));
        assert_eq!(update.loaded.len(), 25);
        assert!(update.evicted.is_empty());
        assert_eq!(streamer.loaded_count(), 25);
        assert!(streamer.chunk(ChunkCoord::new(2, -2)).is_some_and(|chunk| chunk.loaded));
        assert_eq!(streamer.state(ChunkCoord::new(3, 0)), ChunkState::Unloaded);
    }

    #[test]
    fn repeated_reference_reports_only_the_center() {
        let mut streamer = streamer(7);
        streamer.update_reference(Pos::new(-40, 70));
        let update = streamer.update_reference(Pos::new(-33, 64));
        let expected = StreamUpdate { center: ChunkCoord::new(-2, 2), ..StreamUpdate::default() };
        assert_eq!(update, expected);
        assert_eq!(StreamUpdate::default().center, ChunkCoord::new(0, 0));
    }

    #[test]
    fn hysteresis_band_keeps_boundary_chunks() {
        let mut streamer = streamer(42);
        streamer.update_reference(Pos::new(0, 0));
        // One chunk east: column -2 is now at distance 3, inside the unload radius.
        let update = streamer.update_reference(Pos::new(CHUNK_SIZE, 0));
        assert!(update.evicted.is_empty());
        assert_eq!(update.loaded.len(), 5);
        assert_eq!(streamer.state(ChunkCoord::new(-2, 0)), ChunkState::Loaded);

        // Back again: nothing to load, nothing to evict.
        let update = streamer.update_reference(Pos::new(0, 0));
        assert!(update.loaded.is_empty());
        assert!(update.evicted.is_empty());

        let update = streamer.update_reference(Pos::new(CHUNK_SIZE * 2, 0));
        assert_eq!(update.evicted.len(), 5);
        assert!(update.evicted.iter().all(|coord| coord.x == -2));
    }

    #[test]
    fn tile_query_outside_window_generates_on_demand() {
        let mut streamer = streamer(7);
        let far = Pos::new(CHUNK_SIZE * 40, -CHUNK_SIZE * 40);
        let tile = streamer.tile_at(far);
        assert_eq!(tile.kind, TileKind::DeepWater);
        assert_eq!(streamer.stats().on_demand, 1);
        assert_eq!(streamer.state(ChunkCoord::containing(far)), ChunkState::Loaded);
    }

    #[test]
    fn harvest_survives_eviction_and_reload() {
        let mut streamer = streamer(42);
        streamer.update_reference(Pos::new(0, 0));
        let resource = streamer
            .loaded_coords()
            .filter_map(|coord| streamer.chunk(coord))
            .flat_map(|chunk| chunk.resources().iter().copied())
            .next()
            .expect("the starting window should hold at least one resource");

        assert_eq!(streamer.harvest(resource.pos), Some(resource));
        assert_eq!(streamer.harvest(resource.pos), None);

        let coord = ChunkCoord::containing(resource.pos);
        streamer.update_reference(Pos::new(CHUNK_SIZE * 100, 0));
        assert_eq!(streamer.state(coord), ChunkState::Unloaded);
        streamer.update_reference(Pos::new(0, 0));
        assert_eq!(streamer.resource_at(resource.pos), None);
        assert_eq!(streamer.snapshot(coord).mutations.len(), 1);
    }

    #[test]
    fn structure_replaces_tile_and_clears_resource() {
        let mut streamer = streamer(3);
        let pos = Pos::new(4, 4);
        streamer.place_structure(pos, TileKind::Structure);
        assert_eq!(streamer.tile_at(pos).kind, TileKind::Structure);
        assert_eq!(streamer.resource_at(pos), None);
        assert!(!streamer.tile_at(pos).walkable);
    }

    #[test]
    fn imported_mutations_apply_to_resident_chunks() {
        let mut source = streamer(11);
        source.place_structure(Pos::new(1, 1), TileKind::Structure);
        source.place_structure(Pos::new(-40, 90), TileKind::Floor);
        let exported = source.export_mutations();
        assert_eq!(exported.len(), 2);

        let mut target = streamer(11);
        target.update_reference(Pos::new(0, 0));
        target.import_mutations(&exported);
        assert_eq!(target.tile_at(Pos::new(1, 1)).kind, TileKind::Structure);
        assert_eq!(target.tile_at(Pos::new(-40, 90)).kind, TileKind::Floor);
        assert_eq!(target.export_mutations(), exported);
    }
}
