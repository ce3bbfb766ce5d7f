//! Sparse record of player-caused changes layered over deterministic base chunks.
//! Only harvests and structure placements are kept; base terrain is always regenerated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chunk::{Chunk, ChunkCoord};
use crate::types::{Pos, Tile, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Harvested,
    Structure(TileKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEntry {
    pub pos: Pos,
    pub mutation: Mutation,
}

/// What the save layer persists for one chunk: enough to rebuild it exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub seed: u64,
    pub mutations: Vec<MutationEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationDelta {
    by_chunk: BTreeMap<ChunkCoord, BTreeMap<Pos, Mutation>>,
}

impl MutationDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_chunk.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_chunk.values().map(BTreeMap::len).sum()
    }

    /// A structure always wins over a harvest at the same position; it clears the resource too.
    pub fn record(&mut self, pos: Pos, mutation: Mutation) {
        let entries = self.by_chunk.entry(ChunkCoord::containing(pos)).or_default();
        match (entries.get(&pos), mutation) {
            (Some(Mutation::Structure(_)), Mutation::Harvested) => {}
            _ => {
                entries.insert(pos, mutation);
            }
        }
    }

    pub fn get(&self, pos: Pos) -> Option<Mutation> {
        self.by_chunk.get(&ChunkCoord::containing(pos))?.get(&pos).copied()
    }

    pub fn entries_in(&self, coord: ChunkCoord) -> Vec<MutationEntry> {
        self.by_chunk
            .get(&coord)
            .map(|entries| {
                entries.iter().map(|(&pos, &mutation)| MutationEntry { pos, mutation }).collect()
            })
            .unwrap_or_default()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.by_chunk.keys().copied()
    }

    pub fn apply_to(&self, chunk: &mut Chunk) {
        let Some(entries) = self.by_chunk.get(&chunk.coord) else {
            return;
        };
        for (&pos, &mutation) in entries {
            apply_mutation(chunk, pos, mutation);
        }
    }
}

pub(super) fn apply_mutation(chunk: &mut Chunk, pos: Pos, mutation: Mutation) {
    match mutation {
        Mutation::Harvested => {
            chunk.remove_resource(pos);
        }
        Mutation::Structure(kind) => {
            chunk.remove_resource(pos);
            chunk.set_tile(pos, Tile::of(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_is_not_downgraded_by_later_harvest() {
        let mut delta = MutationDelta::new();
        let pos = Pos::new(5, -7);
        delta.record(pos, Mutation::Structure(TileKind::Structure));
        delta.record(pos, Mutation::Harvested);
        assert_eq!(delta.get(pos), Some(Mutation::Structure(TileKind::Structure)));
        assert_eq!(delta.len(), 1);
    }

    #[test]
    fn entries_are_grouped_by_containing_chunk() {
        let mut delta = MutationDelta::new();
        delta.record(Pos::new(1, 1), Mutation::Harvested);
        delta.record(Pos::new(40, 1), Mutation::Harvested);
        delta.record(Pos::new(-1, 1), Mutation::Harvested);
        assert_eq!(delta.entries_in(ChunkCoord::new(0, 0)).len(), 1);
        assert_eq!(delta.entries_in(ChunkCoord::new(1, 0)).len(), 1);
        assert_eq!(delta.entries_in(ChunkCoord::new(-1, 0)).len(), 1);
        assert_eq!(delta.coords().count(), 3);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = ChunkSnapshot {
            coord: ChunkCoord::new(2, 3),
            seed: 99,
            mutations: vec![MutationEntry {
                pos: Pos::new(70, 100),
                mutation: Mutation::Structure(TileKind::Structure),
            }],
        };
        let json = serde_json::to_string(&snapshot).expect("snapshot should serialize");
        let restored: ChunkSnapshot = serde_json::from_str(&json).expect("and deserialize");
        assert_eq!(restored, snapshot);
    }
}
