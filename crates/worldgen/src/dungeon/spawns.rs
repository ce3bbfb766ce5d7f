//! Enemy, feature, and hazard spawn selection shared by every layout strategy.

use tracing::{debug, warn};

use crate::content::{DefinitionLookup, stats};
use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::definition::{DungeonDefinition, PoolEntry};
use super::grid::Grid;
use super::model::{SpawnIntent, SpawnKind};

pub(super) struct SpawnContext<'a> {
    pub(super) definition: &'a DungeonDefinition,
    pub(super) floor_number: u32,
    pub(super) grid: &'a Grid,
    pub(super) entry: Pos,
    pub(super) lookup: Option<&'a dyn DefinitionLookup>,
}

/// Entries usable on this floor, each paired with its resolved weight.
pub(super) struct ResolvedPool<'a> {
    entries: Vec<&'a PoolEntry>,
    weights: Vec<u32>,
}

impl<'a> ResolvedPool<'a> {
    pub(super) fn resolve(
        kind: SpawnKind,
        pool: &'a [PoolEntry],
        floor_number: u32,
        lookup: Option<&dyn DefinitionLookup>,
    ) -> Self {
        let mut entries = Vec::new();
        let mut weights = Vec::new();
        for entry in pool.iter().filter(|entry| entry.floors.contains(floor_number)) {
            let definition = match lookup {
                Some(lookup) => match lookup.get_definition(kind.definition_kind(), &entry.id) {
                    Some(definition) => Some(definition),
                    None => {
                        warn!(kind = ?kind, id = %entry.id, "unknown spawn id; skipping");
                        continue;
                    }
                },
                None => None,
            };
            let weight = entry.weight.unwrap_or_else(|| {
                definition
                    .and_then(|block| block.stat(stats::SPAWN_WEIGHT))
                    .filter(|weight| weight.is_finite() && *weight >= 0.0)
                    .map_or(1, |weight| weight.round().min(f64::from(u32::MAX)) as u32)
            });
            if weight == 0 {
                continue;
            }
            entries.push(entry);
            weights.push(weight);
        }
        Self { entries, weights }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn pick(&self, rng: &mut DeterministicRng) -> Option<&'a PoolEntry> {
        rng.weighted_index(&self.weights).map(|index| self.entries[index])
    }
}

/// Plain floor tiles outside the entry sanctuary, shuffled with the floor stream.
fn spawn_candidates(context: &SpawnContext<'_>, rng: &mut DeterministicRng) -> Vec<Pos> {
    let mut candidates: Vec<Pos> = context
        .grid
        .positions()
        .filter(|&pos| context.grid.get(pos) == TileKind::Floor)
        .filter(|&pos| pos.manhattan(context.entry) > 1)
        .collect();
    rng.shuffle(&mut candidates);
    candidates
}

pub(super) fn generate_spawns(
    context: &SpawnContext<'_>,
    rng: &mut DeterministicRng,
) -> Vec<SpawnIntent> {
    let definition = context.definition;
    let floor_number = context.floor_number;
    let mut candidates = spawn_candidates(context, rng).into_iter();
    let mut spawns = Vec::new();

    let enemy_pool = ResolvedPool::resolve(
        SpawnKind::Enemy,
        &definition.enemy_pool,
        floor_number,
        context.lookup,
    );
    if enemy_pool.is_empty() {
        debug!(dungeon = %definition.id, floor = floor_number, "no enemy pool entry for floor");
    } else {
        let level = definition.difficulty.enemy_level(floor_number);
        for _ in 0..definition.difficulty.enemy_count(floor_number) {
            let Some(entry) = enemy_pool.pick(rng) else { break };
            let Some(pos) = candidates.next() else { break };
            spawns.push(SpawnIntent {
                kind: SpawnKind::Enemy,
                id: entry.id.clone(),
                pos,
                level: Some(level),
            });
        }
    }

    let tables = [
        (SpawnKind::Feature, &definition.features),
        (SpawnKind::Hazard, &definition.hazards),
    ];
    for (kind, table) in tables {
        let pool = ResolvedPool::resolve(kind, &table.entries, floor_number, context.lookup);
        if pool.is_empty() {
            debug!(dungeon = %definition.id, floor = floor_number, ?kind, "empty pool for floor");
            continue;
        }
        let count = rng.range_inclusive_usize(table.min.min(table.max), table.max.max(table.min));
        for _ in 0..count {
            let Some(entry) = pool.pick(rng) else { break };
            let Some(pos) = candidates.next() else { break };
            spawns.push(SpawnIntent { kind, id: entry.id.clone(), pos, level: None });
        }
    }

    spawns
}
