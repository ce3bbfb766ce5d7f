//! The four-phase floor pipeline every strategy runs through: seed, fill, carve, populate.

use tracing::debug;

use crate::content::DefinitionLookup;
use crate::seed::{DeterministicRng, WorldSeed, derive_floor_seed};
use crate::types::{Pos, TileKind};

use super::definition::{DungeonDefinition, GenerationParams};
use super::grid::{Grid, Rect};
use super::model::FloorMap;
use super::spawns::{SpawnContext, generate_spawns};

/// Where a strategy would like the stairs. The pipeline snaps both to reachable tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarveHints {
    pub entry: Pos,
    pub exit: Option<Pos>,
}

impl CarveHints {
    pub fn entry(entry: Pos) -> Self {
        Self { entry, exit: None }
    }
}

pub trait FloorGenerator {
    fn name(&self) -> &'static str;

    fn initial_fill(&self) -> TileKind {
        TileKind::Wall
    }

    /// Lays out the floor. The grid arrives filled with `initial_fill`; its border is
    /// resealed afterwards, so strategies may ignore it.
    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints;

    fn generate_floor(
        &self,
        definition: &DungeonDefinition,
        floor_number: u32,
        world_seed: WorldSeed,
    ) -> FloorMap {
        build_floor(self, definition, floor_number, world_seed, None)
    }

    fn generate_floor_with(
        &self,
        definition: &DungeonDefinition,
        floor_number: u32,
        world_seed: WorldSeed,
        lookup: Option<&dyn DefinitionLookup>,
    ) -> FloorMap {
        build_floor(self, definition, floor_number, world_seed, lookup)
    }
}

fn build_floor<G: FloorGenerator + ?Sized>(
    generator: &G,
    definition: &DungeonDefinition,
    floor_number: u32,
    world_seed: WorldSeed,
    lookup: Option<&dyn DefinitionLookup>,
) -> FloorMap {
    let floor_number = floor_number.max(1);
    let floor_seed = derive_floor_seed(world_seed, &definition.id, floor_number);
    let mut rng = DeterministicRng::new(floor_seed);
    let (width, height) = definition.map_size.for_floor(floor_number);

    let mut grid = Grid::filled(width, height, generator.initial_fill());
    let hints = generator.carve(&mut grid, &mut rng, &definition.params);
    grid.seal_border();

    let entry = match grid.nearest_walkable(hints.entry) {
        Some(entry) => entry,
        None => {
            debug!(generator = generator.name(), "layout carved nothing; opening a chamber");
            carve_rescue_chamber(&mut grid)
        }
    };
    let sealed = grid.retain_region(entry);
    if sealed > 0 {
        debug!(generator = generator.name(), sealed, "sealed unreachable pockets");
    }
    if grid.walkable_count() < 2
        && let Some(next) = entry.neighbors().into_iter().find(|&next| grid.is_interior(next))
    {
        grid.carve(next);
    }

    let stairs_down = hints
        .exit
        .filter(|&exit| exit != entry && grid.is_walkable(exit))
        .unwrap_or_else(|| grid.farthest_from(entry));
    let stairs_up = (floor_number > 1).then_some(entry);
    if let Some(up) = stairs_up {
        grid.set(up, TileKind::StairsUp);
    }
    grid.set(stairs_down, TileKind::StairsDown);

    debug_assert_eq!(grid.tiles().iter().filter(|&&tile| tile == TileKind::StairsDown).count(), 1);
    debug_assert_eq!(
        grid.tiles().iter().filter(|&&tile| tile == TileKind::StairsUp).count(),
        usize::from(floor_number > 1)
    );
    debug_assert_eq!(grid.regions().len(), 1, "{} left a disconnected floor", generator.name());

    let spawns = generate_spawns(
        &SpawnContext { definition, floor_number, grid: &grid, entry, lookup },
        &mut rng,
    );

    debug!(
        dungeon = %definition.id,
        floor = floor_number,
        generator = generator.name(),
        width,
        height,
        spawns = spawns.len(),
        "floor generated"
    );

    FloorMap {
        dungeon_id: definition.id.clone(),
        floor_number,
        generator: generator.name().to_string(),
        width,
        height,
        tiles: grid.into_tiles(),
        entry,
        stairs_up,
        stairs_down,
        spawns,
    }
}

/// Opens a small room at the centre and returns its middle tile.
fn carve_rescue_chamber(grid: &mut Grid) -> Pos {
    let center = grid.center();
    let rect = Rect { x: (center.x - 1) as usize, y: (center.y - 1) as usize, width: 3, height: 3 };
    grid.carve_rect(&rect);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl FloorGenerator for Nothing {
        fn name(&self) -> &'static str {
            "nothing"
        }

        fn carve(
            &self,
            grid: &mut Grid,
            _rng: &mut DeterministicRng,
            _params: &GenerationParams,
        ) -> CarveHints {
            CarveHints::entry(grid.center())
        }
    }

    struct TwoPockets;

    impl FloorGenerator for TwoPockets {
        fn name(&self) -> &'static str {
            "two_pockets"
        }

        fn carve(
            &self,
            grid: &mut Grid,
            _rng: &mut DeterministicRng,
            _params: &GenerationParams,
        ) -> CarveHints {
            grid.carve_rect(&Rect { x: 1, y: 1, width: 4, height: 4 });
            grid.carve_rect(&Rect { x: 10, y: 5, width: 4, height: 4 });
            CarveHints { entry: Pos::new(2, 2), exit: Some(Pos::new(11, 6)) }
        }
    }

    #[test]
    fn empty_layout_still_yields_stairs() {
        let definition = DungeonDefinition::new("void", "nothing");
        let floor = Nothing.generate_floor(&definition, 3, 9);
        assert_eq!(floor.count(TileKind::StairsDown), 1);
        assert_eq!(floor.count(TileKind::StairsUp), 1);
        assert_ne!(floor.stairs_down, floor.entry);
    }

    #[test]
    fn unreachable_exit_hint_is_replaced_and_pockets_sealed() {
        let definition = DungeonDefinition::new("split", "two_pockets");
        let floor = TwoPockets.generate_floor(&definition, 1, 4);
        assert_eq!(floor.stairs_up, None);
        assert_eq!(floor.tile_at(Pos::new(11, 6)), TileKind::Wall);
        assert!(Rect { x: 1, y: 1, width: 4, height: 4 }.contains(floor.stairs_down));
        assert_eq!(floor.walkable_positions().len(), 16);
    }
}
