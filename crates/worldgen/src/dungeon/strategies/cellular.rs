//! Cave floors grown from random noise by majority-rule smoothing.

use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::super::definition::GenerationParams;
use super::super::grid::Grid;
use super::super::pipeline::{CarveHints, FloorGenerator};

/// A cell with at least this many walls in its 3×3 neighbourhood becomes wall.
const WALL_THRESHOLD: usize = 5;

#[derive(Clone, Copy, Debug, Default)]
pub struct CellularCaves;

impl FloorGenerator for CellularCaves {
    fn name(&self) -> &'static str {
        "cellular"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let fill_probability = params.fill_probability.unwrap_or(0.45).clamp(0.0, 0.85);
        let passes = params.smoothing_passes.unwrap_or(5).min(20);

        for y in 1..grid.height() - 1 {
            for x in 1..grid.width() - 1 {
                let kind =
                    if rng.chance(fill_probability) { TileKind::Wall } else { TileKind::Floor };
                grid.set(Pos { y: y as i32, x: x as i32 }, kind);
            }
        }
        for _ in 0..passes {
            smooth(grid);
        }

        let interior = (grid.width() - 2) * (grid.height() - 2);
        let regions = grid.regions();
        let largest = regions.first().map_or(0, Vec::len);
        if largest < interior / 8 {
            // Too sparse to play: a cross through the centre joins whatever pockets it crosses.
            let center = grid.center();
            grid.carve_horizontal(center.y, 1, grid.width() as i32 - 2);
            grid.carve_vertical(center.x, 1, grid.height() as i32 - 2);
            return CarveHints::entry(center);
        }

        let entry = regions
            .first()
            .and_then(|region| region.iter().min_by_key(|pos| (pos.x, pos.y)).copied())
            .unwrap_or_else(|| grid.center());
        CarveHints::entry(entry)
    }
}

fn smooth(grid: &mut Grid) {
    let source = grid.clone();
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            let pos = Pos { y: y as i32, x: x as i32 };
            let mut walls = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if source.get(pos.offset(dx, dy)) == TileKind::Wall {
                        walls += 1;
                    }
                }
            }
            let kind = if walls >= WALL_THRESHOLD { TileKind::Wall } else { TileKind::Floor };
            grid.set(pos, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_fills_isolated_floor_and_clears_isolated_wall() {
        let mut grid = Grid::filled(7, 7, TileKind::Wall);
        grid.set(Pos::new(2, 2), TileKind::Floor);
        smooth(&mut grid);
        assert_eq!(grid.get(Pos::new(2, 2)), TileKind::Wall);

        let mut open = Grid::filled(7, 7, TileKind::Floor);
        open.set(Pos::new(3, 3), TileKind::Wall);
        smooth(&mut open);
        assert_eq!(open.get(Pos::new(3, 3)), TileKind::Floor);
    }

    #[test]
    fn caves_leave_a_sizeable_region_around_the_entry() {
        for seed in 0..10 {
            let mut grid = Grid::filled(48, 32, TileKind::Wall);
            let mut rng = DeterministicRng::new(seed);
            let hints = CellularCaves.carve(&mut grid, &mut rng, &GenerationParams::default());
            let distances = grid.distances_from(hints.entry);
            let reachable = distances.iter().filter(|distance| distance.is_some()).count();
            // Either the natural cave or at least the full rescue cross.
            assert!(reachable >= 46 + 30 - 1, "seed {seed}: only {reachable} reachable tiles");
        }
    }
}
