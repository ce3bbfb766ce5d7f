//! Drunkard's-walk tunnels. Each walker starts on ground already dug, so the network stays whole.

use crate::seed::DeterministicRng;

use super::super::definition::GenerationParams;
use super::super::grid::Grid;
use super::super::pipeline::{CarveHints, FloorGenerator};

const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

#[derive(Clone, Copy, Debug, Default)]
pub struct WindingTunnels;

impl FloorGenerator for WindingTunnels {
    fn name(&self) -> &'static str {
        "winding"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let walkers = params.walker_count.unwrap_or(3).clamp(1, 16);
        let interior = (grid.width() - 2) * (grid.height() - 2);
        let walk_length = params.walk_length.unwrap_or(interior * 35 / 100 / walkers).max(10);
        let turn_chance = params.turn_chance.unwrap_or(0.3).clamp(0.0, 1.0);

        let start = grid.center();
        grid.carve(start);
        let mut dug = vec![start];
        let mut position = start;
        for walker in 0..walkers {
            if walker > 0 {
                position = rng.pick(&dug).copied().unwrap_or(start);
            }
            let mut direction = rng.range_inclusive_usize(0, DIRECTIONS.len() - 1);
            for _ in 0..walk_length {
                if rng.chance(turn_chance) {
                    direction = rng.range_inclusive_usize(0, DIRECTIONS.len() - 1);
                }
                let (dx, dy) = DIRECTIONS[direction];
                let mut next = position.offset(dx, dy);
                if !grid.is_interior(next) {
                    let open: Vec<usize> = (0..DIRECTIONS.len())
                        .filter(|&index| {
                            let (dx, dy) = DIRECTIONS[index];
                            grid.is_interior(position.offset(dx, dy))
                        })
                        .collect();
                    let Some(&turn) = rng.pick(&open) else { break };
                    direction = turn;
                    let (dx, dy) = DIRECTIONS[direction];
                    next = position.offset(dx, dy);
                }
                if !grid.is_walkable(next) {
                    grid.carve(next);
                    dug.push(next);
                }
                position = next;
            }
        }

        CarveHints { entry: start, exit: Some(position).filter(|&end| end != start) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileKind;

    #[test]
    fn walkers_dig_one_connected_network() {
        for seed in 0..10 {
            let mut grid = Grid::filled(48, 32, TileKind::Wall);
            let mut rng = DeterministicRng::new(seed);
            let hints = WindingTunnels.carve(&mut grid, &mut rng, &GenerationParams::default());
            let distances = grid.distances_from(hints.entry);
            let reachable = distances.iter().filter(|distance| distance.is_some()).count();
            assert_eq!(reachable, grid.walkable_count());
            assert!(reachable > 40, "seed {seed}: {reachable}");
        }
    }

    #[test]
    fn walkers_never_breach_the_border() {
        let mut grid = Grid::filled(20, 15, TileKind::Wall);
        let params = GenerationParams { walk_length: Some(2_000), ..GenerationParams::default() };
        WindingTunnels.carve(&mut grid, &mut DeterministicRng::new(1), &params);
        for pos in grid.positions().filter(|&pos| !grid.is_interior(pos)) {
            assert_eq!(grid.get(pos), TileKind::Wall);
        }
    }
}
