//! A regular lattice of junctions joined by straight tunnels, some of them left uncut.

use crate::seed::DeterministicRng;
use crate::types::Pos;

use super::super::definition::GenerationParams;
use super::super::grid::{Grid, Rect};
use super::super::pipeline::{CarveHints, FloorGenerator};

const CHAMBER_CHANCE: f64 = 0.15;

#[derive(Clone, Copy, Debug, Default)]
pub struct GridTunnels;

struct Lattice {
    columns: usize,
    rows: usize,
    cell: usize,
}

impl Lattice {
    fn new(width: usize, height: usize, cell: usize) -> Self {
        Self { columns: (width - 3) / cell + 1, rows: (height - 3) / cell + 1, cell }
    }

    fn node(&self, column: usize, row: usize) -> Pos {
        Pos { y: (1 + row * self.cell) as i32, x: (1 + column * self.cell) as i32 }
    }

    fn index(&self, column: usize, row: usize) -> usize {
        row * self.columns + column
    }

    fn neighbours(&self, column: usize, row: usize) -> Vec<(usize, usize)> {
        let mut neighbours = Vec::with_capacity(4);
        if row > 0 {
            neighbours.push((column, row - 1));
        }
        if column + 1 < self.columns {
            neighbours.push((column + 1, row));
        }
        if row + 1 < self.rows {
            neighbours.push((column, row + 1));
        }
        if column > 0 {
            neighbours.push((column - 1, row));
        }
        neighbours
    }
}

impl FloorGenerator for GridTunnels {
    fn name(&self) -> &'static str {
        "grid_tunnels"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let cell = params.cell_size.unwrap_or(4).clamp(2, 12);
        let extra_chance = params.extra_connection_chance.unwrap_or(0.2).clamp(0.0, 1.0);
        let lattice = Lattice::new(grid.width(), grid.height(), cell);

        // Randomised depth-first spanning tree: every junction ends up connected.
        let mut visited = vec![false; lattice.columns * lattice.rows];
        let mut in_tree = Vec::new();
        let mut stack = vec![(0_usize, 0_usize)];
        visited[0] = true;
        grid.carve(lattice.node(0, 0));
        while let Some(&(column, row)) = stack.last() {
            let mut options: Vec<(usize, usize)> = lattice
                .neighbours(column, row)
                .into_iter()
                .filter(|&(next_column, next_row)| !visited[lattice.index(next_column, next_row)])
                .collect();
            if options.is_empty() {
                stack.pop();
                continue;
            }
            rng.shuffle(&mut options);
            let next = options[0];
            visited[lattice.index(next.0, next.1)] = true;
            carve_tunnel(grid, lattice.node(column, row), lattice.node(next.0, next.1));
            in_tree.push(edge_key(&lattice, (column, row), next));
            stack.push(next);
        }

        // Extra loops; the remaining lattice edges stay as gaps.
        for row in 0..lattice.rows {
            for column in 0..lattice.columns {
                for next in [(column + 1, row), (column, row + 1)] {
                    if next.0 >= lattice.columns || next.1 >= lattice.rows {
                        continue;
                    }
                    if in_tree.contains(&edge_key(&lattice, (column, row), next)) {
                        continue;
                    }
                    if rng.chance(extra_chance) {
                        carve_tunnel(grid, lattice.node(column, row), lattice.node(next.0, next.1));
                    }
                }
            }
        }

        for row in 0..lattice.rows {
            for column in 0..lattice.columns {
                if rng.chance(CHAMBER_CHANCE) {
                    let node = lattice.node(column, row);
                    let rect = Rect {
                        x: (node.x as usize).saturating_sub(1).max(1),
                        y: (node.y as usize).saturating_sub(1).max(1),
                        width: 3,
                        height: 3,
                    };
                    grid.carve_rect(&rect);
                }
            }
        }

        CarveHints {
            entry: lattice.node(0, 0),
            exit: Some(lattice.node(lattice.columns - 1, lattice.rows - 1)),
        }
    }
}

fn edge_key(lattice: &Lattice, a: (usize, usize), b: (usize, usize)) -> (usize, usize) {
    let (left, right) = (lattice.index(a.0, a.1), lattice.index(b.0, b.1));
    (left.min(right), left.max(right))
}

fn carve_tunnel(grid: &mut Grid, from: Pos, to: Pos) {
    if from.y == to.y {
        grid.carve_horizontal(from.y, from.x, to.x);
    } else {
        grid.carve_vertical(from.x, from.y, to.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileKind;

    #[test]
    fn lattice_nodes_stay_inside_the_border() {
        for (width, height, cell) in [(20, 15, 4), (48, 32, 3), (21, 16, 12)] {
            let lattice = Lattice::new(width, height, cell);
            let far = lattice.node(lattice.columns - 1, lattice.rows - 1);
            assert!((far.x as usize) <= width - 2 && (far.y as usize) <= height - 2);
            assert!(lattice.columns >= 2 && lattice.rows >= 2);
        }
    }

    #[test]
    fn every_junction_is_reachable() {
        for seed in 0..8 {
            let mut grid = Grid::filled(48, 32, TileKind::Wall);
            let params = GenerationParams {
                extra_connection_chance: Some(0.0),
                ..GenerationParams::default()
            };
            let hints = GridTunnels.carve(&mut grid, &mut DeterministicRng::new(seed), &params);
            let distances = grid.distances_from(hints.entry);
            let lattice = Lattice::new(48, 32, 4);
            for row in 0..lattice.rows {
                for column in 0..lattice.columns {
                    let node = lattice.node(column, row);
                    assert!(distances[node.y as usize * 48 + node.x as usize].is_some());
                }
            }
        }
    }
}
