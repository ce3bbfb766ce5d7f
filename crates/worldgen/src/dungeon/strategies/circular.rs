//! A round hall: a carved disk around a walled hub, cut into sectors by spoke walls.

use std::f64::consts::TAU;

use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::super::definition::GenerationParams;
use super::super::grid::Grid;
use super::super::pipeline::{CarveHints, FloorGenerator};

const SPOKE_DOOR_CHANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default)]
pub struct CircularFloor;

struct Disk {
    center: Pos,
    radius: f64,
    hub: f64,
}

impl Disk {
    fn point(&self, angle: f64, radius: f64) -> Pos {
        Pos {
            y: self.center.y + (angle.sin() * radius).round() as i32,
            x: self.center.x + (angle.cos() * radius).round() as i32,
        }
    }

    /// Tiles whose rounded distance equals the hub radius. A band one tile wide blocks
    /// 4-connected movement because each step changes the distance by at most one.
    fn on_hub_ring(&self, pos: Pos) -> bool {
        let distance = pos.distance(self.center);
        distance >= self.hub - 0.5 && distance < self.hub + 0.5
    }

    /// Opens a 4-connected path from the centre to `target`, with a door where it crosses the hub.
    fn carve_door_line(&self, grid: &mut Grid, target: Pos) {
        for pos in Grid::line_4(self.center, target) {
            let kind = if self.on_hub_ring(pos) { TileKind::Door } else { TileKind::Floor };
            set_interior(grid, pos, kind);
        }
    }
}

fn unreachable_tile(grid: &Grid, from: Pos) -> Option<Pos> {
    let distances = grid.distances_from(from);
    grid.positions()
        .zip(distances)
        .find(|&(pos, distance)| {
            distance.is_none() && grid.is_walkable(pos) && grid.is_interior(pos)
        })
        .map(|(pos, _)| pos)
}

impl FloorGenerator for CircularFloor {
    fn name(&self) -> &'static str {
        "circular"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let center = grid.center();
        let radius = (grid.width().min(grid.height()) / 2).saturating_sub(2).max(3) as f64;
        let disk = Disk { center, radius, hub: (radius / 3.0).floor().max(2.0) };
        let spokes = params.wall_count.unwrap_or(6).clamp(3, 12);

        let positions: Vec<Pos> = grid.positions().collect();
        for &pos in &positions {
            if pos.distance(center) <= disk.radius + 0.5 {
                grid.carve(pos);
            }
        }
        for &pos in &positions {
            if disk.on_hub_ring(pos) {
                set_interior(grid, pos, TileKind::Wall);
            }
        }

        let offset = rng.next_f64() * TAU;
        let angles: Vec<f64> =
            (0..spokes).map(|index| offset + TAU * index as f64 / spokes as f64).collect();
        let spoke_lines: Vec<Vec<Pos>> = angles
            .iter()
            .map(|&angle| {
                Grid::line_8(disk.point(angle, disk.hub), disk.point(angle, disk.radius + 1.0))
            })
            .collect();
        for line in &spoke_lines {
            for &pos in line {
                set_interior(grid, pos, TileKind::Wall);
            }
        }

        // One hub door per sector, at a random bearing away from both bounding spokes. The door
        // runs out to the first open sector tile on that bearing, past any spokes crowding the hub.
        let sector = TAU / spokes as f64;
        for &angle in &angles {
            let bearing = angle + sector * (0.3 + 0.4 * rng.next_f64());
            let target = (0_u32..)
                .map(|step| disk.point(bearing, disk.hub + 1.0 + f64::from(step) * 0.5))
                .take_while(|&pos| pos.distance(center) <= disk.radius + 0.5)
                .find(|&pos| !disk.on_hub_ring(pos) && grid.get(pos) == TileKind::Floor)
                .unwrap_or_else(|| disk.point(bearing, disk.hub + 1.5));
            disk.carve_door_line(grid, target);
        }

        // Spoke doors let neighbouring sectors reach each other without the hub.
        for line in &spoke_lines {
            if line.len() < 4 || !rng.chance(SPOKE_DOOR_CHANCE) {
                continue;
            }
            let pos = line[rng.range_inclusive_usize(1, line.len() - 3)];
            if pos.distance(center) <= disk.radius {
                set_interior(grid, pos, TileKind::Door);
            }
        }

        // Spokes converging near the hub can pinch off pockets; give each its own hub door.
        while let Some(stray) = unreachable_tile(grid, center) {
            disk.carve_door_line(grid, stray);
        }

        CarveHints::entry(center)
    }
}

fn set_interior(grid: &mut Grid, pos: Pos, kind: TileKind) {
    if grid.is_interior(pos) {
        grid.set(pos, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_ring_separates_inside_from_outside() {
        let disk = Disk { center: Pos::new(20, 20), radius: 15.0, hub: 5.0 };
        let mut grid = Grid::filled(41, 41, TileKind::Floor);
        for pos in grid.positions().collect::<Vec<_>>() {
            if disk.on_hub_ring(pos) {
                grid.set(pos, TileKind::Wall);
            }
        }
        let distances = grid.distances_from(disk.center);
        assert!(distances[20 * 41 + 35].is_none());
        assert!(distances[20 * 41 + 22].is_some());
    }

    #[test]
    fn centre_reaches_every_sector() {
        for (width, height) in [(20, 15), (30, 22), (48, 32), (64, 40), (81, 81)] {
            for spokes in 3..=12 {
                for seed in 0..12 {
                    let mut grid = Grid::filled(width, height, TileKind::Wall);
                    let params = GenerationParams {
                        wall_count: Some(spokes),
                        ..GenerationParams::default()
                    };
                    let mut rng = DeterministicRng::new(seed);
                    let hints = CircularFloor.carve(&mut grid, &mut rng, &params);
                    grid.seal_border();
                    assert_eq!(hints.entry, grid.center());
                    let distances = grid.distances_from(hints.entry);
                    let reachable = distances.iter().filter(|distance| distance.is_some()).count();
                    assert_eq!(
                        reachable,
                        grid.walkable_count(),
                        "{width}x{height} with {spokes} spokes, seed {seed}"
                    );
                }
            }
        }
    }
}
