//! Mirrored floors: lay out one quadrant (or half), reflect it, then cut a cross of halls.
//!
//! Mirroring happens inside the largest odd-sized box that fits the grid, so every interior
//! tile has an exact partner. On even-sized grids the extra last row or column stays wall.

use tracing::warn;

use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::super::definition::GenerationParams;
use super::super::grid::{Grid, Rect};
use super::super::pipeline::{CarveHints, FloorGenerator};

#[derive(Clone, Copy, Debug, Default)]
pub struct SymmetricLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    /// Top half mirrored onto the bottom.
    Horizontal,
    /// Left half mirrored onto the right.
    Vertical,
    Both,
}

impl Axis {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Axis::Both,
            Some(name) if name.eq_ignore_ascii_case("both") => Axis::Both,
            Some(name) if name.eq_ignore_ascii_case("horizontal") => Axis::Horizontal,
            Some(name) if name.eq_ignore_ascii_case("vertical") => Axis::Vertical,
            Some(name) => {
                warn!(axis = name, "unknown symmetry axis; mirroring on both");
                Axis::Both
            }
        }
    }

    fn mirrors_x(self) -> bool {
        matches!(self, Axis::Vertical | Axis::Both)
    }

    fn mirrors_y(self) -> bool {
        matches!(self, Axis::Horizontal | Axis::Both)
    }
}

/// The tile every mirror of a `width` × `height` floor reflects through.
pub fn symmetry_center(width: usize, height: usize) -> Pos {
    let (box_width, box_height) = odd_box(width, height);
    Pos { y: (box_height / 2) as i32, x: (box_width / 2) as i32 }
}

fn odd_box(width: usize, height: usize) -> (usize, usize) {
    (width - (1 - width % 2), height - (1 - height % 2))
}

impl FloorGenerator for SymmetricLayout {
    fn name(&self) -> &'static str {
        "symmetric"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let axis = Axis::parse(params.symmetry_axis.as_deref());
        let (box_width, box_height) = odd_box(grid.width(), grid.height());
        let center = symmetry_center(grid.width(), grid.height());
        let (cx, cy) = (center.x as usize, center.y as usize);

        // Source region, inclusive, inside the border of the mirror box.
        let source = Rect {
            x: 1,
            y: 1,
            width: if axis.mirrors_x() { cx } else { box_width - 2 },
            height: if axis.mirrors_y() { cy } else { box_height - 2 },
        };

        let mut half = Grid::filled(grid.width(), grid.height(), TileKind::Wall);
        let room_count = params.min_rooms.unwrap_or(4).clamp(1, 12);
        let min_size = params.room_min_size.unwrap_or(3).max(2);
        let max_size = params.room_max_size.unwrap_or(6).max(min_size);
        for _ in 0..room_count {
            let room_width = rng.range_inclusive_usize(min_size, max_size).min(source.width);
            let room_height = rng.range_inclusive_usize(min_size, max_size).min(source.height);
            let x = source.x + rng.range_inclusive_usize(0, source.width - room_width);
            let y = source.y + rng.range_inclusive_usize(0, source.height - room_height);
            let room = Rect { x, y, width: room_width, height: room_height };
            half.carve_rect(&room);

            // Straight run from the room to the hall it mirrors towards.
            let middle = room.center();
            if axis == Axis::Vertical {
                half.carve_horizontal(middle.y, middle.x, center.x);
            } else {
                half.carve_vertical(middle.x, middle.y, center.y);
            }
        }

        for y in 1..box_height - 1 {
            for x in 1..box_width - 1 {
                let source_x = if axis.mirrors_x() { x.min(box_width - 1 - x) } else { x };
                let source_y = if axis.mirrors_y() { y.min(box_height - 1 - y) } else { y };
                let from = Pos { y: source_y as i32, x: source_x as i32 };
                grid.set(Pos { y: y as i32, x: x as i32 }, half.get(from));
            }
        }

        // The cross is its own mirror image, so the result stays symmetric.
        for x in 1..box_width - 1 {
            grid.carve(Pos { y: cy as i32, x: x as i32 });
        }
        for y in 1..box_height - 1 {
            grid.carve(Pos { y: y as i32, x: cx as i32 });
        }

        CarveHints::entry(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirrored_everywhere(grid: &Grid, center: Pos) -> bool {
        grid.positions().filter(|&pos| grid.is_walkable(pos)).all(|pos| {
            grid.is_walkable(Pos { y: 2 * center.y - pos.y, x: 2 * center.x - pos.x })
                && grid.is_walkable(Pos { y: pos.y, x: 2 * center.x - pos.x })
                && grid.is_walkable(Pos { y: 2 * center.y - pos.y, x: pos.x })
        })
    }

    #[test]
    fn both_axes_mirror_exactly_on_odd_and_even_grids() {
        for (width, height) in [(48, 32), (21, 15), (20, 16)] {
            for seed in 0..5 {
                let mut grid = Grid::filled(width, height, TileKind::Wall);
                let hints = SymmetricLayout.carve(
                    &mut grid,
                    &mut DeterministicRng::new(seed),
                    &GenerationParams::default(),
                );
                assert!(mirrored_everywhere(&grid, hints.entry), "{width}x{height} seed {seed}");
                let distances = grid.distances_from(hints.entry);
                let reachable = distances.iter().filter(|distance| distance.is_some()).count();
                assert_eq!(reachable, grid.walkable_count());
            }
        }
    }

    #[test]
    fn single_axis_mirrors_only_that_axis() {
        let params = GenerationParams {
            symmetry_axis: Some("vertical".to_string()),
            ..GenerationParams::default()
        };
        let mut grid = Grid::filled(41, 25, TileKind::Wall);
        let hints = SymmetricLayout.carve(&mut grid, &mut DeterministicRng::new(8), &params);
        for pos in grid.positions() {
            let partner = Pos { y: pos.y, x: 2 * hints.entry.x - pos.x };
            assert_eq!(grid.is_walkable(pos), grid.is_walkable(partner), "{pos:?}");
        }
    }

    #[test]
    fn unknown_axis_falls_back_to_both() {
        assert_eq!(Axis::parse(Some("diagonal")), Axis::Both);
        assert_eq!(Axis::parse(Some(" Horizontal ")), Axis::Horizontal);
        assert_eq!(symmetry_center(20, 15), Pos::new(9, 7));
    }
}
