//! Nested square curtain walls around a central keep, breached by gatehouses.

use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::super::definition::GenerationParams;
use super::super::grid::{Grid, Rect};
use super::super::pipeline::{CarveHints, FloorGenerator};

const GATE_CHANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default)]
pub struct ConcentricRings;

/// Rings that fit while leaving a keep at least three tiles across.
fn ring_insets(width: usize, height: usize, spacing: usize, wanted: usize) -> Vec<usize> {
    (1..=wanted)
        .map(|ring| ring * spacing)
        .take_while(|&inset| width >= inset * 2 + 5 && height >= inset * 2 + 5)
        .collect()
}

fn gates(ring: Rect) -> [Pos; 4] {
    let middle = ring.center();
    [
        Pos { y: ring.y as i32, x: middle.x },
        Pos { y: middle.y, x: ring.right() as i32 },
        Pos { y: ring.bottom() as i32, x: middle.x },
        Pos { y: middle.y, x: ring.x as i32 },
    ]
}

impl FloorGenerator for ConcentricRings {
    fn name(&self) -> &'static str {
        "concentric"
    }

    fn initial_fill(&self) -> TileKind {
        TileKind::Floor
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let spacing = params.ring_spacing.unwrap_or(3).clamp(2, 16);
        let wanted = params.ring_count.unwrap_or(3).clamp(1, 16);

        for inset in ring_insets(grid.width(), grid.height(), spacing, wanted) {
            let ring = Rect {
                x: inset,
                y: inset,
                width: grid.width() - inset * 2,
                height: grid.height() - inset * 2,
            };
            for x in ring.x..=ring.right() {
                grid.set(Pos { y: ring.y as i32, x: x as i32 }, TileKind::Wall);
                grid.set(Pos { y: ring.bottom() as i32, x: x as i32 }, TileKind::Wall);
            }
            for y in ring.y..=ring.bottom() {
                grid.set(Pos { y: y as i32, x: ring.x as i32 }, TileKind::Wall);
                grid.set(Pos { y: y as i32, x: ring.right() as i32 }, TileKind::Wall);
            }

            let candidates = gates(ring);
            let mut opened = 0;
            for gate in candidates {
                if rng.chance(GATE_CHANCE) {
                    grid.set(gate, TileKind::Door);
                    opened += 1;
                }
            }
            if opened == 0
                && let Some(&gate) = rng.pick(&candidates)
            {
                grid.set(gate, TileKind::Door);
            }
        }

        CarveHints { entry: Pos::new(1, 1), exit: Some(grid.center()) }
    }
}
