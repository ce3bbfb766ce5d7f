//! Rectangular rooms joined by a nearest-neighbour corridor tree.

use crate::seed::DeterministicRng;
use crate::types::{Pos, TileKind};

use super::super::definition::GenerationParams;
use super::super::grid::{Grid, Rect};
use super::super::pipeline::{CarveHints, FloorGenerator};

#[derive(Clone, Copy, Debug, Default)]
pub struct RectangularRooms;

impl FloorGenerator for RectangularRooms {
    fn name(&self) -> &'static str {
        "rooms"
    }

    fn carve(
        &self,
        grid: &mut Grid,
        rng: &mut DeterministicRng,
        params: &GenerationParams,
    ) -> CarveHints {
        let rooms = place_rooms(grid.width(), grid.height(), rng, params);
        for room in &rooms {
            grid.carve_rect(room);
        }
        connect_rooms(grid, rng, &rooms);
        place_doors(grid, rng, &rooms, params.door_chance.unwrap_or(0.35));

        let entry = rooms.first().map_or_else(|| grid.center(), |room| room.center());
        let exit = farthest_room_center(&rooms, entry);
        CarveHints { entry, exit }
    }
}

fn place_rooms(
    width: usize,
    height: usize,
    rng: &mut DeterministicRng,
    params: &GenerationParams,
) -> Vec<Rect> {
    let min_rooms = params.min_rooms.unwrap_or(5).max(1);
    let max_rooms = params.max_rooms.unwrap_or(9).max(min_rooms);
    let min_size = params.room_min_size.unwrap_or(4).max(3);
    let max_size = params.room_max_size.unwrap_or(9).max(min_size);
    let target_room_count = rng.range_inclusive_usize(min_rooms, max_rooms);

    let mut rooms: Vec<Rect> = Vec::new();
    for _ in 0..target_room_count * 30 {
        if rooms.len() >= target_room_count {
            break;
        }
        let room_width = rng.range_inclusive_usize(min_size, max_size);
        let room_height =
            rng.range_inclusive_usize(min_size.saturating_sub(1).max(3), max_size.max(4) - 1);
        if room_width + 2 >= width || room_height + 2 >= height {
            continue;
        }

        let max_x = width - room_width - 1;
        let max_y = height - room_height - 1;
        if max_x <= 1 || max_y <= 1 {
            continue;
        }

        let x = rng.range_inclusive_usize(1, max_x);
        let y = rng.range_inclusive_usize(1, max_y);
        let candidate = Rect { x, y, width: room_width, height: room_height };
        let candidate_with_margin = candidate.expanded(1);
        if rooms.iter().any(|existing| existing.expanded(1).intersects(&candidate_with_margin)) {
            continue;
        }
        rooms.push(candidate);
    }

    add_fallback_rooms(width, height, &mut rooms);
    rooms.sort_by_key(|room| {
        let center = room.center();
        (center.y, center.x, room.height, room.width)
    });
    rooms
}

fn add_fallback_rooms(width: usize, height: usize, rooms: &mut Vec<Rect>) {
    let fallback_room_width = 4usize;
    let fallback_room_height = 4usize;
    if fallback_room_width + 2 >= width || fallback_room_height + 2 >= height {
        return;
    }

    let fallback_positions = [
        (1usize, 1usize),
        (width - fallback_room_width - 1, 1usize),
        (1usize, height - fallback_room_height - 1),
        (width - fallback_room_width - 1, height - fallback_room_height - 1),
    ];

    for (x, y) in fallback_positions {
        if rooms.len() >= 4 {
            break;
        }
        let candidate = Rect { x, y, width: fallback_room_width, height: fallback_room_height };
        let candidate_with_margin = candidate.expanded(1);
        if rooms.iter().any(|existing| existing.expanded(1).intersects(&candidate_with_margin)) {
            continue;
        }
        rooms.push(candidate);
    }
}

/// Grows a tree from the first room, always adding the closest pending room next.
fn connect_rooms(grid: &mut Grid, rng: &mut DeterministicRng, rooms: &[Rect]) {
    if rooms.len() < 2 {
        return;
    }

    let mut connected_room_indices = vec![0_usize];
    let mut pending_room_indices: Vec<usize> = (1..rooms.len()).collect();

    while !pending_room_indices.is_empty() {
        let mut best_choice: Option<(u32, usize, usize)> = None;
        for &connected_index in &connected_room_indices {
            let connected_center = rooms[connected_index].center();
            for &pending_index in &pending_room_indices {
                let distance = connected_center.manhattan(rooms[pending_index].center());
                let candidate = (distance, connected_index, pending_index);
                if best_choice.is_none_or(|best| candidate < best) {
                    best_choice = Some(candidate);
                }
            }
        }

        let Some((_, connected_index, pending_index)) = best_choice else {
            break;
        };
        grid.carve_l_corridor(
            rooms[connected_index].center(),
            rooms[pending_index].center(),
            rng.chance(0.5),
        );

        connected_room_indices.push(pending_index);
        pending_room_indices.retain(|&index| index != pending_index);
    }
}

/// Corridor tiles entering a room through a one-tile gap become doors.
fn place_doors(grid: &mut Grid, rng: &mut DeterministicRng, rooms: &[Rect], chance: f64) {
    for room in rooms {
        let ring = room.expanded(1);
        for y in ring.y..=ring.bottom() {
            for x in ring.x..=ring.right() {
                let pos = Pos { y: y as i32, x: x as i32 };
                if room.contains(pos) || grid.get(pos) != TileKind::Floor {
                    continue;
                }
                let [north, east, south, west] =
                    pos.neighbors().map(|next| grid.get(next) == TileKind::Wall);
                let gap = (north && south && !east && !west) || (east && west && !north && !south);
                if gap && rng.chance(chance) {
                    grid.set(pos, TileKind::Door);
                }
            }
        }
    }
}

fn farthest_room_center(rooms: &[Rect], entry: Pos) -> Option<Pos> {
    let mut best: Option<(u32, Pos)> = None;
    for room in rooms {
        let center = room.center();
        let distance = entry.manhattan(center);
        if best.is_none_or(|(best_distance, best_pos)| {
            (distance, center.y, center.x) > (best_distance, best_pos.y, best_pos.x)
        }) {
            best = Some((distance, center));
        }
    }
    best.map(|(_, pos)| pos).filter(|&pos| pos != entry)
}
