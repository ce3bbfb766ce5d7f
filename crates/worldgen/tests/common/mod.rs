#![allow(dead_code)]

use std::collections::VecDeque;

use worldgen::dungeon::{DungeonDefinition, FloorMap};
use worldgen::types::Pos;

pub const STRATEGIES: [&str; 8] =
    ["rooms", "cellular", "grid_tunnels", "bsp", "circular", "concentric", "symmetric", "winding"];

pub const BURIAL_BARROW: &str = r#"{
    "id": "burial_barrow",
    "floors": { "min": 4, "max": 8 },
    "map_size": { "width": 48, "height": 32, "growth_per_floor": 2, "max_width": 64 },
    "generator": "bsp",
    "enemy_pool": [
        { "id": "barrow_rat", "floors": { "min": 1, "max": 3 }, "weight": 8 },
        { "id": "skeleton", "floors": { "min": 2, "max": 8 }, "weight": 6 },
        { "id": "wight", "floors": { "min": 4, "max": 8 }, "weight": 3 },
        { "id": "barrow_king", "floors": { "min": 5, "max": 5 }, "weight": 1 }
    ],
    "features": {
        "min": 1,
        "max": 3,
        "entries": [
            { "id": "burial_urn" },
            { "id": "bone_altar", "floors": { "min": 3, "max": 8 } }
        ]
    },
    "hazards": { "min": 0, "max": 2, "entries": [{ "id": "grave_gas", "weight": 2 }] },
    "difficulty": {
        "base_enemies": 3.0,
        "enemies_per_floor": 1.5,
        "max_enemies": 12,
        "level_multiplier": 1.5
    }
}"#;

pub fn burial_barrow() -> DungeonDefinition {
    DungeonDefinition::from_json_str(BURIAL_BARROW).expect("fixture should parse")
}

pub fn definition_for(generator: &str) -> DungeonDefinition {
    let mut definition = burial_barrow();
    definition.id = format!("test_{generator}");
    definition.generator = generator.to_string();
    definition
}

/// Walkable tiles reachable from `start` with 4-directional steps.
pub fn reachable_from(floor: &FloorMap, start: Pos) -> usize {
    let mut seen = vec![false; floor.width * floor.height];
    let mut queue = VecDeque::from([start]);
    let index = |pos: Pos| pos.y as usize * floor.width + pos.x as usize;
    if !floor.is_walkable(start) {
        return 0;
    }
    seen[index(start)] = true;
    let mut count = 0;
    while let Some(pos) = queue.pop_front() {
        count += 1;
        for next in pos.neighbors() {
            if floor.is_walkable(next) && !seen[index(next)] {
                seen[index(next)] = true;
                queue.push_back(next);
            }
        }
    }
    count
}
