//! Public data models for generated floors and their spawn intents.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::content::DefinitionKind;
use crate::types::{Pos, Tile, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Enemy,
    Feature,
    Hazard,
}

impl SpawnKind {
    pub const fn definition_kind(self) -> DefinitionKind {
        match self {
            SpawnKind::Enemy => DefinitionKind::Enemy,
            SpawnKind::Feature => DefinitionKind::Feature,
            SpawnKind::Hazard => DefinitionKind::Hazard,
        }
    }
}

/// Plain-data request for the content layer to instantiate something at `pos`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnIntent {
    pub kind: SpawnKind,
    pub id: String,
    pub pos: Pos,
    /// Present for enemies only.
    pub level: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorMap {
    pub dungeon_id: String,
    pub floor_number: u32,
    /// Strategy that actually produced the layout, after any fallback.
    pub generator: String,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
    pub entry: Pos,
    pub stairs_up: Option<Pos>,
    pub stairs_down: Pos,
    pub spawns: Vec<SpawnIntent>,
}

impl FloorMap {
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if pos.x < 0 || pos.y < 0 {
            return TileKind::Wall;
        }
        let x = pos.x as usize;
        let y = pos.y as usize;
        if x >= self.width || y >= self.height {
            return TileKind::Wall;
        }
        self.tiles[y * self.width + x]
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        Tile::of(self.tile_at(pos))
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos).walkable()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&tile| tile == kind).count()
    }

    pub fn spawns_of(&self, kind: SpawnKind) -> impl Iterator<Item = &SpawnIntent> {
        self.spawns.iter().filter(move |spawn| spawn.kind == kind)
    }

    pub fn walkable_positions(&self) -> Vec<Pos> {
        let mut positions = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                if self.is_walkable(pos) {
                    positions.push(pos);
                }
            }
        }
        positions
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(64 + self.tiles.len() + self.spawns.len() * 24);
        write_str(&mut bytes, &self.dungeon_id);
        bytes.extend(self.floor_number.to_le_bytes());
        write_str(&mut bytes, &self.generator);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            bytes.push(tile.code());
        }
        write_pos(&mut bytes, self.entry);
        match self.stairs_up {
            Some(pos) => {
                bytes.push(1);
                write_pos(&mut bytes, pos);
            }
            None => bytes.push(0),
        }
        write_pos(&mut bytes, self.stairs_down);

        bytes.extend((self.spawns.len() as u32).to_le_bytes());
        for spawn in &self.spawns {
            bytes.push(spawn.kind as u8);
            write_str(&mut bytes, &spawn.id);
            write_pos(&mut bytes, spawn.pos);
            bytes.extend(spawn.level.unwrap_or(0).to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write(&self.canonical_bytes());
        hasher.finish()
    }

    /// ASCII rendering with spawns overlaid: `E` enemy, `F` feature, `H` hazard.
    pub fn render(&self) -> String {
        let mut rows: Vec<Vec<char>> = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.tile_at(Pos { y: y as i32, x: x as i32 }).glyph())
                    .collect()
            })
            .collect();
        for spawn in &self.spawns {
            let marker = match spawn.kind {
                SpawnKind::Enemy => 'E',
                SpawnKind::Feature => 'F',
                SpawnKind::Hazard => 'H',
            };
            if let Some(cell) =
                rows.get_mut(spawn.pos.y as usize).and_then(|row| row.get_mut(spawn.pos.x as usize))
            {
                *cell = marker;
            }
        }
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

fn write_pos(bytes: &mut Vec<u8>, pos: Pos) {
    bytes.extend(pos.y.to_le_bytes());
    bytes.extend(pos.x.to_le_bytes());
}

fn write_str(bytes: &mut Vec<u8>, value: &str) {
    bytes.extend((value.len() as u32).to_le_bytes());
    bytes.extend(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FloorMap {
        let mut tiles = vec![TileKind::Wall; 5 * 4];
        tiles[5 + 1] = TileKind::StairsUp;
        tiles[5 + 2] = TileKind::Floor;
        tiles[5 + 3] = TileKind::StairsDown;
        FloorMap {
            dungeon_id: "crypt".to_string(),
            floor_number: 2,
            generator: "rooms".to_string(),
            width: 5,
            height: 4,
            tiles,
            entry: Pos::new(1, 1),
            stairs_up: Some(Pos::new(1, 1)),
            stairs_down: Pos::new(3, 1),
            spawns: vec![SpawnIntent {
                kind: SpawnKind::Enemy,
                id: "rat".to_string(),
                pos: Pos::new(2, 1),
                level: Some(2),
            }],
        }
    }

    #[test]
    fn out_of_bounds_reads_are_walls() {
        let map = sample();
        assert_eq!(map.tile_at(Pos::new(-1, 0)), TileKind::Wall);
        assert_eq!(map.tile_at(Pos::new(5, 0)), TileKind::Wall);
        assert_eq!(map.tile_at(Pos::new(3, 1)), TileKind::StairsDown);
        assert_eq!(map.walkable_positions().len(), 3);
    }

    #[test]
    fn fingerprint_tracks_spawn_changes() {
        let map = sample();
        let mut moved = map.clone();
        moved.spawns[0].level = Some(3);
        assert_eq!(map.fingerprint(), sample().fingerprint());
        assert_ne!(map.fingerprint(), moved.fingerprint());
    }

    #[test]
    fn render_overlays_spawns() {
        let rendered = sample().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].chars().nth(2), Some('E'));
    }
}
