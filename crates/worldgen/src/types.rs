use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y.saturating_add(dy), x: self.x.saturating_add(dx) }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn distance(self, other: Pos) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// 4-connected neighbours in N, E, S, W order.
    pub fn neighbors(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Floor,
    Door,
    StairsUp,
    StairsDown,
    DeepWater,
    Water,
    Sand,
    Grass,
    Dirt,
    Mud,
    Snow,
    Stone,
    OreVein,
    Structure,
}

impl TileKind {
    pub const ALL: [TileKind; 15] = [
        TileKind::Wall,
        TileKind::Floor,
        TileKind::Door,
        TileKind::StairsUp,
        TileKind::StairsDown,
        TileKind::DeepWater,
        TileKind::Water,
        TileKind::Sand,
        TileKind::Grass,
        TileKind::Dirt,
        TileKind::Mud,
        TileKind::Snow,
        TileKind::Stone,
        TileKind::OreVein,
        TileKind::Structure,
    ];

    pub const fn walkable(self) -> bool {
        !matches!(
            self,
            TileKind::Wall
                | TileKind::DeepWater
                | TileKind::Water
                | TileKind::OreVein
                | TileKind::Structure
        )
    }

    pub const fn transparent(self) -> bool {
        !matches!(self, TileKind::Wall | TileKind::Door | TileKind::OreVein | TileKind::Structure)
    }

    pub const fn is_stairs(self) -> bool {
        matches!(self, TileKind::StairsUp | TileKind::StairsDown)
    }

    pub const fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Door => '+',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
            TileKind::DeepWater => '≈',
            TileKind::Water => '~',
            TileKind::Sand => ':',
            TileKind::Grass => '"',
            TileKind::Dirt => ',',
            TileKind::Mud => ';',
            TileKind::Snow => '*',
            TileKind::Stone => '^',
            TileKind::OreVein => '%',
            TileKind::Structure => 'H',
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            TileKind::Wall => Rgb(110, 104, 96),
            TileKind::Floor => Rgb(150, 140, 120),
            TileKind::Door => Rgb(160, 110, 60),
            TileKind::StairsUp | TileKind::StairsDown => Rgb(240, 230, 140),
            TileKind::DeepWater => Rgb(20, 40, 120),
            TileKind::Water => Rgb(40, 90, 180),
            TileKind::Sand => Rgb(220, 200, 140),
            TileKind::Grass => Rgb(70, 150, 60),
            TileKind::Dirt => Rgb(120, 90, 60),
            TileKind::Mud => Rgb(90, 80, 50),
            TileKind::Snow => Rgb(235, 240, 250),
            TileKind::Stone => Rgb(130, 130, 130),
            TileKind::OreVein => Rgb(190, 120, 60),
            TileKind::Structure => Rgb(180, 150, 110),
        }
    }

    pub(crate) const fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A fully resolved tile as handed to the rendering and game-loop layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub walkable: bool,
    pub transparent: bool,
    pub glyph: char,
    pub color: Rgb,
}

impl Tile {
    pub const fn of(kind: TileKind) -> Self {
        Self {
            kind,
            walkable: kind.walkable(),
            transparent: kind.transparent(),
            glyph: kind.glyph(),
            color: kind.color(),
        }
    }

    pub const fn with_look(kind: TileKind, glyph: char, color: Rgb) -> Self {
        Self { kind, walkable: kind.walkable(), transparent: kind.transparent(), glyph, color }
    }
}

impl From<TileKind> for Tile {
    fn from(kind: TileKind) -> Self {
        Tile::of(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stairs_and_doors_are_walkable_but_walls_and_water_are_not() {
        assert!(TileKind::StairsDown.walkable());
        assert!(TileKind::StairsUp.walkable());
        assert!(TileKind::Door.walkable());
        assert!(!TileKind::Wall.walkable());
        assert!(!TileKind::Water.walkable());
        assert!(!TileKind::DeepWater.walkable());
    }

    #[test]
    fn tile_codes_are_unique() {
        let mut codes: Vec<u8> = TileKind::ALL.iter().map(|kind| kind.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), TileKind::ALL.len());
    }

    #[test]
    fn neighbors_are_in_clockwise_order_from_north() {
        let origin = Pos::new(3, 3);
        assert_eq!(
            origin.neighbors(),
            [Pos::new(3, 2), Pos::new(4, 3), Pos::new(3, 4), Pos::new(2, 3)]
        );
    }
}
