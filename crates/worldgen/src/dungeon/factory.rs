//! Name-to-strategy lookup for content-driven dungeon definitions.

use std::collections::BTreeMap;

use tracing::warn;

use crate::content::DefinitionLookup;
use crate::seed::WorldSeed;

use super::definition::DungeonDefinition;
use super::model::FloorMap;
use super::pipeline::FloorGenerator;
use super::strategies::{
    BspRooms, CellularCaves, CircularFloor, ConcentricRings, GridTunnels, RectangularRooms,
    SymmetricLayout, WindingTunnels,
};

pub type StrategyConstructor = fn() -> Box<dyn FloorGenerator>;

/// Used for any identifier the registry does not know.
pub const FALLBACK_GENERATOR: &str = "rooms";

fn boxed<G: FloorGenerator + Default + 'static>() -> Box<dyn FloorGenerator> {
    Box::new(G::default())
}

const BUILTIN: &[(&str, StrategyConstructor)] = &[
    ("rooms", boxed::<RectangularRooms>),
    ("rectangular_rooms", boxed::<RectangularRooms>),
    ("cellular", boxed::<CellularCaves>),
    ("cellular_automata", boxed::<CellularCaves>),
    ("caves", boxed::<CellularCaves>),
    ("grid_tunnels", boxed::<GridTunnels>),
    ("grid", boxed::<GridTunnels>),
    ("bsp", boxed::<BspRooms>),
    ("bsp_rooms", boxed::<BspRooms>),
    ("circular", boxed::<CircularFloor>),
    ("circular_floors", boxed::<CircularFloor>),
    ("radial", boxed::<CircularFloor>),
    ("concentric", boxed::<ConcentricRings>),
    ("concentric_rings", boxed::<ConcentricRings>),
    ("rings", boxed::<ConcentricRings>),
    ("symmetric", boxed::<SymmetricLayout>),
    ("symmetric_layout", boxed::<SymmetricLayout>),
    ("mirrored", boxed::<SymmetricLayout>),
    ("winding", boxed::<WindingTunnels>),
    ("winding_tunnels", boxed::<WindingTunnels>),
    ("drunkard", boxed::<WindingTunnels>),
];

#[derive(Clone, Debug)]
pub struct GeneratorRegistry {
    constructors: BTreeMap<String, StrategyConstructor>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl GeneratorRegistry {
    pub fn empty() -> Self {
        Self { constructors: BTreeMap::new() }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        for &(name, constructor) in BUILTIN {
            registry.register(name, constructor);
        }
        registry
    }

    /// Adds or replaces a strategy. Names are matched case-insensitively, with `-` and `_`
    /// treated alike.
    pub fn register(&mut self, name: &str, constructor: StrategyConstructor) {
        self.constructors.insert(normalize(name), constructor);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&normalize(name))
    }

    /// Never fails: an unknown name logs a warning and yields rectangular rooms.
    pub fn create(&self, name: &str) -> Box<dyn FloorGenerator> {
        match self.constructors.get(&normalize(name)) {
            Some(constructor) => constructor(),
            None => {
                warn!(generator = name, fallback = FALLBACK_GENERATOR, "unknown generator type");
                let make = self.constructors.get(FALLBACK_GENERATOR).copied();
                make.unwrap_or(boxed::<RectangularRooms>)()
            }
        }
    }

    pub fn generate_floor(
        &self,
        definition: &DungeonDefinition,
        floor_number: u32,
        world_seed: WorldSeed,
        lookup: Option<&dyn DefinitionLookup>,
    ) -> FloorMap {
        self.create(&definition.generator)
            .generate_floor_with(definition, floor_number, world_seed, lookup)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

pub fn create_generator(name: &str) -> Box<dyn FloorGenerator> {
    GeneratorRegistry::with_builtin().create(name)
}

/// Builds one floor of `definition` with the strategy it names.
pub fn generate_floor(
    definition: &DungeonDefinition,
    floor_number: u32,
    world_seed: WorldSeed,
) -> FloorMap {
    GeneratorRegistry::with_builtin().generate_floor(definition, floor_number, world_seed, None)
}
