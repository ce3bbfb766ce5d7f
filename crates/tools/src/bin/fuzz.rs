use std::collections::VecDeque;

use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use worldgen::dungeon::{
    DungeonDefinition, FloorMap, FloorRange, GeneratorRegistry, PoolEntry, SpawnKind, SpawnTable,
};
use worldgen::types::{Pos, TileKind};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// World seeds drawn per strategy
    #[arg(short, long, default_value_t = 50)]
    rounds: u32,
    #[arg(short, long, default_value_t = 6)]
    floors: u32,
}

const STRATEGIES: [&str; 8] =
    ["rooms", "cellular", "grid_tunnels", "bsp", "circular", "concentric", "symmetric", "winding"];

fn fuzz_definition(generator: &str, rng: &mut ChaCha8Rng) -> DungeonDefinition {
    let mut definition = DungeonDefinition::new(format!("fuzz_{generator}"), generator);
    definition.map_size.width = 20 + (rng.next_u32() % 60) as usize;
    definition.map_size.height = 15 + (rng.next_u32() % 40) as usize;
    definition.map_size.growth_per_floor = (rng.next_u32() % 4) as usize;
    definition.enemy_pool = vec![
        PoolEntry::new("rat", FloorRange::new(1, 3), 5),
        PoolEntry::new("ghoul", FloorRange::new(2, 99), 2),
    ];
    definition.features = SpawnTable {
        min: 0,
        max: 3,
        entries: vec![PoolEntry::new("chest", FloorRange::default(), 1)],
    };
    definition.hazards = SpawnTable {
        min: 1,
        max: 2,
        entries: vec![PoolEntry::new("pit", FloorRange::default(), 1)],
    };
    definition
}

fn reachable(map: &FloorMap) -> usize {
    let index = |pos: Pos| pos.y as usize * map.width + pos.x as usize;
    let mut seen = vec![false; map.width * map.height];
    let mut queue = VecDeque::from([map.entry]);
    seen[index(map.entry)] = true;
    let mut count = 0;
    while let Some(pos) = queue.pop_front() {
        count += 1;
        for next in pos.neighbors() {
            if map.is_walkable(next) && !seen[index(next)] {
                seen[index(next)] = true;
                queue.push_back(next);
            }
        }
    }
    count
}

fn check_floor(map: &FloorMap) -> Result<(), String> {
    if map.count(TileKind::StairsDown) != 1 {
        return Err(format!("{} stairs down", map.count(TileKind::StairsDown)));
    }
    let expected_up = usize::from(map.floor_number > 1);
    if map.count(TileKind::StairsUp) != expected_up {
        return Err(format!("{} stairs up", map.count(TileKind::StairsUp)));
    }
    if !map.is_walkable(map.entry) {
        return Err("entry is not walkable".to_string());
    }
    let walkable = map.walkable_positions().len();
    let reached = reachable(map);
    if reached != walkable {
        return Err(format!("only {reached} of {walkable} walkable tiles reachable"));
    }
    for spawn in &map.spawns {
        if map.tile_at(spawn.pos) != TileKind::Floor {
            return Err(format!("{:?} {} on {:?}", spawn.kind, spawn.id, map.tile_at(spawn.pos)));
        }
        if spawn.kind == SpawnKind::Enemy && spawn.level.is_none_or(|level| level == 0) {
            return Err(format!("enemy {} without a level", spawn.id));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!(
        "Fuzzing {} strategies x {} seeds x {} floors from seed {}...",
        STRATEGIES.len(),
        args.rounds,
        args.floors,
        args.seed
    );

    let registry = GeneratorRegistry::with_builtin();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut failures = 0;
    let mut floors = 0;
    for generator in STRATEGIES {
        for _ in 0..args.rounds {
            let world_seed = rng.next_u64();
            let definition = fuzz_definition(generator, &mut rng);
            for floor_number in 1..=args.floors {
                let map = registry.generate_floor(&definition, floor_number, world_seed, None);
                floors += 1;
                if let Err(reason) = check_floor(&map) {
                    failures += 1;
                    println!(
                        "Invariant failed: {generator} seed {world_seed} floor {floor_number} \
                         ({}x{}): {reason}",
                        map.width, map.height
                    );
                }
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {floors} floors broke an invariant");
    }
    println!("Fuzzing completed successfully: {floors} floors checked.");
    Ok(())
}
