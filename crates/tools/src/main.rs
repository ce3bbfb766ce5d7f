use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldgen::biome::BiomeField;
use worldgen::config::WorldConfig;
use worldgen::dungeon::{DungeonDefinition, GeneratorRegistry};
use worldgen::overworld::{CHUNK_SIZE, Chunk, ChunkCoord, ResourceKind, generate_chunk};
use worldgen::placement::{EntranceDefinition, FeaturePlacer, TownDefinition};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed every generator derives from
    #[arg(short, long, default_value_t = 42, global = true)]
    seed: u64,
    /// TOML file overriding the biome, streaming, and placement settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one overworld chunk as ASCII
    Chunk {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i32,
    },
    /// Generate a dungeon floor from a JSON definition
    Floor {
        definition: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        floor: u32,
        /// Print the floor as JSON instead of a map
        #[arg(long)]
        json: bool,
    },
    /// Place towns and dungeon entrances from a JSON request
    World {
        request: PathBuf,
    },
}

#[derive(Deserialize)]
struct LayoutRequest {
    #[serde(default)]
    towns: Vec<TownDefinition>,
    #[serde(default)]
    entrances: Vec<EntranceDefinition>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let world = load_config(args.config.as_deref())?;

    match args.command {
        Command::Chunk { x, y } => {
            let field = BiomeField::new(args.seed, world.biome.clone());
            let chunk = generate_chunk(ChunkCoord::new(x, y), args.seed, &field, &world.streaming);
            print!("{}", render_chunk(&chunk));
            println!("Resources: {}", chunk.resources().len());
            println!("Fingerprint: {:016x}", chunk.fingerprint());
        }
        Command::Floor { definition, floor, json } => {
            let raw = fs::read_to_string(&definition).with_context(|| {
                format!("Failed to read dungeon definition: {}", definition.display())
            })?;
            let definition = DungeonDefinition::from_json_str(&raw)
                .with_context(|| "Failed to parse dungeon definition JSON")?;
            let map =
                GeneratorRegistry::default().generate_floor(&definition, floor, args.seed, None);
            info!(
                dungeon = %map.dungeon_id,
                floor = map.floor_number,
                generator = %map.generator,
                "floor ready"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                print!("{}", map.render());
                for spawn in &map.spawns {
                    println!(
                        "{:?} {} at ({}, {}) level {:?}",
                        spawn.kind, spawn.id, spawn.pos.x, spawn.pos.y, spawn.level
                    );
                }
                println!("Final floor: {}", definition.is_final_floor(floor, args.seed));
                println!("Fingerprint: {:016x}", map.fingerprint());
            }
        }
        Command::World { request } => {
            let raw = fs::read_to_string(&request)
                .with_context(|| format!("Failed to read layout request: {}", request.display()))?;
            let request: LayoutRequest =
                serde_json::from_str(&raw).with_context(|| "Failed to parse layout request JSON")?;
            let field = BiomeField::new(args.seed, world.biome.clone());
            let placer = FeaturePlacer::new(args.seed, &field, &world);
            let layout = placer.place(&request.towns, &request.entrances);
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read world config: {}", path.display()))?;
    WorldConfig::from_toml_str(&raw)
        .with_context(|| format!("Invalid world config: {}", path.display()))
}

fn render_chunk(chunk: &Chunk) -> String {
    let size = CHUNK_SIZE as usize;
    let mut rows: Vec<Vec<char>> = (0..size)
        .map(|y| (0..size).map(|x| chunk.local_tile(x, y).glyph).collect())
        .collect();
    let origin = chunk.coord.origin();
    for resource in chunk.resources() {
        let (x, y) = ((resource.pos.x - origin.x) as usize, (resource.pos.y - origin.y) as usize);
        rows[y][x] = match resource.kind {
            ResourceKind::Tree => 'T',
            ResourceKind::Rock => 'o',
            ResourceKind::OreVein => '*',
        };
    }
    let mut out = String::with_capacity((size + 1) * size);
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}
