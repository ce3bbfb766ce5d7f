mod common;

use proptest::prelude::*;
use worldgen::biome::BiomeField;
use worldgen::config::{BiomeConfig, StreamingConfig};
use worldgen::dungeon::generate_floor;
use worldgen::overworld::{CHUNK_SIZE, ChunkCoord, generate_chunk};
use worldgen::types::Pos;

#[test]
fn test_seed_42_chunk_origin_is_identical_across_calls() {
    let config = StreamingConfig::default();
    let first_field = BiomeField::new(42, BiomeConfig::default());
    let second_field = BiomeField::new(42, BiomeConfig::default());
    let first = generate_chunk(ChunkCoord::new(0, 0), 42, &first_field, &config);
    let second = generate_chunk(ChunkCoord::new(0, 0), 42, &second_field, &config);

    assert_eq!(first.tiles().len(), (CHUNK_SIZE * CHUNK_SIZE) as usize);
    assert_eq!(first.tiles(), second.tiles());
    assert_eq!(first.resources(), second.resources());
    assert_eq!(first.canonical_bytes(), second.canonical_bytes());
}

#[test]
fn test_chunk_output_does_not_depend_on_generation_order() {
    let config = StreamingConfig::default();
    let field = BiomeField::new(9, BiomeConfig::default());
    let coords = [ChunkCoord::new(1, 2), ChunkCoord::new(-3, 0), ChunkCoord::new(0, -1)];

    let fingerprint = |coord| generate_chunk(coord, 9, &field, &config).fingerprint();
    let forward: Vec<u64> = coords.iter().copied().map(fingerprint).collect();
    let mut backward: Vec<u64> = coords.iter().rev().copied().map(fingerprint).collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn test_dungeon_floors_are_byte_identical_per_seed_and_differ_across_seeds() {
    for generator in common::STRATEGIES {
        let definition = common::definition_for(generator);
        let first = generate_floor(&definition, 3, 1_000);
        let second = generate_floor(&definition, 3, 1_000);
        assert_eq!(first.canonical_bytes(), second.canonical_bytes(), "{generator}");
        assert_eq!(first, second);
    }

    let definition = common::definition_for("cellular");
    let one = generate_floor(&definition, 3, 1_000);
    let other = generate_floor(&definition, 3, 1_001);
    assert_ne!(one.fingerprint(), other.fingerprint());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_chunk_regeneration_is_stable(
        seed in any::<u64>(),
        x in -2_000i32..2_000,
        y in -2_000i32..2_000,
    ) {
        let config = StreamingConfig::default();
        let field = BiomeField::new(seed, BiomeConfig::default());
        let coord = ChunkCoord::new(x, y);
        let first = generate_chunk(coord, seed, &field, &config);
        let second = generate_chunk(coord, seed, &field, &config);
        prop_assert_eq!(first.fingerprint(), second.fingerprint());

        let mut positions: Vec<_> = first.resources().iter().map(|resource| resource.pos).collect();
        let total = positions.len();
        positions.sort();
        positions.dedup();
        prop_assert_eq!(positions.len(), total);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_any_chunk_coordinate_keeps_its_tiles_inside_the_chunk(
        seed in any::<u64>(),
        x in any::<i32>(),
        y in any::<i32>(),
    ) {
        let config = StreamingConfig::default();
        let field = BiomeField::new(seed, BiomeConfig { island: None, ..BiomeConfig::default() });
        let coord = ChunkCoord::new(x, y);
        let chunk = generate_chunk(coord, seed, &field, &config);

        let origin = coord.origin();
        prop_assert_eq!(ChunkCoord::containing(origin), coord);
        let far_corner = Pos::new(origin.x + (CHUNK_SIZE - 1), origin.y + (CHUNK_SIZE - 1));
        prop_assert_eq!(ChunkCoord::containing(far_corner), coord);

        let mut positions: Vec<_> = chunk.resources().iter().map(|resource| resource.pos).collect();
        let total = positions.len();
        positions.sort();
        positions.dedup();
        prop_assert_eq!(positions.len(), total);
        for pos in positions {
            prop_assert_eq!(ChunkCoord::containing(pos), coord);
        }
    }
}
