//! Deterministic seed mixing and the seeded pseudo-random stream every generator draws from.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use xxhash_rust::xxh3::xxh3_64;

pub type WorldSeed = u64;

/// Fixed discriminators for the one-shot placement passes.
pub const TOWN_PASS: u64 = 0x0107;
pub const ENTRANCE_PASS: u64 = 0x0211;
pub const SPAWN_PASS: u64 = 0x0313;
pub const NOISE_ELEVATION_PASS: u64 = 0x0419;
pub const NOISE_MOISTURE_PASS: u64 = 0x0523;
pub const DUNGEON_DEPTH_PASS: u64 = 0x0629;

const CHUNK_COORD_OFFSET: i64 = 1 << 31;

pub fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

fn finalize(mut mixed: u64) -> u64 {
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

/// Stable across platforms and releases, unlike `DefaultHasher`.
pub fn string_hash(value: &str) -> u64 {
    xxh3_64(value.as_bytes())
}

/// Offsets both coordinates into the non-negative range, then Cantor-pairs them.
pub fn pair_coords(x: i32, y: i32) -> u128 {
    let a = (i64::from(x) + CHUNK_COORD_OFFSET) as u128;
    let b = (i64::from(y) + CHUNK_COORD_OFFSET) as u128;
    (a + b) * (a + b + 1) / 2 + b
}

pub fn derive_chunk_seed(world_seed: WorldSeed, chunk_x: i32, chunk_y: i32) -> u64 {
    let paired = pair_coords(chunk_x, chunk_y);
    let folded = (paired as u64) ^ ((paired >> 64) as u64).rotate_left(29);
    finalize(mix_seed_stream(world_seed, folded))
}

pub fn derive_floor_seed(world_seed: WorldSeed, dungeon_id: &str, floor_number: u32) -> u64 {
    let mut mixed = world_seed ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= u64::from(floor_number).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= string_hash(dungeon_id).wrapping_mul(0x94D0_49BB_1331_11EB);
    finalize(mixed)
}

pub fn derive_pass_seed(world_seed: WorldSeed, pass: u64) -> u64 {
    finalize(mix_seed_stream(world_seed, pass))
}

/// A reproducible random stream. Every call site builds its own from an explicit seed.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: ChaCha8Rng,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    /// Uniform in `[lo, hi)`. Returns `lo` when the range is empty.
    pub fn range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = hi.abs_diff(lo);
        lo.wrapping_add(self.below(span) as i64)
    }

    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        self.range(i64::from(lo), i64::from(hi)) as i32
    }

    /// Uniform in `[lo, hi]`.
    pub fn range_inclusive_usize(&mut self, lo: usize, hi: usize) -> usize {
        debug_assert!(lo <= hi);
        lo + self.below((hi - lo) as u64 + 1) as usize
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let swap_with = self.below(index as u64 + 1) as usize;
            items.swap(index, swap_with);
        }
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.below(items.len() as u64) as usize;
        items.get(index)
    }

    /// Index chosen with probability proportional to its weight; `None` if every weight is zero.
    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&weight| u64::from(weight)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.below(total);
        for (index, &weight) in weights.iter().enumerate() {
            let weight = u64::from(weight);
            if roll < weight {
                return Some(index);
            }
            roll -= weight;
        }
        None
    }

    fn below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let value = self.next_u64();
            if value < zone {
                return value % bound;
            }
        }
    }
}
