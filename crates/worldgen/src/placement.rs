//! One-shot placement of towns, dungeon entrances, and the player spawn for a new world.
//!
//! Every search is bounded by an attempt budget from [`PlacementConfig`] and ends in a usable
//! position: the best candidate seen, or a fixed fallback near the island centre. Placement never
//! fails; degraded results are logged and marked with [`PlacementQuality`].

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::biome::{BiomeField, BiomeId};
use crate::config::{PlacementConfig, WorldConfig};
use crate::seed::{
    DeterministicRng, ENTRANCE_PASS, SPAWN_PASS, TOWN_PASS, WorldSeed, derive_pass_seed,
};
use crate::types::Pos;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownDefinition {
    pub id: String,
    /// Empty means any land biome is acceptable.
    #[serde(default)]
    pub preferred_biomes: Vec<BiomeId>,
    #[serde(default)]
    pub requires_coast: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementClass {
    InTown,
    NearTown,
    Wilderness,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceDefinition {
    pub id: String,
    pub placement: PlacementClass,
    /// Anchor town for `in_town` / `near_town`; the primary town when absent or unknown.
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub preferred_biomes: Vec<BiomeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementQuality {
    /// Every constraint and preference met.
    Preferred,
    /// Hard constraints met, a preference (biome or coast) was given up.
    Relaxed,
    /// Attempt budget exhausted; a fixed fallback position was used.
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedFeature {
    pub id: String,
    pub pos: Pos,
    pub biome: BiomeId,
    pub quality: PlacementQuality,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldLayout {
    pub towns: Vec<PlacedFeature>,
    pub entrances: Vec<PlacedFeature>,
    pub player_spawn: Pos,
}

impl WorldLayout {
    pub fn primary_town(&self) -> Option<&PlacedFeature> {
        self.towns.first()
    }

    pub fn town(&self, id: &str) -> Option<&PlacedFeature> {
        self.towns.iter().find(|town| town.id == id)
    }

    pub fn entrance(&self, id: &str) -> Option<&PlacedFeature> {
        self.entrances.iter().find(|entrance| entrance.id == id)
    }
}

/// Radius around an anchor town inside which `in_town` entrances are placed.
const IN_TOWN_RADIUS: f64 = 6.0;
/// Distance multiples tried around the primary town when a secondary search comes up empty.
const FALLBACK_RINGS: [f64; 3] = [1.0, 1.5, 2.0];

struct Candidate {
    pos: Pos,
    biome: BiomeId,
    score: u32,
}

pub struct FeaturePlacer<'a> {
    world_seed: WorldSeed,
    field: &'a BiomeField,
    config: &'a PlacementConfig,
    center: Pos,
    radius: f64,
}

impl<'a> FeaturePlacer<'a> {
    pub fn new(world_seed: WorldSeed, field: &'a BiomeField, world: &'a WorldConfig) -> Self {
        let (center, radius) = world.island_bounds();
        Self { world_seed, field, config: &world.placement, center, radius }
    }

    /// The first town definition is the primary town.
    pub fn place(&self, towns: &[TownDefinition], entrances: &[EntranceDefinition]) -> WorldLayout {
        let placed_towns = self.place_towns(towns);
        let placed_entrances = self.place_entrances(entrances, &placed_towns);
        let player_spawn = self.place_player_spawn(&placed_towns, &placed_entrances);
        debug!(
            towns = placed_towns.len(),
            entrances = placed_entrances.len(),
            spawn_x = player_spawn.x,
            spawn_y = player_spawn.y,
            "world layout placed"
        );
        WorldLayout { towns: placed_towns, entrances: placed_entrances, player_spawn }
    }

    pub fn place_towns(&self, towns: &[TownDefinition]) -> Vec<PlacedFeature> {
        let mut rng = DeterministicRng::new(derive_pass_seed(self.world_seed, TOWN_PASS));
        let mut placed: Vec<PlacedFeature> = Vec::with_capacity(towns.len());
        for (index, town) in towns.iter().enumerate() {
            let feature = if index == 0 {
                self.place_primary_town(town)
            } else {
                self.place_secondary_town(town, &placed, &mut rng)
            };
            placed.push(feature);
        }
        placed
    }

    /// Walks square rings outward from the island centre and takes the first suitable tile.
    fn place_primary_town(&self, town: &TownDefinition) -> PlacedFeature {
        let step = self.config.spiral_step.max(1);
        let max_ring = (self.radius / f64::from(step)).ceil() as i32;
        let mut first_land: Option<(Pos, BiomeId)> = None;
        for ring in 0..=max_ring {
            for pos in ring_positions(self.center, ring * step, step) {
                let biome = self.field.classify_id(pos.x, pos.y);
                if biome.is_water() {
                    continue;
                }
                first_land.get_or_insert((pos, biome));
                if suits(&town.preferred_biomes, biome)
                    && (!town.requires_coast || self.near_coast(pos))
                {
                    return placed(&town.id, pos, biome, PlacementQuality::Preferred);
                }
            }
        }

        match first_land {
            Some((pos, biome)) => {
                warn!(town = %town.id, "no preferred site for primary town; using first land tile");
                placed(&town.id, pos, biome, PlacementQuality::Relaxed)
            }
            None => {
                warn!(town = %town.id, "island has no land; primary town placed at centre");
                let biome = self.field.classify_id(self.center.x, self.center.y);
                placed(&town.id, self.center, biome, PlacementQuality::Fallback)
            }
        }
    }

    fn place_secondary_town(
        &self,
        town: &TownDefinition,
        others: &[PlacedFeature],
        rng: &mut DeterministicRng,
    ) -> PlacedFeature {
        let spacing = self.config.town_min_spacing;
        let mut best: Option<Candidate> = None;
        let mut relaxed_logged = false;
        for attempt in 0..self.config.town_attempts {
            let pos = self.random_in_island(rng);
            let biome = self.field.classify_id(pos.x, pos.y);
            if biome.is_water() || too_close(pos, others, spacing) {
                continue;
            }
            let suitable = suits(&town.preferred_biomes, biome);
            if !suitable && attempt < self.config.relax_after {
                continue;
            }
            if !suitable && !relaxed_logged {
                debug!(town = %town.id, attempt, "relaxing biome preference");
                relaxed_logged = true;
            }
            let coastal = !town.requires_coast || self.near_coast(pos);
            let score = u32::from(suitable) * 2 + u32::from(coastal);
            if best.as_ref().is_none_or(|current| score > current.score) {
                best = Some(Candidate { pos, biome, score });
            }
            if score == 3 {
                break;
            }
        }

        if let Some(candidate) = best {
            let quality = if candidate.score == 3 {
                PlacementQuality::Preferred
            } else {
                PlacementQuality::Relaxed
            };
            return placed(&town.id, candidate.pos, candidate.biome, quality);
        }
        warn!(town = %town.id, attempts = self.config.town_attempts, "town search exhausted");
        self.fallback_near(&town.id, others, spacing)
    }

    /// Tries fixed offsets around the primary town; the last resort ignores terrain.
    fn fallback_near(&self, id: &str, others: &[PlacedFeature], spacing: f64) -> PlacedFeature {
        let anchor = others.first().map_or(self.center, |town| town.pos);
        for multiple in FALLBACK_RINGS {
            for direction in 0..8 {
                let angle = f64::from(direction) * TAU / 8.0;
                let pos = polar(anchor, spacing * multiple, angle);
                let biome = self.field.classify_id(pos.x, pos.y);
                if !biome.is_water() && !too_close(pos, others, spacing) {
                    return placed(id, pos, biome, PlacementQuality::Fallback);
                }
            }
        }
        let pos = polar(anchor, spacing * (others.len() as f64 + 1.0), 0.0);
        let biome = self.field.classify_id(pos.x, pos.y);
        placed(id, pos, biome, PlacementQuality::Fallback)
    }

    pub fn place_entrances(
        &self,
        entrances: &[EntranceDefinition],
        towns: &[PlacedFeature],
    ) -> Vec<PlacedFeature> {
        let mut rng = DeterministicRng::new(derive_pass_seed(self.world_seed, ENTRANCE_PASS));
        let mut placed_entrances: Vec<PlacedFeature> = Vec::with_capacity(entrances.len());
        for entrance in entrances {
            let feature = self.place_entrance(entrance, towns, &placed_entrances, &mut rng);
            placed_entrances.push(feature);
        }
        placed_entrances
    }

    fn place_entrance(
        &self,
        entrance: &EntranceDefinition,
        towns: &[PlacedFeature],
        others: &[PlacedFeature],
        rng: &mut DeterministicRng,
    ) -> PlacedFeature {
        let anchor = entrance
            .town
            .as_deref()
            .and_then(|id| towns.iter().find(|town| town.id == id))
            .or_else(|| towns.first())
            .map_or(self.center, |town| town.pos);
        let spacing = self.config.entrance_min_spacing;

        let mut best: Option<Candidate> = None;
        let mut any_land: Option<(Pos, BiomeId)> = None;
        for _ in 0..self.config.entrance_attempts {
            let pos = match entrance.placement {
                PlacementClass::InTown => {
                    let distance = rng.next_f64() * IN_TOWN_RADIUS;
                    polar(anchor, distance, rng.next_f64() * TAU)
                }
                PlacementClass::NearTown => {
                    let band = self.config.near_town_max - self.config.near_town_min;
                    let distance = self.config.near_town_min + rng.next_f64() * band;
                    polar(anchor, distance, rng.next_f64() * TAU)
                }
                PlacementClass::Wilderness => self.random_in_island(rng),
            };
            let biome = self.field.classify_id(pos.x, pos.y);
            if biome.is_water() || towns.iter().any(|town| town.pos == pos) {
                continue;
            }
            any_land.get_or_insert((pos, biome));
            if !self.satisfies_class(entrance.placement, pos, anchor, towns)
                || too_close(pos, others, spacing)
            {
                continue;
            }
            let score = u32::from(suits(&entrance.preferred_biomes, biome));
            if best.as_ref().is_none_or(|current| score > current.score) {
                best = Some(Candidate { pos, biome, score });
            }
            if score == 1 {
                break;
            }
        }

        if let Some(candidate) = best {
            let quality = if candidate.score == 1 {
                PlacementQuality::Preferred
            } else {
                PlacementQuality::Relaxed
            };
            return placed(&entrance.id, candidate.pos, candidate.biome, quality);
        }
        warn!(
            entrance = %entrance.id,
            class = ?entrance.placement,
            "entrance search exhausted; constraints dropped"
        );
        match any_land {
            Some((pos, biome)) => placed(&entrance.id, pos, biome, PlacementQuality::Fallback),
            None => {
                let pos = anchor.offset(1, 0);
                let biome = self.field.classify_id(pos.x, pos.y);
                placed(&entrance.id, pos, biome, PlacementQuality::Fallback)
            }
        }
    }

    fn satisfies_class(
        &self,
        class: PlacementClass,
        pos: Pos,
        anchor: Pos,
        towns: &[PlacedFeature],
    ) -> bool {
        match class {
            PlacementClass::InTown => pos.distance(anchor) <= IN_TOWN_RADIUS + 1.0,
            PlacementClass::NearTown => {
                let distance = pos.distance(anchor);
                distance >= self.config.near_town_min - 1.0
                    && distance <= self.config.near_town_max + 1.0
            }
            PlacementClass::Wilderness => towns
                .iter()
                .all(|town| town.pos.distance(pos) >= self.config.wilderness_min_town_distance),
        }
    }

    /// Opposite the first entrance, off the water; perpendicular offsets, then the town itself.
    pub fn place_player_spawn(&self, towns: &[PlacedFeature], entrances: &[PlacedFeature]) -> Pos {
        let town = towns.first().map_or(self.center, |town| town.pos);
        let distance = self.config.spawn_distance;
        let away = match entrances.first() {
            Some(entrance) if entrance.pos != town => {
                let dy = f64::from(town.y) - f64::from(entrance.pos.y);
                let dx = f64::from(town.x) - f64::from(entrance.pos.x);
                dy.atan2(dx)
            }
            _ => {
                let mut rng = DeterministicRng::new(derive_pass_seed(self.world_seed, SPAWN_PASS));
                rng.next_f64() * TAU
            }
        };

        let preferred = polar(town, distance, away);
        if self.field.is_walkable(preferred.x, preferred.y) {
            return preferred;
        }
        for step in 1..=4 {
            let offset = distance * f64::from(step) * 0.5;
            for side in [1.0, -1.0] {
                let pos = polar(preferred, offset, away + side * TAU / 4.0);
                if self.field.is_walkable(pos.x, pos.y) {
                    return pos;
                }
            }
        }
        warn!(town_x = town.x, town_y = town.y, "no dry spawn near primary town; spawning in town");
        town
    }

    fn random_in_island(&self, rng: &mut DeterministicRng) -> Pos {
        let distance = self.radius * rng.next_f64().sqrt();
        polar(self.center, distance, rng.next_f64() * TAU)
    }

    fn near_coast(&self, pos: Pos) -> bool {
        let radius = self.config.coastal_radius.max(1);
        let stride = (radius / 4).max(1) as usize;
        for dy in (-radius..=radius).step_by(stride) {
            for dx in (-radius..=radius).step_by(stride) {
                let neighbour = pos.offset(dx, dy);
                if self.field.classify_id(neighbour.x, neighbour.y).is_coastal() {
                    return true;
                }
            }
        }
        false
    }
}

fn placed(id: &str, pos: Pos, biome: BiomeId, quality: PlacementQuality) -> PlacedFeature {
    PlacedFeature { id: id.to_string(), pos, biome, quality }
}

fn suits(preferred: &[BiomeId], biome: BiomeId) -> bool {
    !biome.is_water() && (preferred.is_empty() || preferred.contains(&biome))
}

fn too_close(pos: Pos, others: &[PlacedFeature], spacing: f64) -> bool {
    others.iter().any(|other| other.pos.distance(pos) < spacing)
}

fn polar(origin: Pos, distance: f64, angle: f64) -> Pos {
    let dx = (distance * angle.cos()).round() as i32;
    let dy = (distance * angle.sin()).round() as i32;
    origin.offset(dx, dy)
}

/// Perimeter of the square ring at Chebyshev `radius`, sampled every `stride` tiles,
/// clockwise from the top-left corner.
pub(crate) fn ring_positions(center: Pos, radius: i32, stride: i32) -> Vec<Pos> {
    if radius == 0 {
        return vec![center];
    }
    let stride = stride.max(1) as usize;
    let mut positions = Vec::new();
    for x in (-radius..radius).step_by(stride) {
        positions.push(center.offset(x, -radius));
    }
    for y in (-radius..radius).step_by(stride) {
        positions.push(center.offset(radius, y));
    }
    for x in ((-radius + 1)..=radius).rev().step_by(stride) {
        positions.push(center.offset(x, radius));
    }
    for y in ((-radius + 1)..=radius).rev().step_by(stride) {
        positions.push(center.offset(-radius, y));
    }
    positions
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::BiomeConfig;

    const SEED: u64 = 1_000;

    fn town(id: &str, preferred: &[BiomeId]) -> TownDefinition {
        TownDefinition {
            id: id.to_string(),
            preferred_biomes: preferred.to_vec(),
            requires_coast: false,
        }
    }

    fn entrance(id: &str, placement: PlacementClass) -> EntranceDefinition {
        EntranceDefinition {
            id: id.to_string(),
            placement,
            town: None,
            preferred_biomes: Vec::new(),
        }
    }

    #[test]
    fn ring_positions_cover_perimeter_once() {
        let ring = ring_positions(Pos::new(0, 0), 3, 1);
        assert_eq!(ring.len(), 24);
        let unique: BTreeSet<Pos> = ring.iter().copied().collect();
        assert_eq!(unique.len(), 24);
        assert!(ring.iter().all(|pos| pos.chebyshev(Pos::new(0, 0)) == 3));
        assert_eq!(ring_positions(Pos::new(4, 4), 0, 2), vec![Pos::new(4, 4)]);
    }

    #[test]
    fn primary_town_sits_on_land() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let towns = placer.place_towns(&[town("haven", &[])]);
        assert_eq!(towns.len(), 1);
        assert!(!towns[0].biome.is_water());
        assert_eq!(towns[0].quality, PlacementQuality::Preferred);
    }

    #[test]
    fn water_only_preference_degrades_to_land() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let towns = placer.place_towns(&[
            town("reef", &[BiomeId::DeepOcean]),
            town("lagoon", &[BiomeId::Ocean]),
        ]);
        for placed in &towns {
            assert!(!field.classify_id(placed.pos.x, placed.pos.y).is_water());
            assert_ne!(placed.quality, PlacementQuality::Preferred);
        }
    }

    #[test]
    fn entrance_classes_respect_their_rings() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let layout = placer.place(
            &[town("haven", &[])],
            &[
                entrance("cellar", PlacementClass::InTown),
                entrance("barrow", PlacementClass::NearTown),
                entrance("deep_hollow", PlacementClass::Wilderness),
            ],
        );
        let haven = layout.primary_town().expect("one town").pos;
        let config = &world.placement;

        let cellar = layout.entrance("cellar").expect("placed");
        if cellar.quality != PlacementQuality::Fallback {
            assert!(cellar.pos.distance(haven) <= IN_TOWN_RADIUS + 1.0);
        }
        let barrow = layout.entrance("barrow").expect("placed");
        if barrow.quality != PlacementQuality::Fallback {
            let distance = barrow.pos.distance(haven);
            assert!(distance >= config.near_town_min - 1.0);
            assert!(distance <= config.near_town_max + 1.0);
            assert!(barrow.pos.distance(cellar.pos) >= config.entrance_min_spacing);
        }
        let hollow = layout.entrance("deep_hollow").expect("placed");
        if hollow.quality != PlacementQuality::Fallback {
            assert!(hollow.pos.distance(haven) >= config.wilderness_min_town_distance);
        }
        for entrance in &layout.entrances {
            assert!(!entrance.biome.is_water());
        }
    }

    #[test]
    fn spawn_is_dry_and_deterministic() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let towns = [town("haven", &[]), town("outpost", &[])];
        let entrances = [entrance("barrow", PlacementClass::NearTown)];
        let first = placer.place(&towns, &entrances);
        let second = placer.place(&towns, &entrances);
        assert_eq!(first, second);
        assert!(field.is_walkable(first.player_spawn.x, first.player_spawn.y));
    }

    #[test]
    fn spawn_faces_away_from_first_entrance() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let layout =
            placer.place(&[town("haven", &[])], &[entrance("barrow", PlacementClass::NearTown)]);
        let haven = layout.towns[0].pos;
        let barrow = layout.entrances[0].pos;
        let spawn = layout.player_spawn;
        if spawn != haven {
            let spacing = world.placement.spawn_distance;
            assert!(spawn.distance(barrow) > haven.distance(barrow) - spacing);
        }
    }

    #[test]
    fn empty_definitions_yield_spawn_near_centre() {
        let world = WorldConfig::default();
        let field = BiomeField::new(SEED, BiomeConfig::default());
        let placer = FeaturePlacer::new(SEED, &field, &world);
        let layout = placer.place(&[], &[]);
        assert!(layout.towns.is_empty());
        assert!(layout.entrances.is_empty());
        let reach = world.placement.spawn_distance * 3.0;
        assert!(layout.player_spawn.distance(Pos::new(0, 0)) <= reach);
    }
}
