//! Read-only view of the content managers' resolved definitions.
//! Generation asks whether an id exists and reads a few numeric stats; it never parses
//! content itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Enemy,
    Item,
    Feature,
    Hazard,
    Structure,
}

pub mod stats {
    pub const SPAWN_WEIGHT: &str = "spawn_weight";
    pub const DAMAGE: &str = "damage";
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub id: String,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

impl StatBlock {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), stats: BTreeMap::new() }
    }

    pub fn with_stat(mut self, key: &str, value: f64) -> Self {
        self.stats.insert(key.to_string(), value);
        self
    }

    pub fn stat(&self, key: &str) -> Option<f64> {
        self.stats.get(key).copied()
    }
}

/// Injected in place of global content managers.
pub trait DefinitionLookup {
    fn get_definition(&self, kind: DefinitionKind, id: &str) -> Option<&StatBlock>;

    fn contains(&self, kind: DefinitionKind, id: &str) -> bool {
        self.get_definition(kind, id).is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRegistry {
    #[serde(default)]
    enemies: Vec<StatBlock>,
    #[serde(default)]
    items: Vec<StatBlock>,
    #[serde(default)]
    features: Vec<StatBlock>,
    #[serde(default)]
    hazards: Vec<StatBlock>,
    #[serde(default)]
    structures: Vec<StatBlock>,
}

impl ContentRegistry {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn insert(&mut self, kind: DefinitionKind, block: StatBlock) {
        let list = self.list_mut(kind);
        match list.iter_mut().find(|existing| existing.id == block.id) {
            Some(existing) => *existing = block,
            None => list.push(block),
        }
    }

    pub fn with(mut self, kind: DefinitionKind, block: StatBlock) -> Self {
        self.insert(kind, block);
        self
    }

    fn list(&self, kind: DefinitionKind) -> &[StatBlock] {
        match kind {
            DefinitionKind::Enemy => &self.enemies,
            DefinitionKind::Item => &self.items,
            DefinitionKind::Feature => &self.features,
            DefinitionKind::Hazard => &self.hazards,
            DefinitionKind::Structure => &self.structures,
        }
    }

    fn list_mut(&mut self, kind: DefinitionKind) -> &mut Vec<StatBlock> {
        match kind {
            DefinitionKind::Enemy => &mut self.enemies,
            DefinitionKind::Item => &mut self.items,
            DefinitionKind::Feature => &mut self.features,
            DefinitionKind::Hazard => &mut self.hazards,
            DefinitionKind::Structure => &mut self.structures,
        }
    }
}

impl DefinitionLookup for ContentRegistry {
    fn get_definition(&self, kind: DefinitionKind, id: &str) -> Option<&StatBlock> {
        self.list(kind).iter().find(|block| block.id == id)
    }
}
