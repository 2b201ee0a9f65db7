//! The content lookup service. The engine reads skill, species and item
//! definitions and the type chart through [`ContentLookup`] and never owns them.

use crate::errors::{ContentError, ContentResult};
use schema::{ElementType, ItemData, ItemId, SkillData, SkillId, SpeciesData, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub trait ContentLookup {
    fn skill(&self, id: SkillId) -> Option<&SkillData>;
    fn species(&self, id: SpeciesId) -> Option<&SpeciesData>;
    fn item(&self, id: ItemId) -> Option<&ItemData>;
    /// Multiplier in {0, 0.5, 1, 2} for an attacking element against a defending one.
    fn type_effectiveness(&self, attack: ElementType, defend: ElementType) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeMatchup {
    pub attack: ElementType,
    pub defend: ElementType,
    pub multiplier: f64,
}

/// Serialized form of the content tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTables {
    #[serde(default)]
    pub skills: Vec<SkillData>,
    #[serde(default)]
    pub species: Vec<SpeciesData>,
    #[serde(default)]
    pub items: Vec<ItemData>,
    /// Overrides on top of the built-in chart.
    #[serde(default)]
    pub type_chart: Vec<TypeMatchup>,
}

/// In-memory lookup service built from [`ContentTables`].
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    skills: HashMap<SkillId, SkillData>,
    species: HashMap<SpeciesId, SpeciesData>,
    items: HashMap<ItemId, ItemData>,
    chart_overrides: HashMap<(ElementType, ElementType), f64>,
}

impl StaticContent {
    pub fn new(tables: ContentTables) -> Self {
        let mut content = StaticContent::default();

        for skill in tables.skills {
            if let Some(previous) = content.skills.insert(skill.id, skill) {
                warn!(target: "battle::content", id = %previous.id, "duplicate skill id; last definition wins");
            }
        }
        for species in tables.species {
            if let Some(previous) = content.species.insert(species.id, species) {
                warn!(target: "battle::content", id = %previous.id, "duplicate species id; last definition wins");
            }
        }
        for item in tables.items {
            if let Some(previous) = content.items.insert(item.id, item) {
                warn!(target: "battle::content", id = %previous.id, "duplicate item id; last definition wins");
            }
        }
        for matchup in tables.type_chart {
            content
                .chart_overrides
                .insert((matchup.attack, matchup.defend), matchup.multiplier);
        }

        debug!(
            target: "battle::content",
            skills = content.skills.len(),
            species = content.species.len(),
            items = content.items.len(),
            "content tables loaded"
        );
        content
    }

    pub fn from_ron_str(source: &str) -> ContentResult<Self> {
        let tables: ContentTables = ron::from_str(source)?;
        Ok(Self::new(tables))
    }

    pub fn load(path: impl AsRef<Path>) -> ContentResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }
}

impl ContentLookup for StaticContent {
    fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.get(&id)
    }

    fn species(&self, id: SpeciesId) -> Option<&SpeciesData> {
        self.species.get(&id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemData> {
        self.items.get(&id)
    }

    fn type_effectiveness(&self, attack: ElementType, defend: ElementType) -> f64 {
        self.chart_overrides
            .get(&(attack, defend))
            .copied()
            .unwrap_or_else(|| ElementType::default_effectiveness(attack, defend))
    }
}
