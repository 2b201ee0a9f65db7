use crate::{ElementType, SkillId, StatBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "species#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnableSkill {
    pub level: u8,
    pub skill: SkillId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub into: SpeciesId,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    pub element: ElementType,
    pub base_stats: StatBlock<u16>,
    #[serde(default)]
    pub learnset: Vec<LearnableSkill>,
    #[serde(default)]
    pub evolution: Option<EvolutionRule>,
    pub catch_rate: u8,
    #[serde(default)]
    pub ev_yield: StatBlock<u8>,
}

impl SpeciesData {
    /// The last `limit` distinct skills learnable at or below `level`.
    pub fn default_skills(&self, level: u8, limit: usize) -> Vec<SkillId> {
        let mut known: Vec<SkillId> = Vec::new();
        for entry in self.learnset.iter().filter(|entry| entry.level <= level) {
            if !known.contains(&entry.skill) {
                known.push(entry.skill);
            }
        }
        let skip = known.len().saturating_sub(limit);
        known.into_iter().skip(skip).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A capture device; `bonus` is added to the catch rate.
    Capsule { bonus: u8 },
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
}

impl ItemData {
    pub fn capsule_bonus(&self) -> Option<u8> {
        match self.kind {
            ItemKind::Capsule { bonus } => Some(bonus),
            ItemKind::Other => None,
        }
    }
}
