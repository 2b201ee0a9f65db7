use crate::{ElementType, SkillEffect};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Physical,
    Special,
    Status,
}

/// Static definition of a skill as it appears in the content tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillData {
    pub id: SkillId,
    pub name: String,
    pub element: ElementType,
    pub category: SkillCategory,
    #[serde(default)]
    pub power: u16,
    /// 0 means the skill never misses.
    #[serde(default)]
    pub accuracy: u8,
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    /// Denominator of the critical hit roll. 0 disables critical hits.
    #[serde(default)]
    pub crit_rate: u16,
    #[serde(default)]
    pub effect: Option<SkillEffect>,
}

impl SkillData {
    /// Whether the damage formula produces a non-zero result for this skill.
    pub fn uses_damage_formula(&self) -> bool {
        self.category != SkillCategory::Status && self.power > 0
    }
}
