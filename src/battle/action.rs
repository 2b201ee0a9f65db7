use schema::{ItemId, SkillId};
use serde::{Deserialize, Serialize};

/// What a side chooses to do for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleAction {
    /// Use a known skill on the opposing active combatant.
    Skill { skill: SkillId },
    /// Throw a capture item at the wild combatant.
    Catch { item: ItemId },
    /// Swap the active combatant for the party member at `index`.
    Switch { index: usize },
    Escape,
}

impl BattleAction {
    /// Ordering tier. Higher tiers always act before lower ones, regardless of priority or speed.
    pub fn tier(&self) -> u8 {
        match self {
            BattleAction::Escape => 3,
            BattleAction::Catch { .. } => 2,
            BattleAction::Switch { .. } => 1,
            BattleAction::Skill { .. } => 0,
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, BattleAction::Switch { .. })
    }
}
