use crate::battle::state::BattleType;
use crate::combatant::Combatant;
use crate::config::EngineConfig;
use crate::stats::add_effort_value;
use schema::{StatAxis, StatBlock};
use strum::IntoEnumIterator;

/// Calculator for experience and EV rewards from a defeated combatant.
pub struct RewardCalculator;

impl RewardCalculator {
    /// Experience for defeating an enemy: `level * exp_per_enemy_level`,
    /// multiplied (and floored) for trainer battles.
    pub fn experience_for(&self, enemy_level: u8, battle_type: BattleType, config: &EngineConfig) -> u32 {
        let base = enemy_level as u32 * config.exp_per_enemy_level;
        match battle_type {
            BattleType::Wild => base,
            BattleType::Trainer => (base as f64 * config.trainer_exp_multiplier).floor() as u32,
        }
    }

    /// The non-zero entries of a yield table, in axis order.
    pub fn effort_yield(&self, yield_table: &StatBlock<u8>) -> Vec<(StatAxis, u8)> {
        StatAxis::iter()
            .map(|axis| (axis, yield_table.get(axis)))
            .filter(|(_, amount)| *amount > 0)
            .collect()
    }

    /// Grants the defeated combatant's EV yield to `recipient`.
    /// Returns what was actually applied after the caps, omitting axes that gained nothing.
    pub fn grant_effort(&self, recipient: &mut Combatant, defeated: &Combatant) -> Vec<(StatAxis, u8)> {
        self.effort_yield(&defeated.ev_yield)
            .into_iter()
            .filter_map(|(axis, amount)| {
                let applied = add_effort_value(recipient, axis, amount);
                (applied > 0).then_some((axis, applied))
            })
            .collect()
    }
}
