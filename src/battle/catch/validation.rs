use crate::battle::state::{BattleState, BattleType, Side};
use schema::{ItemData, ItemId, SpeciesId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CatchError {
    /// Catch attempts are only allowed against wild combatants.
    #[error("only wild combatants can be caught")]
    NotWildBattle,
    /// Only the player throws capsules.
    #[error("only the player can attempt a catch")]
    NotPlayerSide,
    #[error("{0} has already fainted")]
    TargetFainted(SpeciesId),
    #[error("{0} is not a capsule")]
    NotACapsule(ItemId),
}

pub fn is_catch_allowed(battle_type: BattleType) -> bool {
    matches!(battle_type, BattleType::Wild)
}

/// Checks whether `side` may throw a capsule right now and returns the target species.
pub fn can_attempt_catch(state: &BattleState, side: Side) -> Result<SpeciesId, CatchError> {
    if !is_catch_allowed(state.battle_type) {
        return Err(CatchError::NotWildBattle);
    }
    if side != Side::Player {
        return Err(CatchError::NotPlayerSide);
    }

    let target = state.side(Side::Enemy).active();
    if target.is_fainted() {
        Err(CatchError::TargetFainted(target.species))
    } else {
        Ok(target.species)
    }
}

/// The catch-rate bonus of a capture item.
pub fn capsule_bonus(item: &ItemData) -> Result<u8, CatchError> {
    item.capsule_bonus().ok_or(CatchError::NotACapsule(item.id))
}
