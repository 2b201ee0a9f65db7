// In: src/battle/effects/status_effects.rs

use super::{mismatch, EffectHandler, HookContext};
use crate::battle::runtime::{RuntimeSlot, SlotParams};
use crate::battle::state::BattleEvent;
use crate::errors::EffectDispatchError;
use schema::{EffectKind, SkillEffect};

/// Hands a status condition to the status service.
pub struct InflictStatusHandler;

impl EffectHandler for InflictStatusHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::InflictStatus
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::InflictStatus {
            status,
            chance,
            turns,
            target,
        } = ctx.effect
        else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let side = ctx.side_of(*target);
        if ctx.combatant(side).is_fainted() || !ctx.roll_chance(*chance) {
            return Ok(());
        }

        let Some(service) = ctx.status_service() else {
            return Ok(());
        };
        if service.apply_status(side, *status, *turns) {
            ctx.log.push(BattleEvent::StatusApplied {
                side,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Stops the target's skill effects from running for a few turns.
pub struct SealHandler;

impl EffectHandler for SealHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::Seal
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::Seal { turns } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        if ctx.defender.is_fainted() {
            return Ok(());
        }
        ctx.apply_timed(ctx.target, RuntimeSlot::Seal, *turns, SlotParams::None);
        Ok(())
    }
}
