// In: src/battle/effects/stat_effects.rs

use super::{mismatch, EffectHandler, HookContext};
use crate::battle::state::Side;
use crate::errors::EffectDispatchError;
use schema::{EffectKind, SkillEffect};

/// Rolls once, then applies every listed stage change to one side.
pub struct StatChangeHandler;

impl EffectHandler for StatChangeHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::StatChange
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::StatChange {
            target,
            changes,
            chance,
        } = ctx.effect
        else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let side = ctx.side_of(*target);
        if ctx.combatant(side).is_fainted() || !ctx.roll_chance(*chance) {
            return Ok(());
        }
        for change in changes {
            ctx.change_stage(side, change.axis, change.delta);
        }
        Ok(())
    }
}

/// Resets every stage on both sides to neutral.
pub struct ClearAllStagesHandler;

impl EffectHandler for ClearAllStagesHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::ClearAllStages
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        for side in Side::BOTH {
            let changed = ctx.stages_mut(side).non_neutral();
            for (axis, _) in changed {
                ctx.set_stage(side, axis, 0);
            }
        }
        Ok(())
    }
}

/// The user takes every positive stage of the target.
pub struct BuffTransferHandler;

impl EffectHandler for BuffTransferHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::BuffTransfer
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        ctx.transfer_positive_stages(ctx.target, ctx.actor);
        Ok(())
    }
}
