// In: src/battle/effects/damage_effects.rs

use super::{mismatch, DamagePlan, EffectHandler, HookContext};
use crate::battle::runtime::{percent_of, RuntimeSlot, SlotParams};
use crate::battle::state::{BattleEvent, HpCause};
use crate::errors::EffectDispatchError;
use schema::{EffectKind, SkillEffect};

// --- DAMAGE PLAN REWRITES (before_damage) ---

/// Replaces formula damage with a flat amount.
pub struct FixedDamageHandler;

impl EffectHandler for FixedDamageHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::FixedDamage
    }

    fn before_damage(&self, ctx: &mut HookContext<'_>, plan: &mut DamagePlan) -> Result<(), EffectDispatchError> {
        let SkillEffect::FixedDamage { amount } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        plan.fixed_amount = Some(*amount);
        Ok(())
    }
}

/// Damage equal to the attacker's level.
pub struct LevelDamageHandler;

impl EffectHandler for LevelDamageHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::LevelDamage
    }

    fn before_damage(&self, ctx: &mut HookContext<'_>, plan: &mut DamagePlan) -> Result<(), EffectDispatchError> {
        plan.fixed_amount = Some(ctx.attacker.level as u16);
        Ok(())
    }
}

pub struct MultiHitHandler;

impl EffectHandler for MultiHitHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::MultiHit
    }

    fn before_damage(&self, ctx: &mut HookContext<'_>, plan: &mut DamagePlan) -> Result<(), EffectDispatchError> {
        let SkillEffect::MultiHit { min, max } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let hits = if min < max {
            ctx.rng.int_in(*min as u32, *max as u32, "multi_hit") as u8
        } else {
            *min
        };
        plan.hits = hits.max(1);
        Ok(())
    }
}

/// Leaves the target with at least 1 HP.
pub struct EnduringStrikeHandler;

impl EffectHandler for EnduringStrikeHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::EnduringStrike
    }

    fn before_damage(&self, _ctx: &mut HookContext<'_>, plan: &mut DamagePlan) -> Result<(), EffectDispatchError> {
        plan.min_target_hp = plan.min_target_hp.max(1);
        Ok(())
    }
}

pub struct NeutralStrikeHandler;

impl EffectHandler for NeutralStrikeHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::NeutralStrike
    }

    fn before_damage(&self, _ctx: &mut HookContext<'_>, plan: &mut DamagePlan) -> Result<(), EffectDispatchError> {
        plan.neutral_effectiveness = true;
        Ok(())
    }
}

// --- HP EFFECTS ON HIT ---

/// The user heals a percentage of its max HP.
pub struct HealHandler;

impl EffectHandler for HealHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::Heal
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::Heal { percent } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let amount = percent_of(ctx.attacker.max_hp(), *percent as u32);
        ctx.heal(ctx.actor, amount, HpCause::Heal);
        Ok(())
    }
}

/// Both combatants end at the floored average of their HP.
pub struct EqualizeHpHandler;

impl EffectHandler for EqualizeHpHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::EqualizeHp
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        if ctx.attacker.is_fainted() || ctx.defender.is_fainted() {
            return Ok(());
        }
        let average =
            ((ctx.attacker.current_hp() as u32 + ctx.defender.current_hp() as u32) / 2) as u16;

        for side in [ctx.actor, ctx.target] {
            let current = ctx.combatant(side).current_hp();
            if average < current {
                ctx.damage(side, current - average, HpCause::Equalize);
            } else if average > current {
                ctx.heal(side, average - current, HpCause::Equalize);
            }
        }
        Ok(())
    }
}

// --- AFTER DAMAGE ---

pub struct DrainHandler;

impl EffectHandler for DrainHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::Drain
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::Drain { percent } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        ctx.heal(ctx.actor, percent_of(dealt, *percent as u32), HpCause::Drain);
        Ok(())
    }
}

pub struct RecoilHandler;

impl EffectHandler for RecoilHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::Recoil
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::Recoil { percent } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        ctx.damage(ctx.actor, percent_of(dealt, *percent as u32), HpCause::Recoil);
        Ok(())
    }
}

/// A flat extra hit after the main damage.
pub struct BonusDamageHandler;

impl EffectHandler for BonusDamageHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::BonusDamage
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, _dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::BonusDamage { amount } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        ctx.damage(ctx.target, *amount, HpCause::Bonus);
        Ok(())
    }
}

/// Fixed damage that grows by `step` each time the same side uses the same skill.
pub struct EscalatingDamageHandler;

impl EffectHandler for EscalatingDamageHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::EscalatingDamage
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, _dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::EscalatingDamage { base, step } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let uses = ctx.runtime.escalate(ctx.actor, ctx.skill.id);
        let amount = (*base as u32 + *step as u32 * uses).min(u16::MAX as u32) as u16;
        ctx.damage(ctx.target, amount, HpCause::Bonus);
        Ok(())
    }
}

/// Recoil, then the user takes the target's stat boosts.
pub struct RecoilTransferHandler;

impl EffectHandler for RecoilTransferHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::RecoilTransfer
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::RecoilTransfer { percent } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        ctx.damage(ctx.actor, percent_of(dealt, *percent as u32), HpCause::Recoil);
        ctx.transfer_positive_stages(ctx.target, ctx.actor);
        Ok(())
    }
}

/// Strips the target's timed effects, blocks its healing, then drains.
pub struct PurgeDrainHandler;

impl EffectHandler for PurgeDrainHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::PurgeDrain
    }

    fn after_damage(&self, ctx: &mut HookContext<'_>, dealt: u16) -> Result<(), EffectDispatchError> {
        let SkillEffect::PurgeDrain {
            percent,
            no_heal_turns,
        } = ctx.effect
        else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let target = ctx.target;
        for effect in ctx.runtime.side_mut(target).purge() {
            ctx.log.push(BattleEvent::EffectExpired {
                side: target,
                effect,
            });
        }
        ctx.apply_timed(target, RuntimeSlot::NoHeal, *no_heal_turns, SlotParams::None);
        ctx.heal(ctx.actor, percent_of(dealt, *percent as u32), HpCause::Drain);
        Ok(())
    }
}
