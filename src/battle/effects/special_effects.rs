// In: src/battle/effects/special_effects.rs

use super::{mismatch, EffectHandler, HookContext};
use crate::battle::runtime::{CompositeBuff, RuntimeSlot, SlotParams};
use crate::battle::state::BattleEvent;
use crate::errors::EffectDispatchError;
use schema::{EffectKind, SkillEffect};

/// Effect kinds that install a single timed slot on one side.
pub const TIMED_KINDS: [EffectKind; 10] = [
    EffectKind::Protect,
    EffectKind::VoidShield,
    EffectKind::DamageOverTime,
    EffectKind::Parasitism,
    EffectKind::Regen,
    EffectKind::GuaranteedCrit,
    EffectKind::FirstStrike,
    EffectKind::DamageBoost,
    EffectKind::ImmuneDamage,
    EffectKind::NoHeal,
];

/// One handler per timed kind; the wrapped kind is the one it answers for.
pub struct TimedEffectHandler(pub EffectKind);

impl EffectHandler for TimedEffectHandler {
    fn kind(&self) -> EffectKind {
        self.0
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        if ctx.effect.kind() != self.0 {
            return Err(mismatch(self.0, ctx.effect));
        }
        let (user, target) = (ctx.actor, ctx.target);

        let (side, slot, turns, params) = match *ctx.effect {
            SkillEffect::Protect { turns } => (user, RuntimeSlot::Protection, turns, SlotParams::None),
            SkillEffect::VoidShield {
                turns,
                first_strike_only,
            } => (
                user,
                RuntimeSlot::VoidShield,
                turns,
                SlotParams::Shield { first_strike_only },
            ),
            SkillEffect::DamageOverTime { amount, turns } => {
                (target, RuntimeSlot::DamageOverTime, turns, SlotParams::Amount(amount))
            }
            SkillEffect::Parasitism { percent, turns } => (
                target,
                RuntimeSlot::Parasitism,
                turns,
                SlotParams::Parasite {
                    percent,
                    source: user,
                },
            ),
            SkillEffect::Regen { percent, turns } => (
                user,
                RuntimeSlot::Regen,
                turns,
                SlotParams::Percent(percent as u16),
            ),
            SkillEffect::GuaranteedCrit { turns } => {
                (user, RuntimeSlot::GuaranteedCrit, turns, SlotParams::None)
            }
            SkillEffect::FirstStrike { bonus, turns } => (
                user,
                RuntimeSlot::FirstStrike,
                turns,
                SlotParams::PriorityBonus(bonus),
            ),
            SkillEffect::DamageBoost { percent, turns } => (
                user,
                RuntimeSlot::DamageMultiplier,
                turns,
                SlotParams::Percent(percent),
            ),
            SkillEffect::ImmuneDamage { turns } => (user, RuntimeSlot::ImmuneDamage, turns, SlotParams::None),
            SkillEffect::NoHeal { turns } => (target, RuntimeSlot::NoHeal, turns, SlotParams::None),
            _ => return Err(mismatch(self.0, ctx.effect)),
        };

        if side == target && ctx.defender.is_fainted() {
            return Ok(());
        }
        ctx.apply_timed(side, slot, turns, params);
        Ok(())
    }
}

/// Battle-wide field effects, owned by the side that set them.
pub struct FieldHandler;

impl EffectHandler for FieldHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::Field
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::Field { field, turns } = ctx.effect else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        if ctx.runtime.set_field(*field, *turns, ctx.actor) {
            ctx.log.push(BattleEvent::EffectApplied {
                side: ctx.actor,
                effect: EffectKind::Field,
            });
        }
        Ok(())
    }
}

pub struct CompositeBuffHandler;

impl EffectHandler for CompositeBuffHandler {
    fn kind(&self) -> EffectKind {
        EffectKind::CompositeBuff
    }

    fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        let SkillEffect::CompositeBuff {
            label,
            turns,
            regen_percent,
            damage_percent,
        } = ctx.effect
        else {
            return Err(mismatch(self.kind(), ctx.effect));
        };
        let buff = CompositeBuff {
            label: label.clone(),
            turns_left: *turns,
            regen_percent: *regen_percent,
            damage_percent: *damage_percent,
        };
        if ctx.runtime.side_mut(ctx.actor).add_composite(buff) {
            ctx.log.push(BattleEvent::EffectApplied {
                side: ctx.actor,
                effect: EffectKind::CompositeBuff,
            });
        }
        Ok(())
    }
}
