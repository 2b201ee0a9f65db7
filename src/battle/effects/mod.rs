// In: src/battle/effects/mod.rs

// --- 1. DECLARE HANDLER MODULES ---
mod damage_effects;
mod special_effects;
mod stat_effects;
mod status_effects;

// --- 2. IMPORTS ---
use crate::battle::runtime::{EffectRuntime, RuntimeSlot, SlotParams};
use crate::battle::stages::StatStages;
use crate::battle::state::{BattleEvent, EventLog, HpCause, Side};
use crate::combatant::Combatant;
use crate::config::EngineConfig;
use crate::errors::EffectDispatchError;
use crate::rng::RandomSource;
use crate::services::{ServiceWarnings, StatusService};
use schema::{EffectKind, EffectTarget, FieldKind, SkillData, SkillEffect, StageAxis};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub use self::damage_effects::*;
pub use self::special_effects::*;
pub use self::stat_effects::*;
pub use self::status_effects::*;

// --- 3. HOOK DATA STRUCTURES ---

/// The pending damage of a skill, as the `before_damage` hooks leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamagePlan {
    /// Skip damage and every later hook.
    pub cancelled: bool,
    /// Replaces the formula with a flat amount per hit.
    pub fixed_amount: Option<u16>,
    pub hits: u8,
    /// The target cannot be brought below this HP by this skill.
    pub min_target_hp: u16,
    /// Type effectiveness is treated as 1.
    pub neutral_effectiveness: bool,
}

impl Default for DamagePlan {
    fn default() -> Self {
        Self {
            cancelled: false,
            fixed_amount: None,
            hits: 1,
            min_target_hp: 0,
            neutral_effectiveness: false,
        }
    }
}

/// Everything a hook may read or mutate. Built fresh by the executor for each hook call.
pub struct HookContext<'a> {
    pub actor: Side,
    pub target: Side,
    pub skill: &'a SkillData,
    pub effect: &'a SkillEffect,
    pub attacker: &'a mut Combatant,
    pub defender: &'a mut Combatant,
    pub attacker_stages: &'a mut StatStages,
    pub defender_stages: &'a mut StatStages,
    pub runtime: &'a mut EffectRuntime,
    pub status: Option<&'a mut (dyn StatusService + 'static)>,
    pub rng: &'a mut dyn RandomSource,
    pub log: &'a mut EventLog,
    pub warnings: &'a mut ServiceWarnings,
    pub config: &'a EngineConfig,
}

impl<'a> HookContext<'a> {
    pub fn side_of(&self, target: EffectTarget) -> Side {
        match target {
            EffectTarget::User => self.actor,
            EffectTarget::Opponent => self.target,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        if side == self.actor {
            &*self.attacker
        } else {
            &*self.defender
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        if side == self.actor {
            &mut *self.attacker
        } else {
            &mut *self.defender
        }
    }

    pub fn stages_mut(&mut self, side: Side) -> &mut StatStages {
        if side == self.actor {
            &mut *self.attacker_stages
        } else {
            &mut *self.defender_stages
        }
    }

    /// Secondary-effect roll. A chance of 100 or more never consumes a roll.
    pub fn roll_chance(&mut self, percent: u8) -> bool {
        self.rng.chance(percent, "effect_chance")
    }

    /// Heals `side`, unless it is fainted or under a no-heal block. Returns the amount healed.
    pub fn heal(&mut self, side: Side, amount: u16, cause: HpCause) -> u16 {
        if amount == 0 || self.runtime.side(side).blocks_healing() {
            return 0;
        }
        let combatant = self.combatant_mut(side);
        let old_hp = combatant.current_hp();
        let healed = combatant.heal(amount);
        let (new_hp, max_hp) = (combatant.current_hp(), combatant.max_hp());
        if healed > 0 {
            self.log.push(BattleEvent::HpChanged {
                side,
                old_hp,
                new_hp,
                max_hp,
                cause,
            });
        }
        healed
    }

    /// Damages `side`. Returns the amount actually lost.
    pub fn damage(&mut self, side: Side, amount: u16, cause: HpCause) -> u16 {
        let combatant = self.combatant_mut(side);
        if amount == 0 || combatant.is_fainted() {
            return 0;
        }
        let old_hp = combatant.current_hp();
        let dealt = combatant.take_damage(amount);
        let (new_hp, max_hp) = (combatant.current_hp(), combatant.max_hp());
        self.log.push(BattleEvent::HpChanged {
            side,
            old_hp,
            new_hp,
            max_hp,
            cause,
        });
        dealt
    }

    /// Shifts a stage of `side`, honouring Mist for drops caused by the other side.
    /// Returns the new stage, or `None` when the change was blocked or had no effect.
    pub fn change_stage(&mut self, side: Side, axis: StageAxis, delta: i8) -> Option<i8> {
        let mist_guarded = self
            .runtime
            .field(FieldKind::Mist)
            .is_some_and(|entry| entry.owner == side);
        if delta < 0 && side != self.actor && mist_guarded {
            self.log.push(BattleEvent::StatChangeBlocked {
                side,
                axis,
                reason: "protected by mist".to_string(),
            });
            return None;
        }

        let (old_stage, new_stage) = self.stages_mut(side).modify(axis, delta);
        if old_stage == new_stage {
            return None;
        }
        self.log.push(BattleEvent::StatChanged {
            side,
            axis,
            old_stage,
            new_stage,
        });
        Some(new_stage)
    }

    /// Sets a stage directly, emitting `stat_changed` when it moves.
    pub fn set_stage(&mut self, side: Side, axis: StageAxis, stage: i8) {
        let old_stage = self.stages_mut(side).get(axis);
        let new_stage = self.stages_mut(side).set(axis, stage);
        if old_stage != new_stage {
            self.log.push(BattleEvent::StatChanged {
                side,
                axis,
                old_stage,
                new_stage,
            });
        }
    }

    /// Installs a timed slot on `side` and announces it.
    pub fn apply_timed(&mut self, side: Side, slot: RuntimeSlot, turns: u8, params: SlotParams) -> bool {
        let kind = self.effect.kind();
        if !self.runtime.side_mut(side).set(slot, turns, params) {
            return false;
        }
        self.log.push(BattleEvent::EffectApplied { side, effect: kind });
        true
    }

    /// Moves every positive stage of `from` onto `to`.
    pub fn transfer_positive_stages(&mut self, from: Side, to: Side) {
        let stolen = if from == self.actor {
            self.attacker_stages.positive()
        } else {
            self.defender_stages.positive()
        };
        for (axis, stage) in stolen {
            self.set_stage(from, axis, 0);
            let current = self.stages_mut(to).get(axis);
            self.set_stage(to, axis, current.saturating_add(stage));
        }
    }

    /// The status service, or a one-time warning when none is configured.
    pub fn status_service(&mut self) -> Option<&mut (dyn StatusService + 'static)> {
        if self.status.is_none() {
            self.warnings.missing("status");
        }
        self.status.as_deref_mut()
    }
}

pub(crate) fn mismatch(expected: EffectKind, found: &SkillEffect) -> EffectDispatchError {
    EffectDispatchError::PayloadMismatch {
        expected,
        found: found.kind(),
    }
}

// --- 4. THE HANDLER TRAIT ---

/// A skill-effect handler. Each hook defaults to a no-op; a handler overrides
/// only the phases its effect participates in.
pub trait EffectHandler {
    fn kind(&self) -> EffectKind;

    fn before_damage(
        &self,
        _ctx: &mut HookContext<'_>,
        _plan: &mut DamagePlan,
    ) -> Result<(), EffectDispatchError> {
        Ok(())
    }

    fn on_hit(&self, _ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        Ok(())
    }

    fn after_damage(&self, _ctx: &mut HookContext<'_>, _dealt: u16) -> Result<(), EffectDispatchError> {
        Ok(())
    }
}

// --- 5. THE REGISTRY ---

/// Maps each effect kind to its handler. Lookups that find nothing are
/// reported as [`EffectDispatchError::UnhandledKind`] and never abort a turn.
#[derive(Default)]
pub struct EffectRegistry {
    handlers: HashMap<EffectKind, Box<dyn EffectHandler>>,
    reported: HashSet<EffectKind>,
}

impl EffectRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with a handler for every built-in effect kind.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        // Damage plan and HP effects
        registry.register(FixedDamageHandler);
        registry.register(LevelDamageHandler);
        registry.register(MultiHitHandler);
        registry.register(EnduringStrikeHandler);
        registry.register(NeutralStrikeHandler);
        registry.register(HealHandler);
        registry.register(EqualizeHpHandler);
        registry.register(DrainHandler);
        registry.register(RecoilHandler);
        registry.register(BonusDamageHandler);
        registry.register(EscalatingDamageHandler);
        registry.register(RecoilTransferHandler);
        registry.register(PurgeDrainHandler);

        // Stages
        registry.register(StatChangeHandler);
        registry.register(ClearAllStagesHandler);
        registry.register(BuffTransferHandler);

        // Status
        registry.register(InflictStatusHandler);
        registry.register(SealHandler);

        // Timed, field and composite effects
        for kind in TIMED_KINDS {
            registry.register(TimedEffectHandler(kind));
        }
        registry.register(FieldHandler);
        registry.register(CompositeBuffHandler);

        registry
    }

    /// Registers a handler under its own kind, returning the one it replaced.
    pub fn register(&mut self, handler: impl EffectHandler + 'static) -> Option<Box<dyn EffectHandler>> {
        self.handlers.insert(handler.kind(), Box::new(handler))
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    fn handler_for(&self, effect: &SkillEffect) -> Result<&dyn EffectHandler, EffectDispatchError> {
        let kind = effect.kind();
        self.handlers
            .get(&kind)
            .map(|handler| handler.as_ref())
            .ok_or(EffectDispatchError::UnhandledKind(kind))
    }

    pub fn before_damage(
        &self,
        ctx: &mut HookContext<'_>,
        plan: &mut DamagePlan,
    ) -> Result<(), EffectDispatchError> {
        self.handler_for(ctx.effect)?.before_damage(ctx, plan)
    }

    pub fn on_hit(&self, ctx: &mut HookContext<'_>) -> Result<(), EffectDispatchError> {
        self.handler_for(ctx.effect)?.on_hit(ctx)
    }

    pub fn after_damage(&self, ctx: &mut HookContext<'_>, dealt: u16) -> Result<(), EffectDispatchError> {
        self.handler_for(ctx.effect)?.after_damage(ctx, dealt)
    }

    /// Logs a dispatch failure the first time its kind fails. Returns whether it was logged.
    pub fn report_failure(&mut self, error: &EffectDispatchError) -> bool {
        if !self.reported.insert(error.kind()) {
            debug!(target: "battle::effects", %error, "effect dispatch failed again");
            return false;
        }
        warn!(target: "battle::effects", %error, "effect skipped");
        true
    }

    pub fn reported_kinds(&self) -> &HashSet<EffectKind> {
        &self.reported
    }
}
