//! Executes one side's chosen action against the other side.
//!
//! The executor owns nothing: it borrows the battle state and the collaborators
//! for the duration of a single action, appends events to the turn's log, and
//! reports whether the action ended the battle.

use crate::battle::action::BattleAction;
use crate::battle::catch::{attempt_catch, can_attempt_catch, capsule_bonus};
use crate::battle::effects::{DamagePlan, EffectRegistry, HookContext};
use crate::battle::formulas::{calculate_damage, check_hit, DamageInput};
use crate::battle::runtime::{RuntimeSlot, SlotParams};
use crate::battle::state::{BattleEvent, BattleState, EventLog, HpCause, Side};
use crate::combatant::Combatant;
use crate::config::EngineConfig;
use crate::content::ContentLookup;
use crate::rng::RandomSource;
use crate::services::{ServiceWarnings, StatusService};
use crate::stats::effective_stat;
use schema::{ItemId, SkillCategory, SkillData, SkillEffect, SkillId, StageAxis};
use tracing::{debug, info, warn};

/// What an executed action means for the rest of the turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Done,
    /// The wild combatant was caught; carries its roster entry.
    Captured(Box<Combatant>),
    Escaped,
}

/// The hook phase a dispatch is for.
enum Hook<'p> {
    BeforeDamage(&'p mut DamagePlan),
    OnHit,
    AfterDamage(u16),
}

pub struct ActionExecutor<'a> {
    pub content: &'a dyn ContentLookup,
    pub status: Option<&'a mut (dyn StatusService + 'static)>,
    pub registry: &'a mut EffectRegistry,
    pub rng: &'a mut dyn RandomSource,
    pub warnings: &'a mut ServiceWarnings,
    pub config: &'a EngineConfig,
}

impl<'a> ActionExecutor<'a> {
    /// Runs `action` for `actor`. `target_has_acted` tells first-strike shields
    /// whether the opposing side already moved this turn.
    pub fn execute(
        &mut self,
        state: &mut BattleState,
        actor: Side,
        action: BattleAction,
        target_has_acted: bool,
        log: &mut EventLog,
    ) -> ActionOutcome {
        debug!(target: "battle::executor", %actor, ?action, "executing action");
        match action {
            BattleAction::Skill { skill } => {
                self.use_skill(state, actor, skill, target_has_acted, log);
                ActionOutcome::Done
            }
            BattleAction::Catch { item } => self.throw_capsule(state, actor, item, log),
            BattleAction::Switch { index } => {
                self.switch_in(state, actor, index, log);
                ActionOutcome::Done
            }
            BattleAction::Escape => {
                log.push(BattleEvent::Escaped { side: actor });
                info!(target: "battle::executor", side = %actor, "escaped from battle");
                ActionOutcome::Escaped
            }
        }
    }

    // --- SKILL PIPELINE ---

    fn use_skill(
        &mut self,
        state: &mut BattleState,
        actor: Side,
        skill_id: SkillId,
        target_has_acted: bool,
        log: &mut EventLog,
    ) {
        let target = actor.opponent();
        if state.side(actor).active().is_fainted() {
            return;
        }

        // 1. Status conditions may stop the action outright.
        if !self.status_allows_action(actor, log) {
            return;
        }

        let content = self.content;
        let Some(skill) = content.skill(skill_id) else {
            warn!(target: "battle::executor", skill = %skill_id, "skill missing from content tables");
            return;
        };

        // 2. Pay the PP cost.
        let Some(slot) = state.side_mut(actor).active_mut().skill_slot_mut(skill_id) else {
            warn!(target: "battle::executor", skill = %skill_id, "active combatant does not know this skill");
            return;
        };
        let old_pp = slot.pp();
        if !slot.use_pp() {
            log.push(BattleEvent::ActionBlocked {
                side: actor,
                reason: "no PP left".to_string(),
            });
            return;
        }
        log.push(BattleEvent::PpChanged {
            side: actor,
            skill: skill_id,
            old_pp,
            new_pp: slot.pp(),
        });
        log.push(BattleEvent::SkillCast {
            side: actor,
            skill: skill_id,
            name: skill.name.clone(),
        });

        // 3. Shields and protection on the defending side.
        if let Some(SlotParams::Shield { first_strike_only }) = state
            .runtime
            .side(target)
            .get(RuntimeSlot::VoidShield)
            .map(|entry| entry.params)
        {
            if !first_strike_only || !target_has_acted {
                log.push(BattleEvent::ActionShielded {
                    side: actor,
                    shielded: target,
                });
                return;
            }
        }
        if skill.category != SkillCategory::Status
            && state.runtime.side(target).has(RuntimeSlot::Protection)
        {
            log.push(BattleEvent::Protected { side: target });
            return;
        }

        // 4. Accuracy.
        let accuracy_stage = state.side(actor).stages.get(StageAxis::Accuracy);
        if !check_hit(skill, accuracy_stage, &mut *self.rng) {
            log.push(BattleEvent::Miss {
                side: actor,
                target,
                skill: skill_id,
            });
            return;
        }

        // 5. Sealed combatants cast without their effect.
        let mut effect = skill.effect.as_ref();
        if let Some(sealed) = effect.filter(|_| state.runtime.side(actor).has(RuntimeSlot::Seal)) {
            log.push(BattleEvent::EffectSuppressed {
                side: actor,
                effect: sealed.kind(),
            });
            effect = None;
        }

        let mut plan = DamagePlan::default();
        if let Some(effect) = effect {
            self.run_hook(state, actor, skill, effect, Hook::BeforeDamage(&mut plan), log);
        }
        if plan.cancelled {
            return;
        }

        // 6. Damage.
        let damaging = skill.uses_damage_formula() || plan.fixed_amount.is_some();
        let mut total: u16 = 0;
        if damaging {
            for hit_number in 1..=plan.hits.max(1) {
                total = total.saturating_add(self.strike(state, actor, skill, &plan, hit_number, log));
                if state.side(target).active().is_fainted() {
                    break;
                }
            }
            if total > 0 {
                self.wake_check(state, target, log);
            }
        }

        // 7. Declarative effect hooks.
        if let Some(effect) = effect {
            self.run_hook(state, actor, skill, effect, Hook::OnHit, log);
            if damaging {
                self.run_hook(state, actor, skill, effect, Hook::AfterDamage(total), log);
            }
        }
    }

    /// One hit of a damaging skill. Returns the HP actually removed.
    fn strike(
        &mut self,
        state: &mut BattleState,
        actor: Side,
        skill: &SkillData,
        plan: &DamagePlan,
        hit_number: u8,
        log: &mut EventLog,
    ) -> u16 {
        let target = actor.opponent();
        let (mut damage, critical, effectiveness) = match plan.fixed_amount {
            // Flat damage ignores the chart and every runtime multiplier.
            Some(amount) => (amount, false, 1.0),
            None => self.formula_damage(state, actor, skill, plan),
        };

        if state.runtime.side(target).has(RuntimeSlot::ImmuneDamage) {
            damage = 0;
        }

        let defender = state.side_mut(target).active_mut();
        let old_hp = defender.current_hp();
        damage = damage.min(old_hp.saturating_sub(plan.min_target_hp));
        let dealt = defender.take_damage(damage);
        let (new_hp, max_hp) = (defender.current_hp(), defender.max_hp());

        log.push(BattleEvent::Hit {
            side: actor,
            target,
            skill: skill.id,
            damage: dealt,
            critical,
            effectiveness,
            hit_number,
        });
        log.push(BattleEvent::HpChanged {
            side: target,
            old_hp,
            new_hp,
            max_hp,
            cause: HpCause::Attack,
        });
        dealt
    }

    /// Formula damage with field and side multipliers layered on top.
    fn formula_damage(
        &mut self,
        state: &BattleState,
        actor: Side,
        skill: &SkillData,
        plan: &DamagePlan,
    ) -> (u16, bool, f64) {
        let target = actor.opponent();
        let (attack_axis, defense_axis) = match skill.category {
            SkillCategory::Special => (StageAxis::SpecialAttack, StageAxis::SpecialDefense),
            _ => (StageAxis::Attack, StageAxis::Defense),
        };
        let own = state.side(actor);
        let other = state.side(target);
        let attacker = own.active();
        let defender = other.active();

        let power_multiplier = self
            .status
            .as_deref()
            .map_or(1.0, |status| status.damage_power_multiplier(actor));

        let input = DamageInput {
            skill,
            attacker_level: attacker.level,
            attacker_element: attacker.element,
            attack: effective_stat(attacker, &own.stages, attack_axis),
            defense: effective_stat(defender, &other.stages, defense_axis),
            type_effectiveness: self.content.type_effectiveness(skill.element, defender.element),
            power_multiplier,
            force_critical: state.runtime.side(actor).has(RuntimeSlot::GuaranteedCrit),
            neutral_effectiveness: plan.neutral_effectiveness,
        };
        let breakdown = calculate_damage(&input, &mut *self.rng);

        let modifier = state.runtime.field_damage_multiplier(skill.element)
            * state.runtime.side(actor).damage_multiplier();
        let mut damage = (breakdown.damage as f64 * modifier).floor().min(u16::MAX as f64) as u16;
        if breakdown.effectiveness > 0.0 {
            damage = damage.max(1);
        }
        debug!(target: "battle::executor", ?breakdown, modifier, damage, "damage calculated");
        (damage, breakdown.critical, breakdown.effectiveness)
    }

    fn status_allows_action(&mut self, actor: Side, log: &mut EventLog) -> bool {
        let Some(status) = self.status.as_deref_mut() else {
            self.warnings.missing("status");
            return true;
        };
        let gate = status.can_act(actor, &mut *self.rng);
        if let Some(cured) = gate.cured {
            log.push(BattleEvent::StatusRemoved {
                side: actor,
                status: cured.to_string(),
            });
        }
        if !gate.allowed {
            let reason = gate
                .reason
                .or_else(|| status.status_name(actor).map(|name| format!("held back by {}", name)))
                .unwrap_or_else(|| "unable to act".to_string());
            log.push(BattleEvent::ActionBlocked {
                side: actor,
                reason,
            });
        }
        gate.allowed
    }

    /// Being struck may clear a status such as sleep or freeze.
    fn wake_check(&mut self, state: &BattleState, target: Side, log: &mut EventLog) {
        if state.side(target).active().is_fainted() {
            return;
        }
        let Some(status) = self.status.as_deref_mut() else {
            return;
        };
        if let Some(cleared) = status.on_hit_target(target, &mut *self.rng) {
            log.push(BattleEvent::StatusRemoved {
                side: target,
                status: cleared.to_string(),
            });
        }
    }

    fn run_hook(
        &mut self,
        state: &mut BattleState,
        actor: Side,
        skill: &SkillData,
        effect: &SkillEffect,
        hook: Hook<'_>,
        log: &mut EventLog,
    ) {
        let (own, other, runtime) = state.split_mut(actor);
        let mut ctx = HookContext {
            actor,
            target: actor.opponent(),
            skill,
            effect,
            attacker: own.party.active_mut(),
            defender: other.party.active_mut(),
            attacker_stages: &mut own.stages,
            defender_stages: &mut other.stages,
            runtime,
            status: self.status.as_deref_mut(),
            rng: &mut *self.rng,
            log,
            warnings: &mut *self.warnings,
            config: self.config,
        };

        let result = match hook {
            Hook::BeforeDamage(plan) => self.registry.before_damage(&mut ctx, plan),
            Hook::OnHit => self.registry.on_hit(&mut ctx),
            Hook::AfterDamage(dealt) => self.registry.after_damage(&mut ctx, dealt),
        };
        if let Err(error) = result {
            self.registry.report_failure(&error);
        }
    }

    // --- OTHER ACTIONS ---

    fn throw_capsule(
        &mut self,
        state: &mut BattleState,
        actor: Side,
        item_id: ItemId,
        log: &mut EventLog,
    ) -> ActionOutcome {
        // Submission already validated this; the state may have moved since.
        let bonus = match self.content.item(item_id) {
            Some(item) => can_attempt_catch(state, actor)
                .and_then(|_| capsule_bonus(item))
                .map_err(|error| error.to_string()),
            None => Err(format!("{} does not exist", item_id)),
        };
        let bonus = match bonus {
            Ok(bonus) => bonus,
            Err(reason) => {
                log.push(BattleEvent::ActionBlocked { side: actor, reason });
                return ActionOutcome::Done;
            }
        };

        let target = state.side(actor.opponent()).active();
        let attempt = attempt_catch(target, bonus, &mut *self.rng);
        log.push(BattleEvent::CatchAttempted {
            rate: attempt.rate,
            shakes: attempt.shakes,
        });
        if !attempt.success {
            return ActionOutcome::Done;
        }

        log.push(BattleEvent::Captured {
            species: target.species,
        });
        info!(target: "battle::executor", species = %target.species, rate = attempt.rate, "capture succeeded");
        ActionOutcome::Captured(Box::new(target.to_roster_entry()))
    }

    fn switch_in(&mut self, state: &mut BattleState, actor: Side, index: usize, log: &mut EventLog) {
        let side_state = state.side_mut(actor);
        if !side_state.party.switch_to(index) {
            log.push(BattleEvent::ActionBlocked {
                side: actor,
                reason: format!("party slot {} cannot battle", index),
            });
            return;
        }
        side_state.stages.clear();
        side_state.faint_reported = false;
        let species = side_state.active().species;
        state.runtime.reset_escalation(actor);

        match self.status.as_deref_mut() {
            Some(status) => status.clear(actor),
            None => self.warnings.missing("status"),
        }
        log.push(BattleEvent::SwitchedIn {
            side: actor,
            index,
            species,
        });
    }
}
