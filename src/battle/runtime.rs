//! Timed per-side effect state and the end-of-turn tick.
//!
//! Each side holds independently-durationed single-slot entries plus a list of
//! composite buffs. Field effects are battle-wide but remember which side set
//! them, so each entry counts down during its owner's tick.

use crate::battle::state::{BattleEvent, EventLog, ExpiredEffect, HpCause, Side};
use crate::combatant::Combatant;
use schema::{ElementType, FieldKind, SkillId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Single-slot timed effects a side can carry. Declaration order is decrement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeSlot {
    Protection,
    VoidShield,
    Seal,
    DamageOverTime,
    Parasitism,
    Regen,
    GuaranteedCrit,
    FirstStrike,
    DamageMultiplier,
    ImmuneDamage,
    NoHeal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotParams {
    None,
    /// Fixed HP amount, e.g. damage-over-time.
    Amount(u16),
    /// Percentage of max HP or of damage.
    Percent(u16),
    Parasite { percent: u8, source: Side },
    PriorityBonus(i8),
    Shield { first_strike_only: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEntry {
    pub turns_left: u8,
    pub params: SlotParams,
}

/// A named bundle of modifiers sharing one duration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeBuff {
    pub label: String,
    pub turns_left: u8,
    pub regen_percent: u8,
    pub damage_percent: u16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideEffects {
    slots: BTreeMap<RuntimeSlot, TimedEntry>,
    composites: Vec<CompositeBuff>,
}

impl SideEffects {
    /// Installs or refreshes a slot. A zero duration is ignored.
    pub fn set(&mut self, slot: RuntimeSlot, turns: u8, params: SlotParams) -> bool {
        if turns == 0 {
            return false;
        }
        self.slots.insert(
            slot,
            TimedEntry {
                turns_left: turns,
                params,
            },
        );
        true
    }

    pub fn get(&self, slot: RuntimeSlot) -> Option<&TimedEntry> {
        self.slots.get(&slot)
    }

    pub fn has(&self, slot: RuntimeSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn remove(&mut self, slot: RuntimeSlot) -> Option<TimedEntry> {
        self.slots.remove(&slot)
    }

    /// Adds a composite buff, replacing one with the same label.
    pub fn add_composite(&mut self, buff: CompositeBuff) -> bool {
        if buff.turns_left == 0 {
            return false;
        }
        self.composites.retain(|existing| existing.label != buff.label);
        self.composites.push(buff);
        true
    }

    pub fn composites(&self) -> &[CompositeBuff] {
        &self.composites
    }

    /// Removes every timed entry and composite buff, returning what was removed.
    pub fn purge(&mut self) -> Vec<ExpiredEffect> {
        let mut removed: Vec<ExpiredEffect> = self
            .slots
            .keys()
            .map(|slot| ExpiredEffect::Slot(*slot))
            .collect();
        removed.extend(
            self.composites
                .iter()
                .map(|buff| ExpiredEffect::Composite(buff.label.clone())),
        );
        self.slots.clear();
        self.composites.clear();
        removed
    }

    pub fn blocks_healing(&self) -> bool {
        self.has(RuntimeSlot::NoHeal)
    }

    pub fn priority_bonus(&self) -> i8 {
        match self.get(RuntimeSlot::FirstStrike).map(|entry| entry.params) {
            Some(SlotParams::PriorityBonus(bonus)) => bonus,
            _ => 0,
        }
    }

    /// Product of the damage multiplier slot and every composite buff's damage modifier.
    pub fn damage_multiplier(&self) -> f64 {
        let slot = match self.get(RuntimeSlot::DamageMultiplier).map(|entry| entry.params) {
            Some(SlotParams::Percent(percent)) => percent as f64 / 100.0,
            _ => 1.0,
        };
        self.composites
            .iter()
            .filter(|buff| buff.damage_percent > 0)
            .fold(slot, |acc, buff| acc * buff.damage_percent as f64 / 100.0)
    }

    fn regen_percent(&self) -> u32 {
        let slot = match self.get(RuntimeSlot::Regen).map(|entry| entry.params) {
            Some(SlotParams::Percent(percent)) => percent as u32,
            _ => 0,
        };
        slot + self
            .composites
            .iter()
            .map(|buff| buff.regen_percent as u32)
            .sum::<u32>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    pub turns_left: u8,
    pub owner: Side,
}

/// All timed effect state of a battle. Created at battle start, cleared at battle end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectRuntime {
    sides: [SideEffects; 2],
    field: BTreeMap<FieldKind, FieldEntry>,
    escalation: HashMap<(Side, SkillId), u32>,
}

impl EffectRuntime {
    pub fn side(&self, side: Side) -> &SideEffects {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideEffects {
        &mut self.sides[side.index()]
    }

    pub fn set_field(&mut self, field: FieldKind, turns: u8, owner: Side) -> bool {
        if turns == 0 {
            return false;
        }
        self.field.insert(
            field,
            FieldEntry {
                turns_left: turns,
                owner,
            },
        );
        true
    }

    pub fn field(&self, field: FieldKind) -> Option<&FieldEntry> {
        self.field.get(&field)
    }

    pub fn field_active(&self, field: FieldKind) -> bool {
        self.field.contains_key(&field)
    }

    /// Multiplier that active field effects apply to damage of the given element.
    pub fn field_damage_multiplier(&self, element: ElementType) -> f64 {
        let mut multiplier = 1.0;
        if element == ElementType::Fire && self.field_active(FieldKind::WaterSport) {
            multiplier *= 0.5;
        }
        if element == ElementType::Electric && self.field_active(FieldKind::MudSport) {
            multiplier *= 0.5;
        }
        multiplier
    }

    /// Returns how many times `side` has already used `skill`, then counts this use.
    pub fn escalate(&mut self, side: Side, skill: SkillId) -> u32 {
        let counter = self.escalation.entry((side, skill)).or_insert(0);
        let previous = *counter;
        *counter += 1;
        previous
    }

    /// Forgets the escalation counts of `side`, so a combatant switching in starts fresh.
    pub fn reset_escalation(&mut self, side: Side) {
        self.escalation.retain(|(owner, _), _| *owner != side);
    }

    pub fn clear(&mut self) {
        *self = EffectRuntime::default();
    }

    /// End-of-turn tick for one side.
    ///
    /// Order: damage-over-time, parasitism drain, regen, single-slot decrements,
    /// decrements of field effects this side owns, composite buff decrements.
    pub fn tick_side(
        &mut self,
        side: Side,
        own: &mut Combatant,
        opponent: &mut Combatant,
        log: &mut EventLog,
    ) {
        let opponent_blocks_heal = self.sides[side.opponent().index()].blocks_healing();
        let effects = &mut self.sides[side.index()];

        // 1. Damage over time
        if let Some(SlotParams::Amount(amount)) = effects
            .get(RuntimeSlot::DamageOverTime)
            .map(|entry| entry.params)
        {
            apply_hp_loss(side, own, amount, HpCause::DamageOverTime, log);
        }

        // 2. Parasitism: the drained amount goes to the side that planted it
        if let Some(SlotParams::Parasite { percent, source }) = effects
            .get(RuntimeSlot::Parasitism)
            .map(|entry| entry.params)
        {
            let amount = percent_of(own.max_hp(), percent as u32);
            let dealt = apply_hp_loss(side, own, amount, HpCause::Parasitism, log);
            if dealt > 0 && source == side.opponent() && !opponent_blocks_heal {
                apply_hp_gain(source, opponent, dealt, HpCause::Parasitism, log);
            }
        }

        // 3. Regen
        let regen = effects.regen_percent();
        if regen > 0 && !effects.blocks_healing() && !own.is_fainted() {
            let amount = percent_of(own.max_hp(), regen);
            apply_hp_gain(side, own, amount, HpCause::Regen, log);
        }

        // 4. Single-slot decrements
        let mut expired = Vec::new();
        for (slot, entry) in effects.slots.iter_mut() {
            entry.turns_left = entry.turns_left.saturating_sub(1);
            if entry.turns_left == 0 {
                expired.push(*slot);
            }
        }
        for slot in expired {
            effects.slots.remove(&slot);
            log.push(BattleEvent::EffectExpired {
                side,
                effect: ExpiredEffect::Slot(slot),
            });
        }

        // 5. Field effects owned by this side
        let mut expired_fields = Vec::new();
        for (field, entry) in self.field.iter_mut().filter(|(_, entry)| entry.owner == side) {
            entry.turns_left = entry.turns_left.saturating_sub(1);
            if entry.turns_left == 0 {
                expired_fields.push(*field);
            }
        }
        for field in expired_fields {
            self.field.remove(&field);
            log.push(BattleEvent::EffectExpired {
                side,
                effect: ExpiredEffect::Field(field),
            });
        }

        // 6. Composite buffs
        let effects = &mut self.sides[side.index()];
        for buff in effects.composites.iter_mut() {
            buff.turns_left = buff.turns_left.saturating_sub(1);
        }
        let (finished, remaining): (Vec<_>, Vec<_>) = effects
            .composites
            .drain(..)
            .partition(|buff| buff.turns_left == 0);
        effects.composites = remaining;
        for buff in finished {
            log.push(BattleEvent::EffectExpired {
                side,
                effect: ExpiredEffect::Composite(buff.label),
            });
        }

        debug!(target: "battle::runtime", %side, "end-of-turn tick complete");
    }
}

/// `percent` of `value`, floored, but at least 1 when both are non-zero.
pub fn percent_of(value: u16, percent: u32) -> u16 {
    if percent == 0 || value == 0 {
        return 0;
    }
    ((value as u32 * percent / 100).max(1)).min(u16::MAX as u32) as u16
}

fn apply_hp_loss(side: Side, combatant: &mut Combatant, amount: u16, cause: HpCause, log: &mut EventLog) -> u16 {
    if combatant.is_fainted() || amount == 0 {
        return 0;
    }
    let old_hp = combatant.current_hp();
    let dealt = combatant.take_damage(amount);
    log.push(BattleEvent::HpChanged {
        side,
        old_hp,
        new_hp: combatant.current_hp(),
        max_hp: combatant.max_hp(),
        cause,
    });
    dealt
}

fn apply_hp_gain(side: Side, combatant: &mut Combatant, amount: u16, cause: HpCause, log: &mut EventLog) -> u16 {
    let old_hp = combatant.current_hp();
    let healed = combatant.heal(amount);
    if healed > 0 {
        log.push(BattleEvent::HpChanged {
            side,
            old_hp,
            new_hp: combatant.current_hp(),
            max_hp: combatant.max_hp(),
            cause,
        });
    }
    healed
}
