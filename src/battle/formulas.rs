//! Hit, critical and damage formulas.
//!
//! Everything here is pure apart from the rolls taken from the injected
//! [`RandomSource`]. Runtime modifiers (field effects, damage boosts, immunity)
//! are layered on by the executor after [`calculate_damage`] returns.

use crate::rng::RandomSource;
use schema::{ElementType, SkillCategory, SkillData};
use serde::Serialize;

/// Multiplier applied to a critical hit.
pub const CRITICAL_MULTIPLIER: f64 = 1.5;
/// Same-type attack bonus.
pub const STAB_MULTIPLIER: f64 = 1.5;
/// Bounds of the damage roll; the random factor is `roll / 255`.
pub const DAMAGE_ROLL_MIN: u32 = 217;
pub const DAMAGE_ROLL_MAX: u32 = 255;
/// Accuracy points gained or lost per accuracy stage.
pub const ACCURACY_PER_STAGE: i32 = 15;

/// Truncates to four decimal digits: `floor(x * 10000) / 10000`. Not rounding.
pub fn truncate4(value: f64) -> f64 {
    (value * 10000.0).floor() / 10000.0
}

/// Hit chance in percent, or `None` when the skill never misses.
pub fn hit_chance(accuracy: u8, accuracy_stage: i8) -> Option<u8> {
    if accuracy == 0 || accuracy >= 100 {
        return None;
    }
    let chance = (accuracy as i32 + accuracy_stage as i32 * ACCURACY_PER_STAGE).clamp(0, 100);
    Some(chance as u8)
}

/// Rolls `[1, 100]` against the skill's stage-adjusted accuracy.
/// Skills with accuracy 0 or at least 100 hit without consuming a roll.
pub fn check_hit(skill: &SkillData, accuracy_stage: i8, rng: &mut dyn RandomSource) -> bool {
    match hit_chance(skill.accuracy, accuracy_stage) {
        None => true,
        Some(chance) => rng.int_in(1, 100, "accuracy") <= chance as u32,
    }
}

/// Rolls `[1, crit_rate]`; a 1 is a critical hit. A zero rate never crits and never rolls.
pub fn roll_critical(crit_rate: u16, rng: &mut dyn RandomSource) -> bool {
    if crit_rate == 0 {
        return false;
    }
    rng.int_in(1, crit_rate as u32, "critical") == 1
}

/// Everything [`calculate_damage`] needs, already resolved by the caller.
#[derive(Debug, Clone, Copy)]
pub struct DamageInput<'a> {
    pub skill: &'a SkillData,
    pub attacker_level: u8,
    pub attacker_element: ElementType,
    /// Stage-adjusted attacking stat for the skill's category.
    pub attack: u16,
    /// Stage-adjusted defending stat for the skill's category.
    pub defense: u16,
    /// Chart multiplier for the skill's element against the defender.
    pub type_effectiveness: f64,
    /// From the status service; 1.0 when no status applies.
    pub power_multiplier: f64,
    pub force_critical: bool,
    pub neutral_effectiveness: bool,
}

/// The result of one damage calculation, with its intermediate values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DamageBreakdown {
    pub damage: u16,
    pub critical: bool,
    pub effectiveness: f64,
    pub stab: f64,
    pub level_factor: f64,
    pub ratio: f64,
    pub base: f64,
    pub roll: u32,
}

impl DamageBreakdown {
    fn none() -> Self {
        Self {
            effectiveness: 1.0,
            stab: 1.0,
            ..Default::default()
        }
    }
}

/// Final damage of a single hit.
///
/// 1. `level_factor = truncate4(level * 0.4 + 2)`
/// 2. `ratio = truncate4(attack / defense)`
/// 3. `base = truncate4(level_factor * power * ratio / 50 + 2)`
/// 4. `damage = floor(base * stab * type * roll/255 * crit)`, at least 1 unless the type multiplier is 0
///
/// Status skills and zero-power skills deal nothing and take no rolls.
pub fn calculate_damage(input: &DamageInput<'_>, rng: &mut dyn RandomSource) -> DamageBreakdown {
    let skill = input.skill;
    if skill.category == SkillCategory::Status || skill.power == 0 {
        return DamageBreakdown::none();
    }

    let critical = input.force_critical || roll_critical(skill.crit_rate, rng);
    let crit_multiplier = if critical { CRITICAL_MULTIPLIER } else { 1.0 };

    let power = (skill.power as f64 * input.power_multiplier).floor();

    let level_factor = truncate4(input.attacker_level as f64 * 0.4 + 2.0);
    let ratio = truncate4(input.attack as f64 / input.defense.max(1) as f64);
    let base = truncate4(level_factor * power * ratio / 50.0 + 2.0);

    let stab = if skill.element == input.attacker_element {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    let effectiveness = if input.neutral_effectiveness {
        1.0
    } else {
        input.type_effectiveness
    };

    let roll = rng.int_in(DAMAGE_ROLL_MIN, DAMAGE_ROLL_MAX, "damage_roll");
    let random_factor = roll as f64 / DAMAGE_ROLL_MAX as f64;

    let raw = (base * stab * effectiveness * random_factor * crit_multiplier).floor();
    let damage = if effectiveness > 0.0 {
        raw.max(1.0)
    } else {
        0.0
    };

    DamageBreakdown {
        damage: damage.min(u16::MAX as f64) as u16,
        critical,
        effectiveness,
        stab,
        level_factor,
        ratio,
        base,
        roll,
    }
}
