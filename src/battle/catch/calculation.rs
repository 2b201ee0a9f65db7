use crate::combatant::Combatant;
use crate::rng::RandomSource;
use serde::Serialize;

/// Largest bonus a fully worn-down target adds to the catch rate.
const HP_BONUS_MAX: u32 = 50;

/// Result of one capture roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatchAttempt {
    pub rate: u8,
    pub roll: u32,
    pub success: bool,
    pub shakes: u8,
}

/// `min(100, base + floor((max_hp - current_hp) * 50 / max_hp) + capsule_bonus)`
pub fn calculate_catch_rate(base_rate: u8, current_hp: u16, max_hp: u16, capsule_bonus: u8) -> u8 {
    let max_hp = max_hp.max(1) as u32;
    let missing = max_hp.saturating_sub(current_hp as u32);
    let hp_bonus = missing * HP_BONUS_MAX / max_hp;
    (base_rate as u32 + hp_bonus + capsule_bonus as u32).min(100) as u8
}

/// Shakes shown before the result: 1 below 30, 2 below 60, otherwise (or on success) 3.
pub fn shake_count(rate: u8, success: bool) -> u8 {
    if success || rate >= 60 {
        3
    } else if rate >= 30 {
        2
    } else {
        1
    }
}

/// Rolls `[0, 99]`; the capture succeeds when the roll is below the rate.
pub fn roll_catch_success(rate: u8, rng: &mut dyn RandomSource) -> (bool, u32) {
    let roll = rng.int_in(0, 99, "capture");
    (roll < rate as u32, roll)
}

pub fn attempt_catch(target: &Combatant, capsule_bonus: u8, rng: &mut dyn RandomSource) -> CatchAttempt {
    let rate = calculate_catch_rate(
        target.catch_rate,
        target.current_hp(),
        target.max_hp(),
        capsule_bonus,
    );
    let (success, roll) = roll_catch_success(rate, rng);
    CatchAttempt {
        rate,
        roll,
        success,
        shakes: shake_count(rate, success),
    }
}
