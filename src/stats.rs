use crate::battle::stages::StatStages;
use crate::combatant::Combatant;
use schema::{StageAxis, StatAxis};

/// Per-axis effort value cap.
pub const EV_AXIS_CAP: u8 = 255;
/// Aggregate effort value cap across all axes.
pub const EV_TOTAL_CAP: u16 = 510;

/// Derived stat for one axis.
///
/// `floor((2*base + iv + floor(ev/4)) * level / 100) + (10 for HP, 5 otherwise) + level`
pub fn compute_stat(combatant: &Combatant, axis: StatAxis) -> u16 {
    let base = combatant.base_stats.get(axis) as u32;
    let iv = combatant.ivs.get(axis) as u32;
    let ev = combatant.evs.get(axis) as u32;
    let level = combatant.level as u32;

    let scaled = (2 * base + iv + ev / 4) * level / 100;
    let flat = if axis == StatAxis::Hp { 10 } else { 5 };

    (scaled + flat + level).min(u16::MAX as u32) as u16
}

pub fn max_hp(combatant: &Combatant) -> u16 {
    compute_stat(combatant, StatAxis::Hp)
}

/// Adds effort values on one axis, honouring the per-axis and aggregate caps.
/// Returns the amount actually applied.
pub fn add_effort_value(combatant: &mut Combatant, axis: StatAxis, amount: u8) -> u8 {
    let axis_room = EV_AXIS_CAP - combatant.evs.get(axis);
    let total_room = EV_TOTAL_CAP.saturating_sub(combatant.evs.total());
    let applied = (amount as u16).min(axis_room as u16).min(total_room) as u8;

    if applied > 0 {
        let current = combatant.evs.get(axis);
        combatant.evs.set(axis, current + applied);
    }
    applied
}

/// Multiplier for a stat stage: `(2 + s) / 2` when raised, `2 / (2 - s)` when lowered.
pub fn stage_multiplier(stage: i8) -> f64 {
    const TABLE: [f64; 13] = [
        2.0 / 8.0,
        2.0 / 7.0,
        2.0 / 6.0,
        2.0 / 5.0,
        2.0 / 4.0,
        2.0 / 3.0,
        1.0,
        3.0 / 2.0,
        4.0 / 2.0,
        5.0 / 2.0,
        6.0 / 2.0,
        7.0 / 2.0,
        8.0 / 2.0,
    ];
    TABLE[(stage.clamp(-6, 6) + 6) as usize]
}

/// Applies a stage multiplier to a raw stat value, flooring the result.
pub fn apply_stage(value: u16, stage: i8) -> u16 {
    (value as f64 * stage_multiplier(stage)).floor() as u16
}

/// Stat value after the side's current stage on that axis. Accuracy has no base stat and returns 0.
pub fn effective_stat(combatant: &Combatant, stages: &StatStages, axis: StageAxis) -> u16 {
    match axis.stat() {
        Some(stat) => apply_stage(compute_stat(combatant, stat), stages.get(axis)),
        None => 0,
    }
}

/// Speed used for turn order. Always reads the live stage vector.
pub fn effective_speed(combatant: &Combatant, stages: &StatStages) -> u16 {
    effective_stat(combatant, stages, StageAxis::Speed)
}
