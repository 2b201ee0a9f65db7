//! Reference status-condition service.

use crate::battle::state::Side;
use crate::rng::RandomSource;
use crate::services::{ActGate, StatusService};
use schema::StatusKind;
use tracing::debug;

/// Chance in percent that paralysis stops an action.
pub const PARALYSIS_BLOCK_CHANCE: u8 = 25;
/// Chance in percent that a sleeping combatant wakes when struck.
pub const WAKE_ON_HIT_CHANCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    /// Remaining turns for sleep. Other statuses ignore it.
    pub turns_left: u8,
}

/// One status per side, with the classic behaviours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardStatusService {
    statuses: [Option<ActiveStatus>; 2],
}

impl StandardStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, side: Side) -> Option<ActiveStatus> {
        self.statuses[side.index()]
    }

    fn slot(&mut self, side: Side) -> &mut Option<ActiveStatus> {
        &mut self.statuses[side.index()]
    }
}

impl StatusService for StandardStatusService {
    fn can_act(&mut self, side: Side, rng: &mut dyn RandomSource) -> ActGate {
        let Some(mut active) = self.status(side) else {
            return ActGate::allow();
        };

        match active.kind {
            StatusKind::Sleep => {
                if active.turns_left == 0 {
                    *self.slot(side) = None;
                    debug!(target: "battle::status", %side, "woke up");
                    return ActGate {
                        allowed: true,
                        reason: None,
                        cured: Some(StatusKind::Sleep),
                    };
                }
                active.turns_left -= 1;
                *self.slot(side) = Some(active);
                ActGate::block("asleep")
            }
            StatusKind::Paralysis => {
                if rng.int_in(1, 100, "status") <= PARALYSIS_BLOCK_CHANCE as u32 {
                    ActGate::block("fully paralyzed")
                } else {
                    ActGate::allow()
                }
            }
            StatusKind::Freeze => ActGate::block("frozen solid"),
            StatusKind::Fear => {
                *self.slot(side) = None;
                ActGate {
                    allowed: false,
                    reason: Some("flinched in fear".to_string()),
                    cured: Some(StatusKind::Fear),
                }
            }
            StatusKind::Burn | StatusKind::Poison => ActGate::allow(),
        }
    }

    fn apply_status(&mut self, side: Side, kind: StatusKind, turns: u8) -> bool {
        let slot = self.slot(side);
        if slot.is_some() {
            return false;
        }
        *slot = Some(ActiveStatus {
            kind,
            turns_left: turns,
        });
        true
    }

    fn on_hit_target(&mut self, side: Side, rng: &mut dyn RandomSource) -> Option<StatusKind> {
        let active = self.status(side)?;
        let cleared = match active.kind {
            StatusKind::Freeze => true,
            StatusKind::Sleep => rng.int_in(1, 100, "status") <= WAKE_ON_HIT_CHANCE as u32,
            _ => false,
        };
        if cleared {
            *self.slot(side) = None;
            Some(active.kind)
        } else {
            None
        }
    }

    fn status_name(&self, side: Side) -> Option<String> {
        self.status(side).map(|active| active.kind.to_string())
    }

    fn damage_power_multiplier(&self, side: Side) -> f64 {
        match self.status(side).map(|active| active.kind) {
            Some(StatusKind::Burn) => 0.5,
            _ => 1.0,
        }
    }

    fn end_turn_damage(&mut self, side: Side, max_hp: u16) -> u16 {
        match self.status(side).map(|active| active.kind) {
            Some(StatusKind::Burn) => (max_hp / 16).max(1),
            Some(StatusKind::Poison) => (max_hp / 8).max(1),
            _ => 0,
        }
    }

    fn clear(&mut self, side: Side) {
        *self.slot(side) = None;
    }
}
