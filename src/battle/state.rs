use crate::battle::action::BattleAction;
use crate::battle::runtime::{EffectRuntime, RuntimeSlot};
use crate::battle::stages::StatStages;
use crate::combatant::{Combatant, Party};
use crate::errors::SubmitRejection;
use crate::progression::LevelUpRecord;
use schema::{EffectKind, FieldKind, SkillId, SpeciesId, StageAxis, StatAxis};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Enemy => write!(f, "enemy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleType {
    Wild,
    Trainer,
}

/// What moved an HP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpCause {
    Attack,
    Recoil,
    Drain,
    Heal,
    Bonus,
    Equalize,
    DamageOverTime,
    Parasitism,
    Regen,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBasis {
    ActionTier,
    Priority,
    Speed,
    Coin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Knockout,
    Draw,
    Escape,
    Capture,
}

impl EndReason {
    pub fn code(self) -> &'static str {
        match self {
            EndReason::Knockout => "knockout",
            EndReason::Draw => "draw",
            EndReason::Escape => "escape",
            EndReason::Capture => "capture",
        }
    }
}

/// A timed effect that ran out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredEffect {
    Slot(RuntimeSlot),
    Field(FieldKind),
    Composite(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    // Turn Management
    TurnStarted {
        turn: u32,
    },
    ActionSubmitted {
        side: Side,
        action: BattleAction,
    },
    OrderDetermined {
        first: Side,
        second: Side,
        basis: OrderBasis,
    },
    TurnEnded {
        turn: u32,
    },

    // Skill Use
    SkillCast {
        side: Side,
        skill: SkillId,
        name: String,
    },
    ActionBlocked {
        side: Side,
        reason: String,
    },
    ActionShielded {
        side: Side,
        shielded: Side,
    },
    Protected {
        side: Side,
    },
    Hit {
        side: Side,
        target: Side,
        skill: SkillId,
        damage: u16,
        critical: bool,
        effectiveness: f64,
        hit_number: u8,
    },
    Miss {
        side: Side,
        target: Side,
        skill: SkillId,
    },
    EffectSuppressed {
        side: Side,
        effect: EffectKind,
    },

    // Resources
    HpChanged {
        side: Side,
        old_hp: u16,
        new_hp: u16,
        max_hp: u16,
        cause: HpCause,
    },
    PpChanged {
        side: Side,
        skill: SkillId,
        old_pp: u8,
        new_pp: u8,
    },

    // Status and Stages
    StatusApplied {
        side: Side,
        status: String,
    },
    StatusRemoved {
        side: Side,
        status: String,
    },
    StatChanged {
        side: Side,
        axis: StageAxis,
        old_stage: i8,
        new_stage: i8,
    },
    StatChangeBlocked {
        side: Side,
        axis: StageAxis,
        reason: String,
    },

    // Timed Effects
    EffectApplied {
        side: Side,
        effect: EffectKind,
    },
    EffectExpired {
        side: Side,
        effect: ExpiredEffect,
    },

    // Party
    Fainted {
        side: Side,
        species: SpeciesId,
    },
    SwitchedIn {
        side: Side,
        index: usize,
        species: SpeciesId,
    },
    NeedSwitch {
        side: Side,
    },

    // Capture and Escape
    CatchAttempted {
        rate: u8,
        shakes: u8,
    },
    Captured {
        species: SpeciesId,
    },
    Escaped {
        side: Side,
    },

    // Progression
    ExperienceGained {
        side: Side,
        amount: u32,
    },
    LevelUp {
        side: Side,
        level: u8,
        learned: Vec<SkillId>,
        queued: Vec<SkillId>,
        evolution_ready: bool,
    },
    EffortGained {
        side: Side,
        axis: StatAxis,
        amount: u8,
    },

    // Battle End
    BattleEnded {
        winner: Option<Side>,
        reason: EndReason,
    },
}

impl BattleEvent {
    /// Human-readable line for the event, or None for events that are not worth showing.
    pub fn describe(&self) -> Option<String> {
        match self {
            BattleEvent::TurnStarted { turn } => Some(format!("=== Turn {} ===", turn)),
            BattleEvent::ActionSubmitted { .. } | BattleEvent::OrderDetermined { .. } => None,
            BattleEvent::TurnEnded { .. } => None,

            BattleEvent::SkillCast { side, name, .. } => Some(format!("{} used {}!", Self::owner(*side), name)),
            BattleEvent::ActionBlocked { side, reason } => {
                Some(format!("{} can't move: {}!", Self::owner(*side), reason))
            }
            BattleEvent::ActionShielded { shielded, .. } => {
                Some(format!("{} is shielded from the attack!", Self::owner(*shielded)))
            }
            BattleEvent::Protected { side } => Some(format!("{} protected itself!", Self::owner(*side))),
            BattleEvent::Hit { target, damage, critical, effectiveness, .. } => {
                let mut line = format!("{} took {} damage", Self::owner(*target), damage);
                if *critical {
                    line.push_str(" (critical hit)");
                }
                if *effectiveness == 0.0 {
                    line = format!("It doesn't affect {}...", Self::owner(*target));
                } else if *effectiveness > 1.0 {
                    line.push_str(". It's super effective!");
                } else if *effectiveness < 1.0 {
                    line.push_str(". It's not very effective...");
                }
                Some(line)
            }
            BattleEvent::Miss { side, .. } => Some(format!("{}'s attack missed!", Self::owner(*side))),
            BattleEvent::EffectSuppressed { side, effect } => {
                Some(format!("{}'s {} was sealed away!", Self::owner(*side), effect))
            }

            BattleEvent::HpChanged { side, old_hp, new_hp, cause, .. } => match cause {
                // Attack damage is already described by the hit line.
                HpCause::Attack => None,
                _ if new_hp >= old_hp => Some(format!(
                    "{} recovered {} HP ({:?}).",
                    Self::owner(*side),
                    new_hp - old_hp,
                    cause
                )),
                _ => Some(format!(
                    "{} lost {} HP ({:?}).",
                    Self::owner(*side),
                    old_hp - new_hp,
                    cause
                )),
            },
            BattleEvent::PpChanged { .. } => None,

            BattleEvent::StatusApplied { side, status } => {
                Some(format!("{} is afflicted with {}!", Self::owner(*side), status))
            }
            BattleEvent::StatusRemoved { side, status } => {
                Some(format!("{} is no longer affected by {}.", Self::owner(*side), status))
            }
            BattleEvent::StatChanged { side, axis, old_stage, new_stage } => {
                let direction = if new_stage > old_stage { "rose" } else { "fell" };
                Some(format!("{}'s {} {}!", Self::owner(*side), axis, direction))
            }
            BattleEvent::StatChangeBlocked { side, axis, reason } => {
                Some(format!("{}'s {} won't change ({}).", Self::owner(*side), axis, reason))
            }

            BattleEvent::EffectApplied { side, effect } => {
                Some(format!("{} is under the effect of {}.", Self::owner(*side), effect))
            }
            BattleEvent::EffectExpired { side, effect } => {
                let name = match effect {
                    ExpiredEffect::Slot(slot) => format!("{:?}", slot),
                    ExpiredEffect::Field(field) => field.to_string(),
                    ExpiredEffect::Composite(label) => label.clone(),
                };
                Some(format!("{}'s {} wore off.", Self::owner(*side), name))
            }

            BattleEvent::Fainted { side, .. } => Some(format!("{} fainted!", Self::owner(*side))),
            BattleEvent::SwitchedIn { side, index, .. } => {
                Some(format!("{} sent out party member {}!", Self::owner(*side), index + 1))
            }
            BattleEvent::NeedSwitch { side } => {
                Some(format!("{} must choose a new combatant.", Self::owner(*side)))
            }

            BattleEvent::CatchAttempted { shakes, .. } => {
                Some(format!("The capsule shook {} time(s)...", shakes))
            }
            BattleEvent::Captured { .. } => Some("Gotcha! The wild elf was caught!".to_string()),
            BattleEvent::Escaped { side } => Some(format!("{} got away safely!", Self::owner(*side))),

            BattleEvent::ExperienceGained { side, amount } => {
                Some(format!("{} gained {} experience.", Self::owner(*side), amount))
            }
            BattleEvent::LevelUp { side, level, evolution_ready, .. } => {
                let mut line = format!("{} grew to level {}!", Self::owner(*side), level);
                if *evolution_ready {
                    line.push_str(" It is ready to evolve!");
                }
                Some(line)
            }
            BattleEvent::EffortGained { .. } => None,

            BattleEvent::BattleEnded { winner, reason } => match (winner, reason) {
                (_, EndReason::Escape) => Some("The battle ended with an escape.".to_string()),
                (_, EndReason::Capture) => Some("The battle ended with a capture.".to_string()),
                (Some(side), _) => Some(format!("The {} side has won the battle!", side)),
                (None, _) => Some("The battle ended in a draw!".to_string()),
            },
        }
    }

    fn owner(side: Side) -> &'static str {
        match side {
            Side::Player => "Your elf",
            Side::Enemy => "The foe",
        }
    }
}

/// An event stamped with its position in the battle's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub turn: u32,
    pub seq: u32,
    #[serde(flatten)]
    pub event: BattleEvent,
}

/// Append-only log of one turn's events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    turn: u32,
    next_seq: u32,
    events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new(turn: u32) -> Self {
        Self::resume(turn, 0)
    }

    /// Continues numbering within a turn that already produced `next_seq` events.
    pub fn resume(turn: u32, next_seq: u32) -> Self {
        Self {
            turn,
            next_seq,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: BattleEvent) {
        debug!(target: "battle::events", turn = self.turn, seq = self.next_seq, ?event);
        self.events.push(LoggedEvent {
            turn: self.turn,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<LoggedEvent> {
        self.events
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turn {} ({} events):", self.turn, self.events.len())?;
        for logged in &self.events {
            writeln!(f, "  [{}:{}] {:?}", logged.turn, logged.seq, logged.event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    Continue,
    NeedSwitch,
    BattleEnd,
    Rejected,
}

/// Normalized summary of a turn, always derived from its events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub status: OutcomeStatus,
    pub ended: bool,
    pub winner: Option<Side>,
    pub need_switch: Vec<Side>,
    pub escaped: bool,
    pub captured: bool,
    pub rejected: bool,
    pub reason: Option<String>,
}

impl TurnOutcome {
    pub fn from_events(events: &[LoggedEvent]) -> Self {
        let mut outcome = TurnOutcome::default();

        for logged in events {
            match &logged.event {
                BattleEvent::Escaped { .. } => outcome.escaped = true,
                BattleEvent::Captured { .. } => outcome.captured = true,
                BattleEvent::NeedSwitch { side } => {
                    if !outcome.need_switch.contains(side) {
                        outcome.need_switch.push(*side);
                    }
                }
                BattleEvent::BattleEnded { winner, reason } => {
                    outcome.ended = true;
                    outcome.winner = *winner;
                    outcome.reason = Some(reason.code().to_string());
                }
                _ => {}
            }
        }

        outcome.status = if outcome.ended {
            OutcomeStatus::BattleEnd
        } else if !outcome.need_switch.is_empty() {
            OutcomeStatus::NeedSwitch
        } else {
            OutcomeStatus::Continue
        };
        outcome
    }

    /// Outcome shape for a refused submission, for callers that want one result type.
    pub fn rejected(rejection: &SubmitRejection) -> Self {
        TurnOutcome {
            status: OutcomeStatus::Rejected,
            rejected: true,
            reason: Some(rejection.code().to_string()),
            ..TurnOutcome::default()
        }
    }
}

/// Immutable record of one resolved turn (or one forced switch).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    turn: u32,
    events: Vec<LoggedEvent>,
    outcome: TurnOutcome,
    level_ups: Vec<LevelUpRecord>,
    captured: Option<Combatant>,
}

impl TurnResult {
    pub fn new(log: EventLog, level_ups: Vec<LevelUpRecord>, captured: Option<Combatant>) -> Self {
        let turn = log.turn();
        let events = log.into_events();
        let outcome = TurnOutcome::from_events(&events);
        Self {
            turn,
            events,
            outcome,
            level_ups,
            captured,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn outcome(&self) -> &TurnOutcome {
        &self.outcome
    }

    pub fn level_ups(&self) -> &[LevelUpRecord] {
        &self.level_ups
    }

    /// The roster entry produced by a successful capture this turn.
    pub fn captured(&self) -> Option<&Combatant> {
        self.captured.as_ref()
    }

    pub fn into_captured(self) -> Option<Combatant> {
        self.captured
    }

    /// Convenience iterator over the bare events.
    pub fn iter_events(&self) -> impl DoubleEndedIterator<Item = &BattleEvent> + '_ {
        self.events.iter().map(|logged| &logged.event)
    }
}

/// One side of the field: its party and its stage vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SideState {
    pub party: Party,
    pub stages: StatStages,
    /// Set once a `Fainted` event has been emitted for the current active combatant.
    pub faint_reported: bool,
}

impl SideState {
    pub fn new(party: Party) -> Self {
        Self {
            party,
            stages: StatStages::default(),
            faint_reported: false,
        }
    }

    pub fn active(&self) -> &Combatant {
        self.party.active()
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        self.party.active_mut()
    }
}

/// All mutable state of a battle in progress.
#[derive(Debug, Clone)]
pub struct BattleState {
    pub battle_type: BattleType,
    pub sides: [SideState; 2],
    pub runtime: EffectRuntime,
    pub turn: u32,
}

impl BattleState {
    pub fn new(battle_type: BattleType, player: Party, enemy: Party) -> Self {
        Self {
            battle_type,
            sides: [SideState::new(player), SideState::new(enemy)],
            runtime: EffectRuntime::default(),
            turn: 0,
        }
    }

    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        &mut self.sides[side.index()]
    }

    /// Splits the state into the acting side, its opponent and the effect runtime.
    pub fn split_mut(&mut self, actor: Side) -> (&mut SideState, &mut SideState, &mut EffectRuntime) {
        let [player, enemy] = &mut self.sides;
        match actor {
            Side::Player => (player, enemy, &mut self.runtime),
            Side::Enemy => (enemy, player, &mut self.runtime),
        }
    }
}
