//! External collaborators the engine consults but does not implement.
//!
//! They are handed to the battle manager once, through [`Collaborators`].
//! Only the content lookup is mandatory; every other collaborator may be
//! absent, in which case its feature becomes a no-op and a single warning is
//! logged per battle.

use crate::battle::state::Side;
use crate::combatant::Combatant;
use crate::content::ContentLookup;
use crate::rng::RandomSource;
use schema::{SpeciesId, StatusKind};
use std::collections::HashSet;
use tracing::warn;

/// Answer of [`StatusService::can_act`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActGate {
    pub allowed: bool,
    /// Shown in the `action_blocked` event when the action is refused.
    pub reason: Option<String>,
    /// A status that wore off during the check.
    pub cured: Option<StatusKind>,
}

impl ActGate {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            ..Self::default()
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            cured: None,
        }
    }
}

/// Status conditions, keyed by side. The engine never inspects them directly.
pub trait StatusService {
    /// Whether the side's active combatant may act this turn.
    fn can_act(&mut self, side: Side, rng: &mut dyn RandomSource) -> ActGate;

    /// Applies a status. Returns false when the side already has one.
    fn apply_status(&mut self, side: Side, kind: StatusKind, turns: u8) -> bool;

    /// Wake check after being struck by a damaging hit. Returns the status that was cleared.
    fn on_hit_target(&mut self, side: Side, rng: &mut dyn RandomSource) -> Option<StatusKind>;

    fn status_name(&self, side: Side) -> Option<String>;

    fn damage_power_multiplier(&self, side: Side) -> f64;

    /// Damage the status deals at the end of the turn.
    fn end_turn_damage(&mut self, _side: Side, _max_hp: u16) -> u16 {
        0
    }

    /// Forgets the side's status, e.g. when its combatant leaves the field.
    fn clear(&mut self, side: Side);
}

pub trait ProgressNotifier {
    fn on_enemy_defeated(&mut self, species: SpeciesId, level: u8);
    fn on_captured(&mut self, captured: &Combatant);
}

/// Points at which the engine hands state to persistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Checkpoint<'a> {
    Victory {
        party: &'a [Combatant],
    },
    Capture {
        captured: &'a Combatant,
        party: &'a [Combatant],
    },
}

pub trait Persistence {
    fn persist(&mut self, checkpoint: Checkpoint<'_>);
}

/// The collaborators a battle manager is constructed with.
pub struct Collaborators {
    pub content: Box<dyn ContentLookup>,
    pub status: Option<Box<dyn StatusService>>,
    pub progress: Option<Box<dyn ProgressNotifier>>,
    pub persistence: Option<Box<dyn Persistence>>,
}

impl Collaborators {
    pub fn new(content: impl ContentLookup + 'static) -> Self {
        Self {
            content: Box::new(content),
            status: None,
            progress: None,
            persistence: None,
        }
    }

    pub fn with_status(mut self, status: impl StatusService + 'static) -> Self {
        self.status = Some(Box::new(status));
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressNotifier + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.persistence = Some(Box::new(persistence));
        self
    }
}

/// Remembers which absent collaborators have already been reported.
#[derive(Debug, Clone, Default)]
pub struct ServiceWarnings {
    warned: HashSet<&'static str>,
}

impl ServiceWarnings {
    /// Logs that `name` is unavailable, the first time only.
    pub fn missing(&mut self, name: &'static str) {
        if self.warned.insert(name) {
            warn!(
                target: "battle::services",
                collaborator = name,
                "collaborator not configured; feature disabled for this battle"
            );
        }
    }

    pub fn has_warned(&self, name: &str) -> bool {
        self.warned.contains(name)
    }
}
