use crate::battle::catch::CatchError;
use crate::battle::state::Side;
use schema::{EffectKind, ItemId, SkillId, SpeciesId};
use std::path::PathBuf;
use thiserror::Error;

/// Why an action submission was refused. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("the battle has already ended")]
    BattleEnded,
    #[error("{0} already has a pending action")]
    AlreadyPending(Side),
    #[error("{0} has no PP remaining")]
    NoPpRemaining(SkillId),
    #[error("{0} is not known by the active combatant")]
    UnknownSkill(SkillId),
    #[error("the previous turn result has not been consumed")]
    ResultNotConsumed,
    #[error("{0} must switch in a new combatant first")]
    SwitchRequired(Side),
    #[error("{0} is not expected to act right now")]
    NotAwaitingSide(Side),
    #[error("party slot {0} cannot be switched in")]
    InvalidSwitchTarget(usize),
    #[error("capture is not possible: {0}")]
    CatchNotAllowed(CatchError),
    #[error("{0} does not exist")]
    UnknownItem(ItemId),
    #[error("escape is not allowed in this battle")]
    EscapeNotAllowed,
}

impl SubmitRejection {
    /// Stable reason code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitRejection::BattleEnded => "battle_ended",
            SubmitRejection::AlreadyPending(_) => "already_pending",
            SubmitRejection::NoPpRemaining(_) => "no_pp",
            SubmitRejection::UnknownSkill(_) => "unknown_skill",
            SubmitRejection::ResultNotConsumed => "result_not_consumed",
            SubmitRejection::SwitchRequired(_) => "switch_required",
            SubmitRejection::NotAwaitingSide(_) => "not_awaiting_side",
            SubmitRejection::InvalidSwitchTarget(_) => "invalid_switch_target",
            SubmitRejection::CatchNotAllowed(_) => "catch_not_allowed",
            SubmitRejection::UnknownItem(_) => "unknown_item",
            SubmitRejection::EscapeNotAllowed => "escape_not_allowed",
        }
    }
}

/// Returned by the effect registry when a hook cannot run. The executor logs it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectDispatchError {
    #[error("no handler registered for effect kind {0}")]
    UnhandledKind(EffectKind),
    #[error("handler for {expected} received a {found} payload")]
    PayloadMismatch {
        expected: EffectKind,
        found: EffectKind,
    },
}

impl EffectDispatchError {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectDispatchError::UnhandledKind(kind) => *kind,
            EffectDispatchError::PayloadMismatch { found, .. } => *found,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("{0} is not eligible to evolve")]
    NotEligible(SpeciesId),
    #[error("{species} evolves into {expected}, not {found}")]
    WrongTarget {
        species: SpeciesId,
        expected: SpeciesId,
        found: SpeciesId,
    },
    #[error("skill slot {0} is out of range")]
    SlotOutOfRange(usize),
    #[error("{0} is not waiting to be learned")]
    NotPending(SkillId),
}

pub type ProgressionResult<T> = Result<T, ProgressionError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse content tables")]
    Parse(#[from] ron::error::SpannedError),
}

pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse engine config")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleSetupError {
    #[error("{0} has an empty party")]
    EmptyParty(Side),
    #[error("{0} has no combatant able to battle")]
    NoHealthyCombatant(Side),
}
