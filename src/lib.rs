// In: src/lib.rs

//! Elf Battle Engine
//!
//! Resolves turn-based creature battles one turn at a time: action ordering,
//! skill execution, damage and accuracy formulas, a pluggable skill-effect
//! registry, timed per-side effects, capture attempts and post-battle
//! progression. Every turn produces an ordered, replayable event log.
//!
//! Static content (skills, species, items, type chart), status conditions,
//! quest progress and persistence are external collaborators injected through
//! [`Collaborators`].

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod config;
pub mod content;
pub mod errors;
pub mod progression;
pub mod rng;
pub mod services;
pub mod stats;
pub mod status;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    EffectKind, EffectTarget, ElementType, EvolutionRule, FieldKind, ItemData, ItemId, ItemKind,
    LearnableSkill, SkillCategory, SkillData, SkillEffect, SkillId, SpeciesData, SpeciesId,
    StageAxis, StageChange, StatAxis, StatBlock, StatusKind,
};

// --- From this crate's modules (`src/`) ---

// Battle orchestration and its result types.
pub use battle::action::BattleAction;
pub use battle::effects::EffectRegistry;
pub use battle::state::{
    BattleEvent, BattleType, EventLog, LoggedEvent, OutcomeStatus, Side, TurnOutcome, TurnResult,
};
pub use battle::turn_orchestrator::{BattleManager, BattlePhase, BattleSetup};

// Combatants and progression.
pub use combatant::{Combatant, Party, SkillSlot};
pub use progression::{add_experience, evolve, exp_to_next_level, LevelUpRecord};

// Collaborators and configuration.
pub use config::EngineConfig;
pub use content::{ContentLookup, ContentTables, StaticContent};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use services::{Checkpoint, Collaborators, Persistence, ProgressNotifier, StatusService};
pub use status::StandardStatusService;

// Crate-specific error types.
pub use errors::{
    BattleSetupError, ConfigError, ContentError, EffectDispatchError, ProgressionError,
    SubmitRejection,
};
