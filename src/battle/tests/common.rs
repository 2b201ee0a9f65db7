use crate::battle::action::BattleAction;
use crate::battle::effects::HookContext;
use crate::battle::runtime::EffectRuntime;
use crate::battle::stages::StatStages;
use crate::battle::state::{BattleEvent, EventLog, Side, TurnResult};
use crate::battle::turn_orchestrator::{BattleManager, BattleSetup};
use crate::combatant::{Combatant, SkillSlot};
use crate::config::EngineConfig;
use crate::content::{ContentTables, StaticContent};
use crate::rng::{RandomSource, ScriptedRandom};
use crate::services::{
    Checkpoint, Collaborators, Persistence, ProgressNotifier, ServiceWarnings, StatusService,
};
use crate::status::StandardStatusService;
use crate::ContentLookup;
use schema::{
    EffectTarget, ElementType, EvolutionRule, FieldKind, ItemData, ItemKind,
    LearnableSkill, SkillCategory, SkillData, SkillEffect, SkillId, SpeciesData, SpeciesId,
    StageAxis, StageChange, StatBlock, StatusKind,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Skill ids available in [`test_content`].
///
/// Every test skill has accuracy 0 (never rolls to hit) and a crit rate of 0
/// (never rolls to crit) unless noted, so a damaging skill consumes exactly one
/// `damage_roll` per hit.
pub mod skills {
    use schema::SkillId;

    pub const TACKLE: SkillId = SkillId(1);
    pub const GROWL: SkillId = SkillId(2);
    pub const EMBER: SkillId = SkillId(3);
    /// Priority +1.
    pub const QUICK_JAB: SkillId = SkillId(4);
    /// Accuracy 80, so it rolls to hit.
    pub const HEAVY_SLAM: SkillId = SkillId(5);
    pub const GUARD: SkillId = SkillId(6);
    pub const VOID_WALL: SkillId = SkillId(7);
    pub const SEAL: SkillId = SkillId(8);
    /// Two to five hits.
    pub const FLURRY: SkillId = SkillId(9);
    pub const PHASE_OUT: SkillId = SkillId(10);
    /// Always 20 damage.
    pub const SONIC_PULSE: SkillId = SkillId(11);
    /// Recoil equal to the damage dealt.
    pub const RECKLESS_CHARGE: SkillId = SkillId(12);
    pub const TOXIC_CLOUD: SkillId = SkillId(13);
    pub const MIST: SkillId = SkillId(14);
    pub const SPORE: SkillId = SkillId(15);
    /// Bonus damage of 10, growing by 10 with every earlier use by the same combatant.
    pub const RAMPAGE: SkillId = SkillId(16);
    /// Has no entry in the content tables.
    pub const MISSING: SkillId = SkillId(999);
}

pub mod items {
    use schema::ItemId;

    pub const CAPSULE: ItemId = ItemId(1);
    pub const BERRY: ItemId = ItemId(2);
}

fn skill(
    id: SkillId,
    name: &str,
    element: ElementType,
    category: SkillCategory,
    power: u16,
    max_pp: u8,
) -> SkillData {
    SkillData {
        id,
        name: name.to_string(),
        element,
        category,
        power,
        accuracy: 0,
        max_pp,
        priority: 0,
        crit_rate: 0,
        effect: None,
    }
}

fn with_effect(mut data: SkillData, effect: SkillEffect) -> SkillData {
    data.effect = Some(effect);
    data
}

fn test_skills() -> Vec<SkillData> {
    use ElementType::*;
    use SkillCategory::*;

    let mut quick_jab = skill(skills::QUICK_JAB, "Quick Jab", Normal, Physical, 40, 30);
    quick_jab.priority = 1;
    let mut heavy_slam = skill(skills::HEAVY_SLAM, "Heavy Slam", Normal, Physical, 120, 5);
    heavy_slam.accuracy = 80;

    vec![
        skill(skills::TACKLE, "Tackle", Normal, Physical, 40, 35),
        with_effect(
            skill(skills::GROWL, "Growl", Normal, Status, 0, 40),
            SkillEffect::StatChange {
                target: EffectTarget::Opponent,
                changes: vec![StageChange {
                    axis: StageAxis::Attack,
                    delta: -1,
                }],
                chance: 100,
            },
        ),
        skill(skills::EMBER, "Ember", Fire, Special, 40, 25),
        quick_jab,
        heavy_slam,
        with_effect(
            skill(skills::GUARD, "Guard", Normal, Status, 0, 10),
            SkillEffect::Protect { turns: 1 },
        ),
        with_effect(
            skill(skills::VOID_WALL, "Void Wall", Shadow, Status, 0, 10),
            SkillEffect::VoidShield {
                turns: 2,
                first_strike_only: true,
            },
        ),
        with_effect(
            skill(skills::SEAL, "Seal", Shadow, Status, 0, 10),
            SkillEffect::Seal { turns: 2 },
        ),
        with_effect(
            skill(skills::FLURRY, "Flurry", Normal, Physical, 15, 20),
            SkillEffect::MultiHit { min: 2, max: 5 },
        ),
        with_effect(
            skill(skills::PHASE_OUT, "Phase Out", Light, Status, 0, 10),
            SkillEffect::ImmuneDamage { turns: 1 },
        ),
        with_effect(
            skill(skills::SONIC_PULSE, "Sonic Pulse", Normal, Special, 0, 20),
            SkillEffect::FixedDamage { amount: 20 },
        ),
        with_effect(
            skill(skills::RECKLESS_CHARGE, "Reckless Charge", Normal, Physical, 90, 15),
            SkillEffect::Recoil { percent: 100 },
        ),
        with_effect(
            skill(skills::TOXIC_CLOUD, "Toxic Cloud", Shadow, Status, 0, 20),
            SkillEffect::DamageOverTime { amount: 8, turns: 3 },
        ),
        with_effect(
            skill(skills::MIST, "Mist", Ice, Status, 0, 30),
            SkillEffect::Field {
                field: FieldKind::Mist,
                turns: 5,
            },
        ),
        with_effect(
            skill(skills::SPORE, "Spore", Grass, Status, 0, 15),
            SkillEffect::InflictStatus {
                status: StatusKind::Sleep,
                chance: 100,
                turns: 2,
                target: EffectTarget::Opponent,
            },
        ),
        with_effect(
            skill(skills::RAMPAGE, "Rampage", Normal, Physical, 40, 20),
            SkillEffect::EscalatingDamage { base: 10, step: 10 },
        ),
    ]
}

/// A plain Normal-type species with uniform base stats of 50 and no learnset.
pub fn test_species(n: u32) -> SpeciesData {
    SpeciesData {
        id: SpeciesId(n),
        name: format!("Testling {}", n),
        element: ElementType::Normal,
        base_stats: StatBlock::uniform(50),
        learnset: Vec::new(),
        evolution: None,
        catch_rate: 45,
        ev_yield: StatBlock {
            attack: 1,
            ..StatBlock::default()
        },
    }
}

pub fn test_content() -> StaticContent {
    StaticContent::new(ContentTables {
        skills: test_skills(),
        species: (1..=6).map(test_species).collect(),
        items: vec![
            ItemData {
                id: items::CAPSULE,
                name: "Capsule".to_string(),
                kind: ItemKind::Capsule { bonus: 10 },
            },
            ItemData {
                id: items::BERRY,
                name: "Berry".to_string(),
                kind: ItemKind::Other,
            },
        ],
        type_chart: Vec::new(),
    })
}

/// A builder for test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let combatant = TestCombatantBuilder::new(1, 25)
///     .with_skills(&[skills::TACKLE, skills::GROWL])
///     .with_hp(10)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: SpeciesData,
    level: u8,
    ivs: StatBlock<u8>,
    skills: Vec<SkillId>,
    current_hp: Option<u16>,
}

impl TestCombatantBuilder {
    /// Starts from [`test_species`]`(species)` with IVs of 15 and Tackle as its only skill.
    pub fn new(species: u32, level: u8) -> Self {
        Self {
            species: test_species(species),
            level,
            ivs: StatBlock::uniform(15),
            skills: vec![skills::TACKLE],
            current_hp: None,
        }
    }

    pub fn with_skills(mut self, skills: &[SkillId]) -> Self {
        self.skills = skills.to_vec();
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_base_stats(mut self, base_stats: StatBlock<u16>) -> Self {
        self.species.base_stats = base_stats;
        self
    }

    /// Raises or lowers base speed only, to force a turn order without a coin flip.
    pub fn with_speed(mut self, speed: u16) -> Self {
        self.species.base_stats.speed = speed;
        self
    }

    pub fn with_ivs(mut self, ivs: StatBlock<u8>) -> Self {
        self.ivs = ivs;
        self
    }

    pub fn with_learnset(mut self, learnset: Vec<LearnableSkill>) -> Self {
        self.species.learnset = learnset;
        self
    }

    pub fn with_evolution(mut self, rule: EvolutionRule) -> Self {
        self.species.evolution = Some(rule);
        self
    }

    pub fn with_catch_rate(mut self, catch_rate: u8) -> Self {
        self.species.catch_rate = catch_rate;
        self
    }

    pub fn with_element(mut self, element: ElementType) -> Self {
        self.species.element = element;
        self
    }

    pub fn build(self) -> Combatant {
        let content = test_content();
        let mut combatant = Combatant::new(&self.species, self.level, self.ivs);
        combatant.skills = self
            .skills
            .iter()
            .map(|id| {
                let max_pp = content.skill(*id).map_or(10, |data| data.max_pp);
                SkillSlot::new(*id, max_pp)
            })
            .collect();
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        combatant
    }
}

/// Owns everything a [`HookContext`] borrows, so handlers can be driven directly.
///
/// The player's combatant is the attacker and the enemy's the defender, both at
/// level 50.
pub struct HookHarness {
    pub skill: SkillData,
    pub effect: SkillEffect,
    pub attacker: Combatant,
    pub defender: Combatant,
    pub attacker_stages: StatStages,
    pub defender_stages: StatStages,
    pub runtime: EffectRuntime,
    pub status: Option<Box<dyn StatusService>>,
    pub log: EventLog,
    pub warnings: ServiceWarnings,
    pub config: EngineConfig,
}

impl HookHarness {
    pub fn new(effect: SkillEffect) -> Self {
        let mut skill = skill(SkillId(100), "Test Skill", ElementType::Normal, SkillCategory::Physical, 40, 10);
        skill.effect = Some(effect.clone());
        Self {
            skill,
            effect,
            attacker: TestCombatantBuilder::new(1, 50).build(),
            defender: TestCombatantBuilder::new(2, 50).build(),
            attacker_stages: StatStages::default(),
            defender_stages: StatStages::default(),
            runtime: EffectRuntime::default(),
            status: None,
            log: EventLog::new(1),
            warnings: ServiceWarnings::default(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_status(mut self, status: impl StatusService + 'static) -> Self {
        self.status = Some(Box::new(status));
        self
    }

    pub fn context<'a>(&'a mut self, rng: &'a mut dyn RandomSource) -> HookContext<'a> {
        HookContext {
            actor: Side::Player,
            target: Side::Enemy,
            skill: &self.skill,
            effect: &self.effect,
            attacker: &mut self.attacker,
            defender: &mut self.defender,
            attacker_stages: &mut self.attacker_stages,
            defender_stages: &mut self.defender_stages,
            runtime: &mut self.runtime,
            status: self.status.as_deref_mut(),
            rng,
            log: &mut self.log,
            warnings: &mut self.warnings,
            config: &self.config,
        }
    }
}

// --- RECORDING COLLABORATORS ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressRecord {
    pub defeated: Vec<(SpeciesId, u8)>,
    pub captured: Vec<SpeciesId>,
}

/// Progress notifier that keeps what it was told; clones share one record.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress(pub Rc<RefCell<ProgressRecord>>);

impl ProgressNotifier for RecordingProgress {
    fn on_enemy_defeated(&mut self, species: SpeciesId, level: u8) {
        self.0.borrow_mut().defeated.push((species, level));
    }

    fn on_captured(&mut self, captured: &Combatant) {
        self.0.borrow_mut().captured.push(captured.species);
    }
}

/// An owned copy of a persistence checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedCheckpoint {
    Victory { party: Vec<Combatant> },
    Capture { captured: Combatant, party_size: usize },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPersistence(pub Rc<RefCell<Vec<SavedCheckpoint>>>);

impl Persistence for RecordingPersistence {
    fn persist(&mut self, checkpoint: Checkpoint<'_>) {
        let saved = match checkpoint {
            Checkpoint::Victory { party } => SavedCheckpoint::Victory {
                party: party.to_vec(),
            },
            Checkpoint::Capture { captured, party } => SavedCheckpoint::Capture {
                captured: captured.clone(),
                party_size: party.len(),
            },
        };
        self.0.borrow_mut().push(saved);
    }
}

// --- MANAGER HELPERS ---

/// Test content plus the standard status service; no progress or persistence.
pub fn collaborators() -> Collaborators {
    Collaborators::new(test_content()).with_status(StandardStatusService::new())
}

pub fn manager_with(
    setup: BattleSetup,
    collaborators: Collaborators,
    rolls: ScriptedRandom,
) -> BattleManager {
    BattleManager::new(setup, collaborators, EngineConfig::default(), Box::new(rolls))
        .expect("test setup should be valid")
}

pub fn wild_manager(player: Vec<Combatant>, wild: Combatant, rolls: Vec<u32>) -> BattleManager {
    manager_with(
        BattleSetup::wild(player, wild),
        collaborators(),
        ScriptedRandom::new(rolls),
    )
}

pub fn trainer_manager(player: Vec<Combatant>, enemy: Vec<Combatant>, rolls: Vec<u32>) -> BattleManager {
    manager_with(
        BattleSetup::trainer(player, enemy),
        collaborators(),
        ScriptedRandom::new(rolls),
    )
}

/// Submits both actions and collects the resolved turn.
pub fn run_turn(manager: &mut BattleManager, player: BattleAction, enemy: BattleAction) -> TurnResult {
    manager
        .submit_action(Side::Player, player)
        .expect("player action should be accepted");
    manager
        .submit_action(Side::Enemy, enemy)
        .expect("enemy action should be accepted");
    manager.take_result().expect("turn should have resolved")
}

pub fn use_skill(skill: SkillId) -> BattleAction {
    BattleAction::Skill { skill }
}

/// Whether any event of the turn matches `predicate`.
pub fn has_event(result: &TurnResult, predicate: impl Fn(&BattleEvent) -> bool) -> bool {
    result.iter_events().any(predicate)
}

pub fn count_events(result: &TurnResult, predicate: impl Fn(&BattleEvent) -> bool) -> usize {
    result.iter_events().filter(|event| predicate(event)).count()
}
