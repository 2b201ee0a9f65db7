use crate::battle::action::BattleAction;
use crate::battle::catch::{can_attempt_catch, capsule_bonus};
use crate::battle::effects::EffectRegistry;
use crate::battle::executor::{ActionExecutor, ActionOutcome};
use crate::battle::runtime::EffectRuntime;
use crate::battle::state::{
    BattleEvent, BattleState, BattleType, EndReason, EventLog, HpCause, OrderBasis, Side, SideState,
    TurnResult,
};
use crate::combatant::{Combatant, Party};
use crate::config::EngineConfig;
use crate::content::ContentLookup;
use crate::errors::{BattleSetupError, SubmitRejection};
use crate::progression::{add_experience, LevelUpRecord, RewardCalculator};
use crate::rng::RandomSource;
use crate::services::{
    Checkpoint, Collaborators, Persistence, ProgressNotifier, ServiceWarnings, StatusService,
};
use crate::stats::effective_speed;
use tracing::{debug, info};

/// The two parties a battle starts with.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub battle_type: BattleType,
    pub player: Vec<Combatant>,
    pub enemy: Vec<Combatant>,
}

impl BattleSetup {
    pub fn wild(player: Vec<Combatant>, wild: Combatant) -> Self {
        Self {
            battle_type: BattleType::Wild,
            player,
            enemy: vec![wild],
        }
    }

    pub fn trainer(player: Vec<Combatant>, enemy: Vec<Combatant>) -> Self {
        Self {
            battle_type: BattleType::Trainer,
            player,
            enemy,
        }
    }
}

/// Where the manager is in its turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingActions,
    /// Indexed by [`Side::index`]: which sides must send in a replacement.
    AwaitingSwitch([bool; 2]),
    Ended,
}

impl BattlePhase {
    pub fn must_switch(&self, side: Side) -> bool {
        matches!(self, BattlePhase::AwaitingSwitch(required) if required[side.index()])
    }
}

/// Everything the manager lends to an executor for one action.
struct TurnServices {
    content: Box<dyn ContentLookup>,
    status: Option<Box<dyn StatusService>>,
    progress: Option<Box<dyn ProgressNotifier>>,
    persistence: Option<Box<dyn Persistence>>,
    registry: EffectRegistry,
    rng: Box<dyn RandomSource>,
    config: EngineConfig,
    warnings: ServiceWarnings,
}

impl TurnServices {
    fn executor(&mut self) -> ActionExecutor<'_> {
        ActionExecutor {
            content: self.content.as_ref(),
            status: self.status.as_deref_mut(),
            registry: &mut self.registry,
            rng: self.rng.as_mut(),
            warnings: &mut self.warnings,
            config: &self.config,
        }
    }
}

/// Owns one battle from setup to its final event.
///
/// Actions are queued through [`BattleManager::submit_action`]; the turn resolves
/// as soon as every required action is present, and its [`TurnResult`] waits in
/// the manager until [`BattleManager::take_result`] collects it.
pub struct BattleManager {
    state: BattleState,
    phase: BattlePhase,
    pending: [Option<BattleAction>; 2],
    result: Option<TurnResult>,
    /// Sequence number the next event of the current turn receives.
    next_seq: u32,
    winner: Option<Side>,
    services: TurnServices,
}

impl BattleManager {
    pub fn new(
        setup: BattleSetup,
        collaborators: Collaborators,
        config: EngineConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, BattleSetupError> {
        let player = Party::new(Side::Player, setup.player)?;
        let enemy = Party::new(Side::Enemy, setup.enemy)?;
        info!(
            target: "battle::turn",
            battle_type = ?setup.battle_type,
            player = %player.active().name,
            enemy = %enemy.active().name,
            "battle started"
        );

        Ok(Self {
            state: BattleState::new(setup.battle_type, player, enemy),
            phase: BattlePhase::AwaitingActions,
            pending: [None, None],
            result: None,
            next_seq: 0,
            winner: None,
            services: TurnServices {
                content: collaborators.content,
                status: collaborators.status,
                progress: collaborators.progress,
                persistence: collaborators.persistence,
                registry: EffectRegistry::standard(),
                rng,
                config,
                warnings: ServiceWarnings::default(),
            },
        })
    }

    /// Replaces the standard effect registry.
    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.services.registry = registry;
        self
    }

    // --- SUBMISSION ---

    /// Queues `action` for `side`. Once every required action is queued the turn
    /// resolves immediately; collect it with [`BattleManager::take_result`].
    ///
    /// A rejected submission changes nothing.
    pub fn submit_action(&mut self, side: Side, action: BattleAction) -> Result<(), SubmitRejection> {
        if self.phase == BattlePhase::Ended {
            return Err(SubmitRejection::BattleEnded);
        }
        if self.result.is_some() {
            return Err(SubmitRejection::ResultNotConsumed);
        }
        if self.pending[side.index()].is_some() {
            return Err(SubmitRejection::AlreadyPending(side));
        }
        if let BattlePhase::AwaitingSwitch(required) = self.phase {
            if !required[side.index()] {
                return Err(SubmitRejection::NotAwaitingSide(side));
            }
            if !action.is_switch() {
                return Err(SubmitRejection::SwitchRequired(side));
            }
        }
        self.validate(side, &action)?;

        debug!(target: "battle::turn", %side, ?action, "action queued");
        self.pending[side.index()] = Some(action);
        self.try_resolve();
        Ok(())
    }

    fn validate(&self, side: Side, action: &BattleAction) -> Result<(), SubmitRejection> {
        let side_state = self.state.side(side);
        match *action {
            BattleAction::Skill { skill } => {
                let slot = side_state
                    .active()
                    .skill_slot(skill)
                    .ok_or(SubmitRejection::UnknownSkill(skill))?;
                if self.services.content.skill(skill).is_none() {
                    return Err(SubmitRejection::UnknownSkill(skill));
                }
                if slot.pp() == 0 {
                    return Err(SubmitRejection::NoPpRemaining(skill));
                }
            }
            BattleAction::Catch { item } => {
                can_attempt_catch(&self.state, side).map_err(SubmitRejection::CatchNotAllowed)?;
                let item = self
                    .services
                    .content
                    .item(item)
                    .ok_or(SubmitRejection::UnknownItem(item))?;
                capsule_bonus(item).map_err(SubmitRejection::CatchNotAllowed)?;
            }
            BattleAction::Switch { index } => {
                if !side_state.party.can_switch_to(index) {
                    return Err(SubmitRejection::InvalidSwitchTarget(index));
                }
            }
            BattleAction::Escape => {
                if self.state.battle_type == BattleType::Trainer
                    && !self.services.config.allow_escape_from_trainer
                {
                    return Err(SubmitRejection::EscapeNotAllowed);
                }
            }
        }
        Ok(())
    }

    /// The result of the most recently resolved turn, if it has not been taken yet.
    pub fn take_result(&mut self) -> Option<TurnResult> {
        self.result.take()
    }

    fn try_resolve(&mut self) {
        let result = match (self.phase, self.pending) {
            (BattlePhase::AwaitingActions, [Some(player), Some(enemy)]) => {
                self.pending = [None, None];
                self.resolve_turn([player, enemy])
            }
            (BattlePhase::AwaitingSwitch(required), pending)
                if Side::BOTH
                    .iter()
                    .all(|side| !required[side.index()] || pending[side.index()].is_some()) =>
            {
                self.pending = [None, None];
                self.resolve_switches(pending)
            }
            _ => return,
        };
        self.result = Some(result);
    }

    // --- TURN RESOLUTION ---

    fn resolve_turn(&mut self, actions: [BattleAction; 2]) -> TurnResult {
        self.state.turn += 1;
        let turn = self.state.turn;
        let mut log = EventLog::new(turn);
        let mut level_ups = Vec::new();

        // 1. Initialization
        log.push(BattleEvent::TurnStarted { turn });
        for side in Side::BOTH {
            log.push(BattleEvent::ActionSubmitted {
                side,
                action: actions[side.index()],
            });
        }

        // 2. Action Prioritization
        let (first, second, basis) = determine_order(
            &self.state,
            self.services.content.as_ref(),
            &actions,
            self.services.rng.as_mut(),
        );
        debug!(target: "battle::turn", turn, %first, ?basis, "order determined");
        log.push(BattleEvent::OrderDetermined {
            first,
            second,
            basis,
        });

        // 3. Execute Actions in Order
        let mut acted = [false; 2];
        let mut interrupted = None;
        for actor in [first, second] {
            if self.any_active_fainted() {
                break;
            }
            let target_has_acted = acted[actor.opponent().index()];
            let outcome = self.services.executor().execute(
                &mut self.state,
                actor,
                actions[actor.index()],
                target_has_acted,
                &mut log,
            );
            acted[actor.index()] = true;
            self.report_faints(&mut log);

            match outcome {
                ActionOutcome::Done => {}
                ActionOutcome::Captured(entry) => {
                    interrupted = Some((EndReason::Capture, Some(*entry)));
                    break;
                }
                ActionOutcome::Escaped => {
                    interrupted = Some((EndReason::Escape, None));
                    break;
                }
            }
        }

        // Captures and escapes end the battle on the spot, with no tick.
        if let Some((reason, captured)) = interrupted {
            log.push(BattleEvent::TurnEnded { turn });
            let winner = match reason {
                EndReason::Capture => Some(Side::Player),
                _ => None,
            };
            if let Some(entry) = &captured {
                self.checkpoint_capture(entry);
            }
            self.finish(winner, reason, &mut log);
            return self.close_turn(log, level_ups, captured);
        }

        // 4. End-of-Turn Phase
        self.run_end_of_turn(&mut log);
        self.report_faints(&mut log);

        let player_down = self.state.side(Side::Player).active().is_fainted();
        let enemy_down = self.state.side(Side::Enemy).active().is_fainted();
        if enemy_down && !player_down {
            self.grant_rewards(&mut log, &mut level_ups);
        }
        log.push(BattleEvent::TurnEnded { turn });

        // 5. Battle-end evaluation
        let player_out = player_down && !self.state.side(Side::Player).party.has_reserves();
        let enemy_out = enemy_down && !self.state.side(Side::Enemy).party.has_reserves();
        match (player_out, enemy_out) {
            (true, true) => self.finish(None, EndReason::Draw, &mut log),
            (false, true) => {
                self.checkpoint_victory();
                self.finish(Some(Side::Player), EndReason::Knockout, &mut log);
            }
            (true, false) => self.finish(Some(Side::Enemy), EndReason::Knockout, &mut log),
            (false, false) if player_down || enemy_down => {
                let required = [player_down, enemy_down];
                for side in Side::BOTH.into_iter().filter(|side| required[side.index()]) {
                    log.push(BattleEvent::NeedSwitch { side });
                }
                debug!(target: "battle::turn", ?required, "waiting for replacements");
                self.phase = BattlePhase::AwaitingSwitch(required);
            }
            (false, false) => {}
        }

        self.close_turn(log, level_ups, None)
    }

    /// Sends in forced replacements. No tick runs and the turn counter stays put.
    fn resolve_switches(&mut self, pending: [Option<BattleAction>; 2]) -> TurnResult {
        let mut log = EventLog::resume(self.state.turn, self.next_seq);
        for side in Side::BOTH {
            if let Some(action) = pending[side.index()] {
                self.services
                    .executor()
                    .execute(&mut self.state, side, action, false, &mut log);
            }
        }
        self.phase = BattlePhase::AwaitingActions;
        self.close_turn(log, Vec::new(), None)
    }

    fn close_turn(
        &mut self,
        log: EventLog,
        level_ups: Vec<LevelUpRecord>,
        captured: Option<Combatant>,
    ) -> TurnResult {
        self.next_seq = log.next_seq();
        TurnResult::new(log, level_ups, captured)
    }

    fn any_active_fainted(&self) -> bool {
        Side::BOTH
            .iter()
            .any(|side| self.state.side(*side).active().is_fainted())
    }

    /// Emits `fainted` once per knocked-out active combatant.
    fn report_faints(&mut self, log: &mut EventLog) {
        for side in Side::BOTH {
            let side_state = self.state.side_mut(side);
            if side_state.active().is_fainted() && !side_state.faint_reported {
                side_state.faint_reported = true;
                let species = side_state.active().species;
                info!(target: "battle::turn", %side, %species, "combatant fainted");
                log.push(BattleEvent::Fainted { side, species });
            }
        }
    }

    /// Status damage for both sides, then the runtime tick for the player and then the enemy.
    fn run_end_of_turn(&mut self, log: &mut EventLog) {
        for side in Side::BOTH {
            let combatant = self.state.side_mut(side).active_mut();
            if combatant.is_fainted() {
                continue;
            }
            let Some(status) = self.services.status.as_deref_mut() else {
                self.services.warnings.missing("status");
                break;
            };
            let amount = status.end_turn_damage(side, combatant.max_hp());
            if amount == 0 {
                continue;
            }
            let old_hp = combatant.current_hp();
            combatant.take_damage(amount);
            log.push(BattleEvent::HpChanged {
                side,
                old_hp,
                new_hp: combatant.current_hp(),
                max_hp: combatant.max_hp(),
                cause: HpCause::Status,
            });
        }

        for side in Side::BOTH {
            let (own, other, runtime) = self.state.split_mut(side);
            runtime.tick_side(side, own.party.active_mut(), other.party.active_mut(), log);
        }
    }

    /// Experience, effort values and the progress notification for a defeated enemy.
    fn grant_rewards(&mut self, log: &mut EventLog, level_ups: &mut Vec<LevelUpRecord>) {
        let battle_type = self.state.battle_type;
        let [player_side, enemy_side] = &mut self.state.sides;
        let defeated = enemy_side.active();
        let recipient = player_side.active_mut();
        let services = &mut self.services;

        let amount = RewardCalculator.experience_for(defeated.level, battle_type, &services.config);
        log.push(BattleEvent::ExperienceGained {
            side: Side::Player,
            amount,
        });
        let records = add_experience(
            recipient,
            amount,
            services.config.max_level,
            services.content.as_ref(),
        );
        for record in &records {
            info!(target: "battle::turn", name = %recipient.name, level = record.level, "level up");
            log.push(BattleEvent::LevelUp {
                side: Side::Player,
                level: record.level,
                learned: record.learned.clone(),
                queued: record.queued.clone(),
                evolution_ready: record.evolution_ready,
            });
        }
        level_ups.extend(records);

        for (axis, amount) in RewardCalculator.grant_effort(recipient, defeated) {
            log.push(BattleEvent::EffortGained {
                side: Side::Player,
                axis,
                amount,
            });
        }

        match services.progress.as_deref_mut() {
            Some(progress) => progress.on_enemy_defeated(defeated.species, defeated.level),
            None => services.warnings.missing("progress"),
        }
    }

    fn checkpoint_victory(&mut self) {
        let party = self.state.side(Side::Player).party.members();
        match self.services.persistence.as_deref_mut() {
            Some(persistence) => persistence.persist(Checkpoint::Victory { party }),
            None => self.services.warnings.missing("persistence"),
        }
    }

    fn checkpoint_capture(&mut self, captured: &Combatant) {
        match self.services.progress.as_deref_mut() {
            Some(progress) => progress.on_captured(captured),
            None => self.services.warnings.missing("progress"),
        }
        let party = self.state.side(Side::Player).party.members();
        match self.services.persistence.as_deref_mut() {
            Some(persistence) => persistence.persist(Checkpoint::Capture { captured, party }),
            None => self.services.warnings.missing("persistence"),
        }
    }

    fn finish(&mut self, winner: Option<Side>, reason: EndReason, log: &mut EventLog) {
        log.push(BattleEvent::BattleEnded { winner, reason });
        self.phase = BattlePhase::Ended;
        self.winner = winner;
        self.pending = [None, None];
        self.state.runtime.clear();
        info!(target: "battle::turn", ?winner, reason = reason.code(), turn = self.state.turn, "battle ended");
    }

    // --- ACCESSORS ---

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn side(&self, side: Side) -> &SideState {
        self.state.side(side)
    }

    pub fn runtime(&self) -> &EffectRuntime {
        &self.state.runtime
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.phase == BattlePhase::Ended
    }

    pub fn has_pending(&self, side: Side) -> bool {
        self.pending[side.index()].is_some()
    }

    pub fn player_party(&self) -> &[Combatant] {
        self.state.side(Side::Player).party.members()
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.services.registry
    }

    pub fn warnings(&self) -> &ServiceWarnings {
        &self.services.warnings
    }

    /// Hands the player's party back, e.g. to write it to the roster after the battle.
    pub fn into_player_party(self) -> Vec<Combatant> {
        let [player, _] = self.state.sides;
        player.party.into_members()
    }
}

/// Orders two actions: tier, then total priority, then effective speed, then a coin flip.
pub(crate) fn determine_order(
    state: &BattleState,
    content: &dyn ContentLookup,
    actions: &[BattleAction; 2],
    rng: &mut dyn RandomSource,
) -> (Side, Side, OrderBasis) {
    let decided = |player_first: bool, basis| {
        let first = if player_first { Side::Player } else { Side::Enemy };
        (first, first.opponent(), basis)
    };
    let [player, enemy] = actions;

    if player.tier() != enemy.tier() {
        return decided(player.tier() > enemy.tier(), OrderBasis::ActionTier);
    }

    let priority = |side: Side| -> i16 {
        match actions[side.index()] {
            BattleAction::Skill { skill } => {
                let base = content.skill(skill).map_or(0, |data| data.priority as i16);
                base + state.runtime.side(side).priority_bonus() as i16
            }
            _ => 0,
        }
    };
    let (player_priority, enemy_priority) = (priority(Side::Player), priority(Side::Enemy));
    if player_priority != enemy_priority {
        return decided(player_priority > enemy_priority, OrderBasis::Priority);
    }

    let speed = |side: Side| {
        let side_state = state.side(side);
        effective_speed(side_state.active(), &side_state.stages)
    };
    let (player_speed, enemy_speed) = (speed(Side::Player), speed(Side::Enemy));
    if player_speed != enemy_speed {
        return decided(player_speed > enemy_speed, OrderBasis::Speed);
    }

    decided(rng.int_in(0, 1, "speed_tie") == 0, OrderBasis::Coin)
}

