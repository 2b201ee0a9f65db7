#[cfg(test)]
mod tests {
    use crate::battle::action::BattleAction;
    use crate::battle::state::{BattleEvent, EndReason, HpCause, OutcomeStatus, Side, TurnResult};
    use crate::battle::tests::common::{
        has_event, run_turn, skills, trainer_manager, use_skill, wild_manager,
        TestCombatantBuilder,
    };
    use crate::battle::turn_orchestrator::BattlePhase;
    use crate::errors::SubmitRejection;
    use pretty_assertions::assert_eq;
    use schema::{SpeciesId, StageAxis, StatBlock};

    #[test]
    fn test_voluntary_switch_resets_stages() {
        let lead = TestCombatantBuilder::new(1, 50).with_speed(80).build();
        let bench = TestCombatantBuilder::new(3, 50).build();
        let enemy = TestCombatantBuilder::new(2, 50)
            .with_skills(&[skills::GROWL, skills::TACKLE])
            .build();
        let mut manager = trainer_manager(vec![lead, bench], vec![enemy], vec![217, 217]);

        run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::GROWL));
        assert_eq!(manager.side(Side::Player).stages.get(StageAxis::Attack), -1);

        let result = run_turn(
            &mut manager,
            BattleAction::Switch { index: 1 },
            use_skill(skills::TACKLE),
        );

        let events: Vec<&BattleEvent> = result.iter_events().collect();
        let switched = events
            .iter()
            .position(|event| {
                matches!(
                    event,
                    BattleEvent::SwitchedIn {
                        side: Side::Player,
                        index: 1,
                        species: SpeciesId(3),
                    }
                )
            })
            .unwrap();
        let hit = events
            .iter()
            .position(|event| matches!(event, BattleEvent::Hit { side: Side::Enemy, .. }))
            .unwrap();
        assert!(switched < hit);

        let side = manager.side(Side::Player);
        assert_eq!(side.party.active_index(), 1);
        assert_eq!(side.stages.get(StageAxis::Attack), 0);
        // The tackle landed on the newcomer.
        assert!(side.active().current_hp() < side.active().max_hp());
    }

    fn bonus_damage(result: &TurnResult) -> Vec<u16> {
        result
            .iter_events()
            .filter_map(|event| match event {
                BattleEvent::HpChanged {
                    side: Side::Enemy,
                    old_hp,
                    new_hp,
                    cause: HpCause::Bonus,
                    ..
                } => Some(old_hp - new_hp),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_switching_in_starts_escalation_over() {
        let lead = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(&[skills::RAMPAGE])
            .build();
        let bench = TestCombatantBuilder::new(3, 50)
            .with_speed(80)
            .with_skills(&[skills::RAMPAGE])
            .build();
        let enemy = TestCombatantBuilder::new(2, 50)
            .with_base_stats(StatBlock {
                hp: 200,
                ..StatBlock::uniform(50)
            })
            .with_skills(&[skills::GROWL])
            .build();
        let mut manager =
            trainer_manager(vec![lead, bench], vec![enemy], vec![217, 217, 217]);

        let first = run_turn(&mut manager, use_skill(skills::RAMPAGE), use_skill(skills::GROWL));
        assert_eq!(bonus_damage(&first), vec![10]);
        let second = run_turn(&mut manager, use_skill(skills::RAMPAGE), use_skill(skills::GROWL));
        assert_eq!(bonus_damage(&second), vec![20]);

        run_turn(
            &mut manager,
            BattleAction::Switch { index: 1 },
            use_skill(skills::GROWL),
        );
        let fresh = run_turn(&mut manager, use_skill(skills::RAMPAGE), use_skill(skills::GROWL));
        assert_eq!(bonus_damage(&fresh), vec![10]);
    }

    #[test]
    fn test_forced_switch_flow() {
        let player = TestCombatantBuilder::new(1, 50).with_speed(80).build();
        let weak = TestCombatantBuilder::new(2, 50).with_hp(1).build();
        let reserve = TestCombatantBuilder::new(4, 50).build();
        let mut manager = trainer_manager(vec![player], vec![weak, reserve], vec![217]);

        let result = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::TACKLE));
        assert_eq!(result.outcome().status, OutcomeStatus::NeedSwitch);
        assert_eq!(result.outcome().need_switch, vec![Side::Enemy]);
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::ExperienceGained { .. }
        )));
        assert_eq!(manager.phase(), BattlePhase::AwaitingSwitch([false, true]));
        let next_seq = result.events().last().map(|logged| logged.seq + 1);

        assert_eq!(
            manager.submit_action(Side::Player, use_skill(skills::TACKLE)),
            Err(SubmitRejection::NotAwaitingSide(Side::Player))
        );
        assert_eq!(
            manager.submit_action(Side::Enemy, use_skill(skills::TACKLE)),
            Err(SubmitRejection::SwitchRequired(Side::Enemy))
        );
        assert_eq!(
            manager.submit_action(Side::Enemy, BattleAction::Switch { index: 0 }),
            Err(SubmitRejection::InvalidSwitchTarget(0))
        );

        manager
            .submit_action(Side::Enemy, BattleAction::Switch { index: 1 })
            .unwrap();
        let switch = manager.take_result().unwrap();

        assert_eq!(switch.turn(), 1);
        assert_eq!(switch.events().first().map(|logged| logged.seq), next_seq);
        assert!(matches!(
            switch.events()[0].event,
            BattleEvent::SwitchedIn {
                side: Side::Enemy,
                index: 1,
                species: SpeciesId(4),
            }
        ));
        assert_eq!(switch.outcome().status, OutcomeStatus::Continue);
        assert_eq!(manager.phase(), BattlePhase::AwaitingActions);
        assert_eq!(manager.turn(), 1);
    }

    #[test]
    fn test_fainted_replacement_is_announced_again_later() {
        let player = TestCombatantBuilder::new(1, 50).with_speed(80).build();
        let first = TestCombatantBuilder::new(2, 50).with_hp(1).build();
        let second = TestCombatantBuilder::new(4, 50).with_hp(1).build();
        let mut manager = trainer_manager(vec![player], vec![first, second], vec![217, 217]);

        run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::TACKLE));
        manager
            .submit_action(Side::Enemy, BattleAction::Switch { index: 1 })
            .unwrap();
        manager.take_result().unwrap();

        let result = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::TACKLE));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::Fainted {
                side: Side::Enemy,
                species: SpeciesId(4),
            }
        )));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::BattleEnded {
                winner: Some(Side::Player),
                reason: EndReason::Knockout,
            }
        )));
    }

    #[test]
    fn test_mutual_knockout_is_a_draw() {
        let player = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(&[skills::RECKLESS_CHARGE])
            .with_hp(1)
            .build();
        let enemy = TestCombatantBuilder::new(2, 50).with_hp(1).build();
        let mut manager = wild_manager(vec![player], enemy, vec![217]);

        let result = run_turn(
            &mut manager,
            use_skill(skills::RECKLESS_CHARGE),
            use_skill(skills::TACKLE),
        );

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::BattleEnded {
                winner: None,
                reason: EndReason::Draw,
            }
        )));
        assert!(!has_event(&result, |event| matches!(
            event,
            BattleEvent::ExperienceGained { .. }
        )));
        assert_eq!(manager.winner(), None);
        assert!(manager.is_over());
    }

    #[test]
    fn test_player_knockout_hands_the_win_to_the_enemy() {
        let player = TestCombatantBuilder::new(1, 50).with_hp(1).build();
        let enemy = TestCombatantBuilder::new(2, 50).with_speed(80).build();
        let mut manager = wild_manager(vec![player], enemy, vec![217]);

        let result = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::TACKLE));

        assert_eq!(result.outcome().winner, Some(Side::Enemy));
        assert!(!has_event(&result, |event| matches!(
            event,
            BattleEvent::SkillCast { side: Side::Player, .. }
        )));
        assert_eq!(result.outcome().reason.as_deref(), Some("knockout"));
    }
}
