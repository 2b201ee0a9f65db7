#[cfg(test)]
mod tests {
    use crate::battle::runtime::RuntimeSlot;
    use crate::battle::state::{BattleEvent, ExpiredEffect, HpCause, Side, TurnResult};
    use crate::battle::tests::common::{
        count_events, has_event, manager_with, run_turn, skills, test_content, trainer_manager,
        use_skill, wild_manager, TestCombatantBuilder,
    };
    use crate::battle::turn_orchestrator::{BattleManager, BattleSetup};
    use crate::rng::{RandomSource, ScriptedRandom};
    use crate::services::{ActGate, Collaborators, StatusService};
    use pretty_assertions::assert_eq;
    use schema::{EffectKind, ElementType, SkillId, StageAxis, StatusKind};

    /// A fast player knowing `player_skills` against a slower enemy knowing `enemy_skills`.
    fn duel(player_skills: &[SkillId], enemy_skills: &[SkillId], rolls: Vec<u32>) -> BattleManager {
        let player = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(player_skills)
            .build();
        let enemy = TestCombatantBuilder::new(2, 50)
            .with_skills(enemy_skills)
            .build();
        trainer_manager(vec![player], vec![enemy], rolls)
    }

    fn hits_by(result: &TurnResult, attacker: Side) -> Vec<(u8, u16)> {
        result
            .iter_events()
            .filter_map(|event| match event {
                BattleEvent::Hit {
                    side,
                    hit_number,
                    damage,
                    ..
                } if *side == attacker => Some((*hit_number, *damage)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pp_is_spent_before_the_cast_is_announced() {
        let mut manager = duel(&[skills::GROWL], &[skills::GROWL], vec![]);
        let result = run_turn(&mut manager, use_skill(skills::GROWL), use_skill(skills::GROWL));

        let events: Vec<&BattleEvent> = result.iter_events().collect();
        let pp = events
            .iter()
            .position(|event| matches!(event, BattleEvent::PpChanged { side: Side::Player, .. }));
        let cast = events
            .iter()
            .position(|event| matches!(event, BattleEvent::SkillCast { side: Side::Player, .. }));
        assert!(pp.is_some() && pp < cast);
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::PpChanged {
                old_pp: 40,
                new_pp: 39,
                ..
            }
        )));
    }

    #[test]
    fn test_protection_blocks_damage_then_expires() {
        let mut manager = duel(&[skills::GUARD], &[skills::TACKLE], vec![]);
        let result = run_turn(&mut manager, use_skill(skills::GUARD), use_skill(skills::TACKLE));

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::Protected { side: Side::Player }
        )));
        assert!(hits_by(&result, Side::Enemy).is_empty());
        let player = manager.side(Side::Player).active();
        assert_eq!(player.current_hp(), player.max_hp());

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::EffectExpired {
                side: Side::Player,
                effect: ExpiredEffect::Slot(RuntimeSlot::Protection),
            }
        )));
        assert!(!manager.runtime().side(Side::Player).has(RuntimeSlot::Protection));
    }

    #[test]
    fn test_protection_lets_status_skills_through() {
        let mut manager = duel(&[skills::GUARD], &[skills::GROWL], vec![]);
        run_turn(&mut manager, use_skill(skills::GUARD), use_skill(skills::GROWL));
        assert_eq!(manager.side(Side::Player).stages.get(StageAxis::Attack), -1);
    }

    #[test]
    fn test_first_strike_shield_only_stops_attackers_that_move_first() {
        let player = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(&[skills::VOID_WALL, skills::TACKLE])
            .build();
        let enemy = TestCombatantBuilder::new(2, 50)
            .with_skills(&[skills::TACKLE, skills::QUICK_JAB])
            .build();
        let mut manager = trainer_manager(vec![player], vec![enemy], vec![217, 217]);

        // The shield goes up first, so the enemy's later tackle is not a first strike.
        let first = run_turn(&mut manager, use_skill(skills::VOID_WALL), use_skill(skills::TACKLE));
        assert_eq!(hits_by(&first, Side::Enemy).len(), 1);
        assert!(manager.runtime().side(Side::Player).has(RuntimeSlot::VoidShield));

        // A priority jab lands before the player acts and is cancelled outright.
        let second = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::QUICK_JAB));
        assert!(has_event(&second, |event| matches!(
            event,
            BattleEvent::ActionShielded {
                side: Side::Enemy,
                shielded: Side::Player,
            }
        )));
        assert!(hits_by(&second, Side::Enemy).is_empty());
        assert_eq!(hits_by(&second, Side::Player).len(), 1);
    }

    #[test]
    fn test_miss_ends_the_action() {
        let mut manager = duel(&[skills::HEAVY_SLAM], &[skills::GROWL], vec![81]);
        let result = run_turn(&mut manager, use_skill(skills::HEAVY_SLAM), use_skill(skills::GROWL));

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::Miss {
                side: Side::Player,
                target: Side::Enemy,
                ..
            }
        )));
        assert!(hits_by(&result, Side::Player).is_empty());
        // The PP is still spent.
        let slot = manager
            .side(Side::Player)
            .active()
            .skill_slot(skills::HEAVY_SLAM)
            .map(|slot| slot.pp());
        assert_eq!(slot, Some(4));
    }

    #[test]
    fn test_accuracy_roll_at_the_threshold_hits() {
        let mut manager = duel(&[skills::HEAVY_SLAM], &[skills::GROWL], vec![80, 217]);
        let result = run_turn(&mut manager, use_skill(skills::HEAVY_SLAM), use_skill(skills::GROWL));
        assert_eq!(hits_by(&result, Side::Player).len(), 1);
    }

    #[test]
    fn test_sealed_user_casts_without_effect() {
        let mut manager = duel(&[skills::SEAL], &[skills::GROWL], vec![]);
        let result = run_turn(&mut manager, use_skill(skills::SEAL), use_skill(skills::GROWL));

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::EffectApplied {
                side: Side::Enemy,
                effect: EffectKind::Seal,
            }
        )));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::EffectSuppressed {
                side: Side::Enemy,
                effect: EffectKind::StatChange,
            }
        )));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::SkillCast {
                side: Side::Enemy,
                ..
            }
        )));
        assert_eq!(manager.side(Side::Player).stages.get(StageAxis::Attack), 0);
    }

    #[test]
    fn test_multi_hit_rolls_hit_count_once() {
        // 3 hits, then one damage roll per hit.
        let mut manager = duel(&[skills::FLURRY], &[skills::GROWL], vec![3, 217, 217, 217]);
        let result = run_turn(&mut manager, use_skill(skills::FLURRY), use_skill(skills::GROWL));

        let hits = hits_by(&result, Side::Player);
        let numbers: Vec<u8> = hits.iter().map(|(number, _)| *number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let total: u16 = hits.iter().map(|(_, damage)| *damage).sum();
        let enemy = manager.side(Side::Enemy).active();
        assert_eq!(enemy.max_hp() - enemy.current_hp(), total);
    }

    #[test]
    fn test_multi_hit_stops_when_the_target_faints() {
        let player = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(&[skills::FLURRY])
            .build();
        let enemy = TestCombatantBuilder::new(2, 50).with_hp(5).build();
        let mut manager = wild_manager(vec![player], enemy, vec![5, 217]);

        let result = run_turn(&mut manager, use_skill(skills::FLURRY), use_skill(skills::TACKLE));
        assert_eq!(hits_by(&result, Side::Player).len(), 1);
        assert!(result.outcome().ended);
    }

    #[test]
    fn test_immune_side_takes_zero_damage() {
        let mut manager = duel(&[skills::PHASE_OUT], &[skills::TACKLE], vec![217]);
        let result = run_turn(&mut manager, use_skill(skills::PHASE_OUT), use_skill(skills::TACKLE));

        assert_eq!(hits_by(&result, Side::Enemy), vec![(1, 0)]);
        let player = manager.side(Side::Player).active();
        assert_eq!(player.current_hp(), player.max_hp());
    }

    #[test]
    fn test_fixed_damage_ignores_the_formula() {
        let mut manager = duel(&[skills::SONIC_PULSE], &[skills::GROWL], vec![]);
        let result = run_turn(&mut manager, use_skill(skills::SONIC_PULSE), use_skill(skills::GROWL));

        assert_eq!(hits_by(&result, Side::Player), vec![(1, 20)]);
        let enemy = manager.side(Side::Enemy).active();
        assert_eq!(enemy.current_hp(), enemy.max_hp() - 20);
    }

    #[test]
    fn test_type_immunity_deals_nothing() {
        let player = TestCombatantBuilder::new(1, 50).with_speed(80).build();
        let ghost = TestCombatantBuilder::new(2, 50)
            .with_element(ElementType::Shadow)
            .with_skills(&[skills::GROWL])
            .build();
        let mut manager = wild_manager(vec![player], ghost, vec![217]);

        let result = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::GROWL));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::Hit {
                side: Side::Player,
                damage: 0,
                effectiveness,
                ..
            } if *effectiveness == 0.0
        )));
    }

    #[test]
    fn test_hp_change_follows_each_hit() {
        let mut manager = duel(&[skills::TACKLE], &[skills::GROWL], vec![255]);
        let result = run_turn(&mut manager, use_skill(skills::TACKLE), use_skill(skills::GROWL));

        let events: Vec<&BattleEvent> = result.iter_events().collect();
        let hit = events
            .iter()
            .position(|event| matches!(event, BattleEvent::Hit { .. }))
            .unwrap();
        assert!(matches!(
            events[hit + 1],
            BattleEvent::HpChanged {
                side: Side::Enemy,
                cause: HpCause::Attack,
                ..
            }
        ));
    }

    #[test]
    fn test_sleep_blocks_the_target_from_acting() {
        let mut manager = duel(&[skills::SPORE], &[skills::TACKLE], vec![]);
        let result = run_turn(&mut manager, use_skill(skills::SPORE), use_skill(skills::TACKLE));

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::StatusApplied {
                side: Side::Enemy,
                status,
            } if status == "sleep"
        )));
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::ActionBlocked {
                side: Side::Enemy,
                reason,
            } if reason == "asleep"
        )));
        assert_eq!(
            count_events(&result, |event| matches!(event, BattleEvent::SkillCast { .. })),
            1
        );
    }

    /// Keeps the enemy stunned without explaining why.
    struct SilentStun;

    impl StatusService for SilentStun {
        fn can_act(&mut self, side: Side, _rng: &mut dyn RandomSource) -> ActGate {
            match side {
                Side::Enemy => ActGate::default(),
                Side::Player => ActGate::allow(),
            }
        }

        fn apply_status(&mut self, _side: Side, _kind: StatusKind, _turns: u8) -> bool {
            false
        }

        fn on_hit_target(&mut self, _side: Side, _rng: &mut dyn RandomSource) -> Option<StatusKind> {
            None
        }

        fn status_name(&self, side: Side) -> Option<String> {
            (side == Side::Enemy).then(|| "stun".to_string())
        }

        fn damage_power_multiplier(&self, _side: Side) -> f64 {
            1.0
        }

        fn clear(&mut self, _side: Side) {}
    }

    #[test]
    fn test_blocked_action_falls_back_to_the_status_name() {
        let player = TestCombatantBuilder::new(1, 50)
            .with_speed(80)
            .with_skills(&[skills::GROWL])
            .build();
        let enemy = TestCombatantBuilder::new(2, 50)
            .with_skills(&[skills::GROWL])
            .build();
        let mut manager = manager_with(
            BattleSetup::trainer(vec![player], vec![enemy]),
            Collaborators::new(test_content()).with_status(SilentStun),
            ScriptedRandom::new(vec![]),
        );
        let result = run_turn(&mut manager, use_skill(skills::GROWL), use_skill(skills::GROWL));

        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::ActionBlocked {
                side: Side::Enemy,
                reason,
            } if reason == "held back by stun"
        )));
        assert_eq!(manager.side(Side::Player).stages.get(StageAxis::Attack), 0);
    }

    #[test]
    fn test_recoil_hurts_the_user() {
        let mut manager = duel(&[skills::RECKLESS_CHARGE], &[skills::GROWL], vec![217]);
        let result = run_turn(
            &mut manager,
            use_skill(skills::RECKLESS_CHARGE),
            use_skill(skills::GROWL),
        );

        let dealt: u16 = hits_by(&result, Side::Player).iter().map(|(_, d)| *d).sum();
        assert!(dealt > 0);
        let player = manager.side(Side::Player).active();
        assert_eq!(player.max_hp() - player.current_hp(), dealt);
        assert!(has_event(&result, |event| matches!(
            event,
            BattleEvent::HpChanged {
                side: Side::Player,
                cause: HpCause::Recoil,
                ..
            }
        )));
    }
}
