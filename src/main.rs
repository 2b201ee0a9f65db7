use anyhow::{anyhow, Context, Result};
use elf_battle::{
    BattleAction, BattleManager, BattlePhase, BattleSetup, Collaborators, Combatant, ContentLookup,
    EngineConfig, SeededRandom, Side, SpeciesId, StandardStatusService, StatBlock, StaticContent,
};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TURN_LIMIT: usize = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let data_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));
    let seed = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("invalid seed '{}'", raw))?,
        None => 7,
    };

    let config = EngineConfig::load(data_dir.join("engine.ron"))?;
    let content = StaticContent::load(data_dir.join("content.ron"))?;
    info!(data = %data_dir.display(), seed, "content loaded");

    let mut setup_rng = SeededRandom::new(seed);
    let starter = content
        .species(SpeciesId(1))
        .ok_or_else(|| anyhow!("content has no species#1 to lead with"))?;
    let partner = content
        .species(SpeciesId(3))
        .ok_or_else(|| anyhow!("content has no species#3 for the bench"))?;
    let opponent = content
        .species(SpeciesId(4))
        .ok_or_else(|| anyhow!("content has no species#4 to encounter"))?;

    let party = vec![
        Combatant::with_learnset_skills(starter, 12, StatBlock::uniform(15), &content),
        Combatant::with_learnset_skills(partner, 10, StatBlock::uniform(10), &content),
    ];
    let wild = Combatant::wild(opponent, 11, &content, &mut setup_rng);

    let collaborators = Collaborators::new(content).with_status(StandardStatusService::new());
    let mut manager = BattleManager::new(
        BattleSetup::wild(party, wild),
        collaborators,
        config,
        Box::new(SeededRandom::new(seed.wrapping_add(1))),
    )?;

    for _ in 0..TURN_LIMIT {
        match manager.phase() {
            BattlePhase::Ended => break,
            BattlePhase::AwaitingActions => {
                for side in Side::BOTH {
                    let action = choose_action(&manager, side);
                    manager.submit_action(side, action)?;
                }
            }
            BattlePhase::AwaitingSwitch(required) => {
                for side in Side::BOTH.into_iter().filter(|side| required[side.index()]) {
                    let action = choose_replacement(&manager, side)
                        .ok_or_else(|| anyhow!("{:?} has nobody left to send in", side))?;
                    manager.submit_action(side, action)?;
                }
            }
        }

        let result = manager
            .take_result()
            .ok_or_else(|| anyhow!("turn {} produced no result", manager.turn()))?;
        for line in result.iter_events().filter_map(|event| event.describe()) {
            println!("{}", line);
        }
        if result.outcome().ended {
            println!("{}", serde_json::to_string_pretty(result.outcome())?);
        }
    }

    if !manager.is_over() {
        println!("No winner after {} turns.", TURN_LIMIT);
    }
    Ok(())
}

/// First skill with PP left, or running away when there is none.
fn choose_action(manager: &BattleManager, side: Side) -> BattleAction {
    manager
        .side(side)
        .active()
        .skills
        .iter()
        .find(|slot| slot.pp() > 0)
        .map(|slot| BattleAction::Skill { skill: slot.skill })
        .unwrap_or(BattleAction::Escape)
}

fn choose_replacement(manager: &BattleManager, side: Side) -> Option<BattleAction> {
    let party = &manager.side(side).party;
    (0..party.members().len())
        .find(|index| party.can_switch_to(*index))
        .map(|index| BattleAction::Switch { index })
}
