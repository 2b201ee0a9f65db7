use crate::combatant::Combatant;
use crate::errors::{ProgressionError, ProgressionResult};
use schema::{SpeciesData, SpeciesId};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvolutionRecord {
    pub from: SpeciesId,
    pub into: SpeciesId,
    pub old_hp: u16,
    pub new_hp: u16,
    pub new_max_hp: u16,
}

/// Evolves an eligible combatant into `into`.
///
/// Species-derived fields are replaced; level, experience, IVs, EVs and the
/// current skill list are kept. HP keeps its ratio to max HP, rounded up and
/// clamped to the new maximum.
pub fn evolve(combatant: &mut Combatant, into: &SpeciesData) -> ProgressionResult<EvolutionRecord> {
    let rule = combatant
        .evolution
        .filter(|rule| combatant.evolution_ready && combatant.level >= rule.level)
        .ok_or(ProgressionError::NotEligible(combatant.species))?;
    if rule.into != into.id {
        return Err(ProgressionError::WrongTarget {
            species: combatant.species,
            expected: rule.into,
            found: into.id,
        });
    }

    let from = combatant.species;
    let old_hp = combatant.current_hp();
    let old_max = combatant.max_hp();

    combatant.species = into.id;
    combatant.name = into.name.clone();
    combatant.element = into.element;
    combatant.base_stats = into.base_stats;
    combatant.learnset = into.learnset.clone();
    combatant.evolution = into.evolution;
    combatant.catch_rate = into.catch_rate;
    combatant.ev_yield = into.ev_yield;
    combatant.evolution_ready = combatant
        .evolution
        .is_some_and(|next| combatant.level >= next.level);

    let new_max = combatant.max_hp();
    let new_hp = rescale_hp(old_hp, old_max, new_max);
    combatant.set_hp(new_hp);

    info!(
        target: "battle::progression",
        %from,
        into = %into.id,
        old_hp,
        new_hp = combatant.current_hp(),
        "evolved"
    );

    Ok(EvolutionRecord {
        from,
        into: into.id,
        old_hp,
        new_hp: combatant.current_hp(),
        new_max_hp: new_max,
    })
}

/// `ceil(old_hp * new_max / old_max)`, clamped to `new_max`.
pub fn rescale_hp(old_hp: u16, old_max: u16, new_max: u16) -> u16 {
    if old_max == 0 {
        return new_max;
    }
    let scaled = (old_hp as u32 * new_max as u32).div_ceil(old_max as u32);
    scaled.min(new_max as u32) as u16
}
