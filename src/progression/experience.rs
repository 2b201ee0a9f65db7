use crate::combatant::{Combatant, SkillSlot, MAX_SKILL_SLOTS};
use crate::content::ContentLookup;
use crate::errors::{ProgressionError, ProgressionResult};
use schema::SkillId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Experience needed per current level to reach the next one.
const EXP_PER_LEVEL: u32 = 100;

/// What happened on one level gained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpRecord {
    pub level: u8,
    /// Skills placed straight into a free slot.
    pub learned: Vec<SkillId>,
    /// Skills waiting in the pending queue because every slot was taken.
    pub queued: Vec<SkillId>,
    pub evolution_ready: bool,
}

/// Experience needed for the next level, or 0 at the level cap.
pub fn exp_to_next_level(combatant: &Combatant, max_level: u8) -> u32 {
    if combatant.level >= max_level {
        0
    } else {
        combatant.level as u32 * EXP_PER_LEVEL
    }
}

/// Adds experience, levelling up as many times as it covers.
///
/// Every level gained fully restores HP, learns (or queues) the skills the
/// learnset lists for that level and refreshes evolution readiness. Experience
/// at the cap is discarded. Returns one record per level, in ascending order.
pub fn add_experience(
    combatant: &mut Combatant,
    amount: u32,
    max_level: u8,
    content: &dyn ContentLookup,
) -> Vec<LevelUpRecord> {
    let mut records = Vec::new();
    if combatant.level >= max_level {
        combatant.experience = 0;
        return records;
    }

    combatant.experience = combatant.experience.saturating_add(amount);

    loop {
        let threshold = exp_to_next_level(combatant, max_level);
        if threshold == 0 {
            combatant.experience = 0;
            break;
        }
        if combatant.experience < threshold {
            break;
        }

        combatant.experience -= threshold;
        combatant.level += 1;
        combatant.restore_full_hp();

        let record = learn_level_skills(combatant, content);
        info!(
            target: "battle::progression",
            species = %combatant.species,
            level = record.level,
            learned = record.learned.len(),
            queued = record.queued.len(),
            "level up"
        );
        records.push(record);
    }

    records
}

fn learn_level_skills(combatant: &mut Combatant, content: &dyn ContentLookup) -> LevelUpRecord {
    let level = combatant.level;
    let new_skills: Vec<SkillId> = combatant
        .learnset
        .iter()
        .filter(|entry| entry.level == level)
        .map(|entry| entry.skill)
        .collect();

    let mut learned = Vec::new();
    let mut queued = Vec::new();
    for skill_id in new_skills {
        if combatant.knows(skill_id) || combatant.pending_skills.contains(&skill_id) {
            continue;
        }
        if combatant.skills.len() < MAX_SKILL_SLOTS {
            match content.skill(skill_id) {
                Some(skill) => {
                    combatant.skills.push(SkillSlot::new(skill_id, skill.max_pp));
                    learned.push(skill_id);
                }
                None => warn!(
                    target: "battle::progression",
                    skill = %skill_id,
                    "learnset references an unknown skill"
                ),
            }
        } else {
            combatant.pending_skills.push(skill_id);
            queued.push(skill_id);
        }
    }

    combatant.evolution_ready = combatant
        .evolution
        .is_some_and(|rule| combatant.level >= rule.level);

    LevelUpRecord {
        level,
        learned,
        queued,
        evolution_ready: combatant.evolution_ready,
    }
}

/// Moves a pending skill into a slot, replacing `replace_slot` when given.
/// Returns the skill that was forgotten, if any.
pub fn learn_skill(
    combatant: &mut Combatant,
    skill: SkillId,
    max_pp: u8,
    replace_slot: Option<usize>,
) -> ProgressionResult<Option<SkillId>> {
    let pending_index = combatant
        .pending_skills
        .iter()
        .position(|pending| *pending == skill)
        .ok_or(ProgressionError::NotPending(skill))?;

    let forgotten = match replace_slot {
        Some(slot) => {
            let existing = combatant
                .skills
                .get_mut(slot)
                .ok_or(ProgressionError::SlotOutOfRange(slot))?;
            let old = existing.skill;
            *existing = SkillSlot::new(skill, max_pp);
            Some(old)
        }
        None => {
            if combatant.skills.len() >= MAX_SKILL_SLOTS {
                return Err(ProgressionError::SlotOutOfRange(combatant.skills.len()));
            }
            combatant.skills.push(SkillSlot::new(skill, max_pp));
            None
        }
    };

    combatant.pending_skills.remove(pending_index);
    Ok(forgotten)
}
