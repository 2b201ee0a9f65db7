use crate::content::ContentLookup;
use crate::errors::BattleSetupError;
use crate::battle::state::Side;
use crate::rng::RandomSource;
use crate::stats;
use schema::{
    ElementType, EvolutionRule, LearnableSkill, SkillId, SpeciesData, SpeciesId, StatAxis,
    StatBlock,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::warn;

/// Maximum number of skills a combatant can know at once.
pub const MAX_SKILL_SLOTS: usize = 4;
/// Upper bound of a randomly rolled individual value.
pub const MAX_IV: u8 = 31;

/// A known skill together with its remaining uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSlot {
    pub skill: SkillId,
    pp: u8,
    max_pp: u8,
}

impl SkillSlot {
    pub fn new(skill: SkillId, max_pp: u8) -> Self {
        Self {
            skill,
            pp: max_pp,
            max_pp,
        }
    }

    pub fn pp(&self) -> u8 {
        self.pp
    }

    pub fn max_pp(&self) -> u8 {
        self.max_pp
    }

    /// Spends one use. Returns false when none remain.
    pub fn use_pp(&mut self) -> bool {
        if self.pp == 0 {
            return false;
        }
        self.pp -= 1;
        true
    }

    pub fn set_pp(&mut self, pp: u8) {
        self.pp = pp.min(self.max_pp);
    }

    pub fn restore_pp(&mut self, amount: u8) {
        self.pp = self.pp.saturating_add(amount).min(self.max_pp);
    }
}

/// A single creature, either on the player's roster or met in the wild.
///
/// Species-derived fields (element, base stats, learnset, evolution rule, catch
/// rate, EV yield) are copied in at creation and replaced on evolution, so a
/// combatant never needs a content lookup to answer questions about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub species: SpeciesId,
    pub name: String,
    pub element: ElementType,
    pub level: u8,
    pub experience: u32,
    pub base_stats: StatBlock<u16>,
    pub ivs: StatBlock<u8>,
    pub evs: StatBlock<u8>,
    current_hp: u16,
    pub skills: Vec<SkillSlot>,
    /// Skills that became learnable while every slot was full.
    pub pending_skills: Vec<SkillId>,
    pub learnset: Vec<LearnableSkill>,
    pub evolution: Option<EvolutionRule>,
    pub evolution_ready: bool,
    pub catch_rate: u8,
    pub ev_yield: StatBlock<u8>,
}

impl Combatant {
    /// Creates a combatant at full HP with no skills.
    pub fn new(species: &SpeciesData, level: u8, ivs: StatBlock<u8>) -> Self {
        let mut ivs = ivs;
        for axis in StatAxis::iter() {
            let value = ivs.get(axis).min(MAX_IV);
            ivs.set(axis, value);
        }

        let mut combatant = Self {
            species: species.id,
            name: species.name.clone(),
            element: species.element,
            level: level.max(1),
            experience: 0,
            base_stats: species.base_stats,
            ivs,
            evs: StatBlock::default(),
            current_hp: 0,
            skills: Vec::new(),
            pending_skills: Vec::new(),
            learnset: species.learnset.clone(),
            evolution: species.evolution,
            evolution_ready: false,
            catch_rate: species.catch_rate,
            ev_yield: species.ev_yield,
        };
        combatant.evolution_ready = combatant
            .evolution
            .is_some_and(|rule| combatant.level >= rule.level);
        combatant.restore_full_hp();
        combatant
    }

    /// Creates a combatant knowing the most recent skills of its learnset up to its level.
    pub fn with_learnset_skills(
        species: &SpeciesData,
        level: u8,
        ivs: StatBlock<u8>,
        content: &dyn ContentLookup,
    ) -> Self {
        let mut combatant = Self::new(species, level, ivs);
        for skill_id in species.default_skills(combatant.level, MAX_SKILL_SLOTS) {
            match content.skill(skill_id) {
                Some(skill) => combatant.skills.push(SkillSlot::new(skill_id, skill.max_pp)),
                None => warn!(
                    target: "battle::content",
                    skill = %skill_id,
                    species = %species.id,
                    "learnset references an unknown skill"
                ),
            }
        }
        combatant
    }

    /// Creates a wild combatant with freshly rolled individual values.
    pub fn wild(
        species: &SpeciesData,
        level: u8,
        content: &dyn ContentLookup,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let mut ivs = StatBlock::default();
        for axis in StatAxis::iter() {
            ivs.set(axis, rng.int_in(0, MAX_IV as u32, "individual_value") as u8);
        }
        Self::with_learnset_skills(species, level, ivs, content)
    }

    pub fn max_hp(&self) -> u16 {
        stats::max_hp(self)
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Sets HP, clamped to `[0, max_hp]`. Returns the stored value.
    pub fn set_hp(&mut self, hp: u16) -> u16 {
        self.current_hp = hp.min(self.max_hp());
        self.current_hp
    }

    /// Removes up to `amount` HP and returns how much was actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restores up to `amount` HP and returns how much was actually gained.
    /// Fainted combatants are not healed.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let before = self.current_hp;
        self.set_hp(before.saturating_add(amount));
        self.current_hp - before
    }

    pub fn restore_full_hp(&mut self) {
        self.current_hp = self.max_hp();
    }

    pub fn skill_slot(&self, skill: SkillId) -> Option<&SkillSlot> {
        self.skills.iter().find(|slot| slot.skill == skill)
    }

    pub fn skill_slot_mut(&mut self, skill: SkillId) -> Option<&mut SkillSlot> {
        self.skills.iter_mut().find(|slot| slot.skill == skill)
    }

    pub fn knows(&self, skill: SkillId) -> bool {
        self.skill_slot(skill).is_some()
    }

    /// The roster form of a captured combatant: level, experience, HP, skills
    /// with their PP and IVs carry over; EVs start fresh.
    pub fn to_roster_entry(&self) -> Combatant {
        let mut entry = self.clone();
        entry.evs = StatBlock::default();
        // Max HP can shrink when EVs are dropped.
        entry.current_hp = self.current_hp.min(entry.max_hp());
        entry
    }
}

/// One side's combatants plus which of them is on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    members: Vec<Combatant>,
    active: usize,
}

impl Party {
    /// Builds a party with the first conscious member active.
    pub fn new(side: Side, members: Vec<Combatant>) -> Result<Self, BattleSetupError> {
        if members.is_empty() {
            return Err(BattleSetupError::EmptyParty(side));
        }
        let active = members
            .iter()
            .position(|member| !member.is_fainted())
            .ok_or(BattleSetupError::NoHealthyCombatant(side))?;
        Ok(Self { members, active })
    }

    pub fn active(&self) -> &Combatant {
        &self.members[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.members[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Combatant> {
        self.members
    }

    /// Whether any member other than the active one can still battle.
    pub fn has_reserves(&self) -> bool {
        self.members
            .iter()
            .enumerate()
            .any(|(index, member)| index != self.active && !member.is_fainted())
    }

    pub fn can_switch_to(&self, index: usize) -> bool {
        index != self.active
            && self
                .members
                .get(index)
                .is_some_and(|member| !member.is_fainted())
    }

    /// Makes `index` the active member. Returns false and changes nothing if it can't battle.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if !self.can_switch_to(index) {
            return false;
        }
        self.active = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{test_species, TestCombatantBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hp_is_clamped_on_both_ends() {
        let mut combatant = TestCombatantBuilder::new(1, 20).build();
        let max = combatant.max_hp();

        assert_eq!(combatant.set_hp(max + 50), max);
        assert_eq!(combatant.take_damage(max + 10), max);
        assert_eq!(combatant.current_hp(), 0);
        assert!(combatant.is_fainted());
        assert_eq!(combatant.heal(30), 0, "fainted combatants are not healed");
    }

    #[test]
    fn test_heal_reports_actual_amount() {
        let mut combatant = TestCombatantBuilder::new(1, 20).build();
        let max = combatant.max_hp();
        combatant.set_hp(max - 5);
        assert_eq!(combatant.heal(40), 5);
        assert_eq!(combatant.current_hp(), max);
    }

    #[test]
    fn test_skill_slot_pp_never_underflows() {
        let mut slot = SkillSlot::new(SkillId(1), 1);
        assert!(slot.use_pp());
        assert!(!slot.use_pp());
        assert_eq!(slot.pp(), 0);
        slot.restore_pp(10);
        assert_eq!(slot.pp(), 1);
    }

    #[test]
    fn test_ivs_are_capped_on_creation() {
        let combatant = Combatant::new(&test_species(1), 10, StatBlock::uniform(99));
        assert_eq!(combatant.ivs, StatBlock::uniform(MAX_IV));
    }

    #[test]
    fn test_party_skips_fainted_leader() {
        let fainted = TestCombatantBuilder::new(1, 10).with_hp(0).build();
        let healthy = TestCombatantBuilder::new(2, 10).build();
        let party = Party::new(Side::Player, vec![fainted, healthy]).unwrap();
        assert_eq!(party.active_index(), 1);
        assert!(!party.has_reserves());
        assert!(!party.can_switch_to(0));
    }

    #[test]
    fn test_party_rejects_empty_or_fainted_roster() {
        assert_eq!(
            Party::new(Side::Enemy, vec![]),
            Err(BattleSetupError::EmptyParty(Side::Enemy))
        );
        let fainted = TestCombatantBuilder::new(1, 10).with_hp(0).build();
        assert_eq!(
            Party::new(Side::Player, vec![fainted]),
            Err(BattleSetupError::NoHealthyCombatant(Side::Player))
        );
    }
}
