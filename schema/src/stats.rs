use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// The six permanent stat axes of a combatant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum StatAxis {
    Hp,
    Attack,
    SpecialAttack,
    Defense,
    SpecialDefense,
    Speed,
}

impl fmt::Display for StatAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatAxis::Hp => "HP",
            StatAxis::Attack => "Attack",
            StatAxis::SpecialAttack => "Special Attack",
            StatAxis::Defense => "Defense",
            StatAxis::SpecialDefense => "Special Defense",
            StatAxis::Speed => "Speed",
        };
        write!(f, "{}", name)
    }
}

/// Axes that carry an in-battle stage. HP has no stage; accuracy only exists as a stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum StageAxis {
    Attack,
    SpecialAttack,
    Defense,
    SpecialDefense,
    Speed,
    Accuracy,
}

impl StageAxis {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }

    /// The permanent stat this stage scales, if any.
    pub fn stat(self) -> Option<StatAxis> {
        match self {
            StageAxis::Attack => Some(StatAxis::Attack),
            StageAxis::SpecialAttack => Some(StatAxis::SpecialAttack),
            StageAxis::Defense => Some(StatAxis::Defense),
            StageAxis::SpecialDefense => Some(StatAxis::SpecialDefense),
            StageAxis::Speed => Some(StatAxis::Speed),
            StageAxis::Accuracy => None,
        }
    }
}

impl fmt::Display for StageAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stat() {
            Some(stat) => write!(f, "{}", stat),
            None => write!(f, "accuracy"),
        }
    }
}

/// One value per permanent stat axis. Used for base stats, IVs, EVs and EV yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock<T> {
    pub hp: T,
    pub attack: T,
    pub special_attack: T,
    pub defense: T,
    pub special_defense: T,
    pub speed: T,
}

impl<T: Copy> StatBlock<T> {
    pub fn uniform(value: T) -> Self {
        Self {
            hp: value,
            attack: value,
            special_attack: value,
            defense: value,
            special_defense: value,
            speed: value,
        }
    }

    pub fn get(&self, axis: StatAxis) -> T {
        match axis {
            StatAxis::Hp => self.hp,
            StatAxis::Attack => self.attack,
            StatAxis::SpecialAttack => self.special_attack,
            StatAxis::Defense => self.defense,
            StatAxis::SpecialDefense => self.special_defense,
            StatAxis::Speed => self.speed,
        }
    }

    pub fn get_mut(&mut self, axis: StatAxis) -> &mut T {
        match axis {
            StatAxis::Hp => &mut self.hp,
            StatAxis::Attack => &mut self.attack,
            StatAxis::SpecialAttack => &mut self.special_attack,
            StatAxis::Defense => &mut self.defense,
            StatAxis::SpecialDefense => &mut self.special_defense,
            StatAxis::Speed => &mut self.speed,
        }
    }

    pub fn set(&mut self, axis: StatAxis, value: T) {
        *self.get_mut(axis) = value;
    }
}

impl StatBlock<u8> {
    pub fn total(&self) -> u16 {
        self.hp as u16
            + self.attack as u16
            + self.special_attack as u16
            + self.defense as u16
            + self.special_defense as u16
            + self.speed as u16
    }
}
