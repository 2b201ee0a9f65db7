use crate::StageAxis;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumDiscriminants, EnumIter};

/// Major status conditions. Their behaviour lives in the status service, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum StatusKind {
    Sleep,
    Paralysis,
    Freeze,
    Burn,
    Poison,
    Fear,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Sleep => "sleep",
            StatusKind::Paralysis => "paralysis",
            StatusKind::Freeze => "freeze",
            StatusKind::Burn => "burn",
            StatusKind::Poison => "poison",
            StatusKind::Fear => "fear",
        };
        write!(f, "{}", name)
    }
}

/// Battle-wide modifiers with a duration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum FieldKind {
    /// Halves fire damage.
    WaterSport,
    /// Halves electric damage.
    MudSport,
    /// Blocks stage drops inflicted by the opposing side.
    Mist,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::WaterSport => "water sport",
            FieldKind::MudSport => "mud sport",
            FieldKind::Mist => "mist",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EffectTarget {
    User,
    #[default]
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChange {
    pub axis: StageAxis,
    pub delta: i8,
}

/// Declarative effect payload attached to a skill definition.
///
/// Variants are grouped by the hook that consumes them: the first group rewrites
/// the damage plan before damage, the second runs once the skill has landed,
/// the last runs after damage has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(EffectKind))]
#[strum_discriminants(derive(Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display))]
pub enum SkillEffect {
    // --- beforeDamage ---
    FixedDamage {
        amount: u16,
    },
    LevelDamage,
    MultiHit {
        min: u8,
        max: u8,
    },
    EnduringStrike,
    NeutralStrike,

    // --- onHit ---
    InflictStatus {
        status: StatusKind,
        chance: u8,
        turns: u8,
        target: EffectTarget,
    },
    StatChange {
        target: EffectTarget,
        changes: Vec<StageChange>,
        chance: u8,
    },
    Heal {
        percent: u8,
    },
    Protect {
        turns: u8,
    },
    VoidShield {
        turns: u8,
        first_strike_only: bool,
    },
    Seal {
        turns: u8,
    },
    DamageOverTime {
        amount: u16,
        turns: u8,
    },
    Parasitism {
        percent: u8,
        turns: u8,
    },
    Regen {
        percent: u8,
        turns: u8,
    },
    GuaranteedCrit {
        turns: u8,
    },
    FirstStrike {
        bonus: i8,
        turns: u8,
    },
    DamageBoost {
        percent: u16,
        turns: u8,
    },
    ImmuneDamage {
        turns: u8,
    },
    NoHeal {
        turns: u8,
    },
    Field {
        field: FieldKind,
        turns: u8,
    },
    CompositeBuff {
        label: String,
        turns: u8,
        regen_percent: u8,
        damage_percent: u16,
    },
    ClearAllStages,
    EqualizeHp,
    BuffTransfer,

    // --- afterDamage ---
    Drain {
        percent: u8,
    },
    Recoil {
        percent: u8,
    },
    BonusDamage {
        amount: u16,
    },
    EscalatingDamage {
        base: u16,
        step: u16,
    },
    RecoilTransfer {
        percent: u8,
    },
    PurgeDrain {
        percent: u8,
        no_heal_turns: u8,
    },
}

impl SkillEffect {
    pub fn kind(&self) -> EffectKind {
        EffectKind::from(self)
    }
}
