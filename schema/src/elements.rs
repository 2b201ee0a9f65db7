use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Earth,
    Wind,
    Light,
    Shadow,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ElementType {
    /// Built-in effectiveness multiplier for an attacking element against a defending element.
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn default_effectiveness(attacking: ElementType, defending: ElementType) -> f64 {
        use ElementType::*;

        match (attacking, defending) {
            // Normal
            (Normal, Shadow) => 0.0,
            (Normal, _) => 1.0,

            // Fire
            (Fire, Fire) | (Fire, Water) | (Fire, Earth) => 0.5,
            (Fire, Grass) | (Fire, Ice) => 2.0,
            (Fire, _) => 1.0,

            // Water
            (Water, Water) | (Water, Grass) => 0.5,
            (Water, Fire) | (Water, Earth) => 2.0,
            (Water, _) => 1.0,

            // Grass
            (Grass, Fire) | (Grass, Grass) | (Grass, Wind) => 0.5,
            (Grass, Water) | (Grass, Earth) => 2.0,
            (Grass, _) => 1.0,

            // Electric
            (Electric, Electric) | (Electric, Grass) => 0.5,
            (Electric, Earth) => 0.0,
            (Electric, Water) | (Electric, Wind) => 2.0,
            (Electric, _) => 1.0,

            // Ice
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) => 0.5,
            (Ice, Grass) | (Ice, Wind) | (Ice, Earth) => 2.0,
            (Ice, _) => 1.0,

            // Earth
            (Earth, Grass) => 0.5,
            (Earth, Wind) => 0.0,
            (Earth, Fire) | (Earth, Electric) => 2.0,
            (Earth, _) => 1.0,

            // Wind
            (Wind, Electric) | (Wind, Earth) => 0.5,
            (Wind, Grass) => 2.0,
            (Wind, _) => 1.0,

            // Light / Shadow
            (Light, Light) => 0.5,
            (Light, Shadow) => 2.0,
            (Light, _) => 1.0,
            (Shadow, Shadow) => 0.5,
            (Shadow, Light) => 2.0,
            (Shadow, Normal) => 0.0,
            (Shadow, _) => 1.0,
        }
    }
}
