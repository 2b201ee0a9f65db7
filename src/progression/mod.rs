pub mod evolution;
pub mod experience;
pub mod rewards;

pub use evolution::{evolve, EvolutionRecord};
pub use experience::{add_experience, exp_to_next_level, learn_skill, LevelUpRecord};
pub use rewards::RewardCalculator;
