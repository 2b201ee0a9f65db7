// Elf Battle Schema - shared content definitions
// This crate holds the shapes of the static content tables (skills, species,
// items, the type chart) that the battle engine consumes through its lookup
// service. Nothing in here knows how a battle is resolved.

// Re-export the main types
pub use effects::*;
pub use elements::*;
pub use skills::*;
pub use species_data::*;
pub use stats::*;

pub mod effects;
pub mod elements;
pub mod skills;
pub mod species_data;
pub mod stats;
