pub mod action;
pub mod catch;
pub mod effects;
pub mod executor;
pub mod formulas;
pub mod runtime;
pub mod stages;
pub mod state;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
