//! Evo Arena - evolutionary tournament simulation
//!
//! Populations of combatants fight elimination tournaments day by day. The
//! best winner of each generation biases the attribute sampling of the next,
//! with the allowed deviation shrinking as the run cools down.

pub mod combatant;
pub mod core;
pub mod day;
pub mod decision;
pub mod fight;
pub mod generation;
pub mod report;
pub mod sampler;
pub mod stats;
