//! Timestep execution engine and run-level result types.

pub mod engine;
/// Post-hoc run summary.
pub mod summary;
pub mod types;

pub use engine::Engine;
pub use summary::RunSummary;
pub use types::{SimParameters, SimulationResults};
