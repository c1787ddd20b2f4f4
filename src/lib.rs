//! Household energy system simulator.
//!
//! A time-stepped component-graph simulation framework: heterogeneous
//! physical-model components declare typed ports, get wired into a directed
//! dataflow graph (statically by name or dynamically by tag-based
//! discovery), and are executed timestep by timestep with per-component
//! state save/restore so that coupled feedback loops can be iterated to
//! convergence.

/// Scenario TOML configuration and presets.
pub mod config;
/// Domain components: weather, occupancy, heat pump, storage, meter.
pub mod components;
/// The dynamic component-graph core.
pub mod graph;
/// Result export.
pub mod io;
/// Scenario assembly from configuration.
pub mod scenario;
/// Timestep execution engine and result types.
pub mod sim;
