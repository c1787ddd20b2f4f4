//! Scenario assembly: builds the component graph from configuration.

use crate::components::{
    ControllerMode, ElectricityMeter, HeatPump, HeatPumpController, HotWaterStorage, Occupancy,
    Weather,
};
use crate::config::ScenarioConfig;
use crate::graph::{Component, GraphError, SimulationGraph};
use crate::sim::engine::Engine;
use crate::sim::types::SimParameters;

/// Builds the full household energy system from a validated configuration
/// and returns a ready-to-run engine.
///
/// Static wiring runs entirely through the components' default
/// connections; the electricity meter discovers its sources dynamically by
/// output-name scan before the graph is frozen.
///
/// # Errors
///
/// Returns a [`GraphError`] when wiring or freezing fails. Call
/// [`ScenarioConfig::validate`] first; this function assumes field-level
/// constraints already hold.
pub fn build_engine(cfg: &ScenarioConfig) -> Result<Engine, GraphError> {
    let s = &cfg.simulation;
    let mut params = SimParameters::new(s.days, s.seconds_per_timestep, s.seed);
    params.max_iterations = s.max_iterations;
    params.tolerance = s.tolerance;

    let w = &cfg.weather;
    let weather = Weather::new(
        w.annual_mean_c,
        w.annual_amplitude_c,
        w.daily_amplitude_c,
        w.noise_std_c,
        &params,
    )?;

    let o = &cfg.occupancy;
    let occupancy = Occupancy::new(
        o.base_load_w,
        o.peak_load_w,
        o.hot_water_peak_w,
        o.noise_std_w,
        &params,
    )?;

    let c = &cfg.controller;
    let mode = if c.mode == 2 {
        ControllerMode::HeatCool
    } else {
        ControllerMode::OnOff
    };
    let controller = HeatPumpController::new(
        mode,
        c.set_flow_temperature_c,
        c.offset_c,
        c.heating_threshold_c,
        c.cooling_threshold_c,
    )?;

    let hp = &cfg.heat_pump;
    let heat_pump = HeatPump::new(
        hp.rated_thermal_power_w,
        hp.carnot_efficiency,
        hp.cycling_mode,
        hp.minimum_running_time_s,
        hp.minimum_idle_time_s,
        &params,
    )?;

    let st = &cfg.storage;
    let storage = HotWaterStorage::new(
        st.volume_l,
        st.initial_temperature_c,
        st.ambient_temperature_c,
        st.loss_w_per_k,
        &params,
    )?;

    // Dynamic discovery happens against the built components' port sets,
    // before anything moves into the graph.
    let mut meter = ElectricityMeter::new()?;
    meter.connect_sources(&[occupancy.port_set(), heat_pump.port_set()])?;

    let mut graph = SimulationGraph::new();
    graph.add_component(Box::new(weather))?;
    graph.add_component(Box::new(occupancy))?;
    graph.add_component(Box::new(controller))?;
    graph.add_component(Box::new(heat_pump))?;
    graph.add_component(Box::new(storage))?;
    graph.add_component(Box::new(meter))?;

    let frozen = graph.freeze()?;
    Ok(Engine::new(frozen, params))
}
