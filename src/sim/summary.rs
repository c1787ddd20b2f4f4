//! Post-hoc run summary computed from simulation results.

use std::fmt;

use super::types::SimulationResults;
use crate::components::electricity_meter::ElectricityMeter;
use crate::components::heat_pump::HeatPump;
use crate::components::storage::HotWaterStorage;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from [`SimulationResults`] so that reported numbers
/// always match the recorded step data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Total household electricity consumption (kWh).
    pub electricity_kwh: f32,
    /// Total heat delivered by the heat pump (kWh thermal).
    pub heat_delivered_kwh: f32,
    /// Heat pump electricity consumption (kWh).
    pub heat_pump_electricity_kwh: f32,
    /// Seasonal COP: heat delivered / heat pump electricity.
    pub seasonal_cop: f32,
    /// Minimum storage water temperature (°C).
    pub storage_min_temperature_c: f32,
    /// Maximum storage water temperature (°C).
    pub storage_max_temperature_c: f32,
    /// Fraction of timesteps with the heat pump running.
    pub heat_pump_duty_cycle: f32,
    /// Mean convergence passes per timestep.
    pub mean_passes: f32,
    /// Timesteps that needed the forced final pass.
    pub forced_timesteps: usize,
}

impl RunSummary {
    /// Computes the summary from recorded results.
    ///
    /// Missing columns (e.g. a scenario without a meter) contribute zeros.
    pub fn from_results(results: &SimulationResults) -> Self {
        let dt = results.dt_hours;

        let sum_kwh = |component: &str, field: &str| -> f32 {
            results
                .series(component, field)
                .map(|s| s.iter().sum::<f32>() * dt / 1000.0)
                .unwrap_or(0.0)
        };

        let electricity_kwh = sum_kwh(ElectricityMeter::NAME, ElectricityMeter::TOTAL_CONSUMPTION);
        let heat_delivered_kwh = sum_kwh(HeatPump::NAME, HeatPump::THERMAL_OUTPUT_POWER);
        let heat_pump_electricity_kwh = sum_kwh(HeatPump::NAME, HeatPump::ELECTRICAL_INPUT_POWER);

        let seasonal_cop = if heat_pump_electricity_kwh > 0.0 {
            heat_delivered_kwh / heat_pump_electricity_kwh
        } else {
            0.0
        };

        let (storage_min, storage_max) = results
            .series(HotWaterStorage::NAME, HotWaterStorage::WATER_TEMPERATURE)
            .map(|s| {
                s.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, &t| {
                    (acc.0.min(t), acc.1.max(t))
                })
            })
            .unwrap_or((0.0, 0.0));

        let duty_cycle = results
            .series(HeatPump::NAME, HeatPump::THERMAL_OUTPUT_POWER)
            .map(|s| {
                if s.is_empty() {
                    0.0
                } else {
                    s.iter().filter(|&&p| p.abs() > 0.0).count() as f32 / s.len() as f32
                }
            })
            .unwrap_or(0.0);

        Self {
            electricity_kwh,
            heat_delivered_kwh,
            heat_pump_electricity_kwh,
            seasonal_cop,
            storage_min_temperature_c: storage_min,
            storage_max_temperature_c: storage_max,
            heat_pump_duty_cycle: duty_cycle,
            mean_passes: results.mean_passes(),
            forced_timesteps: results.forced_timesteps,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Electricity consumed:  {:.2} kWh", self.electricity_kwh)?;
        writeln!(
            f,
            "Heat delivered:        {:.2} kWh ({:.2} kWh electric, SCOP {:.2})",
            self.heat_delivered_kwh, self.heat_pump_electricity_kwh, self.seasonal_cop
        )?;
        writeln!(
            f,
            "Storage temperature:   {:.1}–{:.1} °C",
            self.storage_min_temperature_c, self.storage_max_temperature_c
        )?;
        writeln!(
            f,
            "Heat pump duty cycle:  {:.1}%",
            self.heat_pump_duty_cycle * 100.0
        )?;
        write!(
            f,
            "Convergence:           {:.2} passes/step, {} forced timesteps",
            self.mean_passes, self.forced_timesteps
        )
    }
}
