//! Heat pump with cycling protection and a memoized performance model.

use crate::components::heat_pump_controller::HeatPumpController;
use crate::components::storage::HotWaterStorage;
use crate::components::weather::Weather;
use crate::graph::{
    CalculationCache, Component, DefaultConnection, GraphError, InputHandle, LoadType,
    OutputHandle, PortSet, SimulationError, StepValues, Unit,
};
use crate::sim::types::SimParameters;

/// Specific heat capacity of water, J/(kg·K).
const WATER_HEAT_CAPACITY: f32 = 4186.0;

/// Internal heat pump state, snapshotted at converged timestep boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeatPumpState {
    /// Accumulated heating runtime since the last start (s).
    pub time_on_s: u32,
    /// Accumulated cooling runtime since the last start (s).
    pub time_on_cooling_s: u32,
    /// Accumulated idle time since the last stop (s).
    pub time_off_s: u32,
    /// Signal applied in the previous timestep: 1 heating, -1 cooling, 0 off.
    pub on_off_previous: i8,
}

/// Rounded operating point used as the performance cache key.
///
/// Temperatures are rounded to 0.1 °C so that near-identical operating
/// points share one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CalculationRequest {
    t_source_decicelsius: i32,
    t_return_decicelsius: i32,
    mode: i8,
}

impl CalculationRequest {
    fn new(t_source_c: f32, t_return_c: f32, mode: i8) -> Self {
        Self {
            t_source_decicelsius: (t_source_c * 10.0).round() as i32,
            t_return_decicelsius: (t_return_c * 10.0).round() as i32,
            mode,
        }
    }
}

/// Air-to-water heat pump.
///
/// Follows an on/off/cooling signal from the controller, with optional
/// cycling protection: once started (or stopped), the unit keeps its state
/// until the configured minimum running (or idle) time has elapsed,
/// regardless of the requested signal. Performance points are computed by a
/// Carnot-fraction model and memoized per rounded operating point.
pub struct HeatPump {
    ports: PortSet,
    // Inputs
    on_off_signal: InputHandle,
    ambient_temperature: InputHandle,
    water_inlet_temperature: InputHandle,
    // Outputs
    thermal_output_power: OutputHandle,
    thermal_output_energy: OutputHandle,
    electrical_input_power: OutputHandle,
    electrical_input_energy: OutputHandle,
    cop: OutputHandle,
    outlet_temperature: OutputHandle,
    mass_flow: OutputHandle,
    time_on: OutputHandle,
    time_off: OutputHandle,
    // Parameters
    rated_thermal_power_w: f32,
    carnot_efficiency: f32,
    cycling_mode: bool,
    minimum_running_time_s: Option<u32>,
    minimum_idle_time_s: Option<u32>,
    seconds_per_timestep: u32,
    // State
    state: HeatPumpState,
    previous_state: HeatPumpState,
    calculation_cache: CalculationCache<CalculationRequest, performance::PerformancePoint>,
}

impl HeatPump {
    pub const NAME: &'static str = "HeatPump";

    // Inputs
    pub const ON_OFF_SIGNAL: &'static str = "OnOffSignal"; // 1 = heat, -1 = cool, 0 = off
    pub const AMBIENT_TEMPERATURE: &'static str = "AmbientTemperature"; // °C
    pub const WATER_INLET_TEMPERATURE: &'static str = "WaterInletTemperature"; // °C

    // Outputs
    pub const THERMAL_OUTPUT_POWER: &'static str = "ThermalOutputPower"; // W
    pub const THERMAL_OUTPUT_ENERGY: &'static str = "ThermalOutputEnergy"; // Wh
    pub const ELECTRICAL_INPUT_POWER: &'static str = "ElectricalInputPower"; // W
    pub const ELECTRICAL_INPUT_ENERGY: &'static str = "ElectricalInputEnergy"; // Wh
    pub const COP: &'static str = "COP"; // -
    pub const OUTLET_TEMPERATURE: &'static str = "OutletTemperature"; // °C
    pub const MASS_FLOW: &'static str = "MassFlow"; // kg/s
    pub const TIME_ON: &'static str = "TimeOn"; // s
    pub const TIME_OFF: &'static str = "TimeOff"; // s

    /// Creates a heat pump.
    ///
    /// # Arguments
    ///
    /// * `rated_thermal_power_w` - Thermal output at the rating point (W)
    /// * `carnot_efficiency` - Fraction of the Carnot COP achieved (0..1)
    /// * `cycling_mode` - Enforce minimum running/idle times
    /// * `minimum_running_time_s` - Required when `cycling_mode` is set
    /// * `minimum_idle_time_s` - Required when `cycling_mode` is set
    /// * `params` - Simulation timing
    ///
    /// # Panics
    ///
    /// Panics when `cycling_mode` is set without both minimum times, or on
    /// non-positive rating parameters.
    pub fn new(
        rated_thermal_power_w: f32,
        carnot_efficiency: f32,
        cycling_mode: bool,
        minimum_running_time_s: Option<u32>,
        minimum_idle_time_s: Option<u32>,
        params: &SimParameters,
    ) -> Result<Self, GraphError> {
        assert!(rated_thermal_power_w > 0.0);
        assert!(carnot_efficiency > 0.0 && carnot_efficiency <= 1.0);
        assert!(
            !cycling_mode || (minimum_running_time_s.is_some() && minimum_idle_time_s.is_some()),
            "cycling mode requires minimum running and idle times"
        );

        let mut ports = PortSet::new(Self::NAME);
        let on_off_signal =
            ports.declare_input(Self::ON_OFF_SIGNAL, LoadType::Any, Unit::Any, true)?;
        let ambient_temperature = ports.declare_input(
            Self::AMBIENT_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            true,
        )?;
        let water_inlet_temperature = ports.declare_input(
            Self::WATER_INLET_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            true,
        )?;

        let thermal_output_power = ports.declare_output(
            Self::THERMAL_OUTPUT_POWER,
            LoadType::Heating,
            Unit::Watt,
            "Thermal output power",
        )?;
        let thermal_output_energy = ports.declare_output(
            Self::THERMAL_OUTPUT_ENERGY,
            LoadType::Heating,
            Unit::WattHour,
            "Thermal output energy per timestep",
        )?;
        let electrical_input_power = ports.declare_output(
            Self::ELECTRICAL_INPUT_POWER,
            LoadType::Electricity,
            Unit::Watt,
            "Electrical input power",
        )?;
        let electrical_input_energy = ports.declare_output(
            Self::ELECTRICAL_INPUT_ENERGY,
            LoadType::Electricity,
            Unit::WattHour,
            "Electrical input energy per timestep",
        )?;
        let cop = ports.declare_output(
            Self::COP,
            LoadType::Any,
            Unit::Any,
            "Coefficient of performance",
        )?;
        let outlet_temperature = ports.declare_output(
            Self::OUTLET_TEMPERATURE,
            LoadType::Heating,
            Unit::Celsius,
            "Condenser outlet water temperature",
        )?;
        let mass_flow = ports.declare_output(
            Self::MASS_FLOW,
            LoadType::Water,
            Unit::KgPerSec,
            "Condenser water mass flow",
        )?;
        let time_on = ports.declare_output(
            Self::TIME_ON,
            LoadType::Time,
            Unit::Seconds,
            "Accumulated heating runtime",
        )?;
        let time_off = ports.declare_output(
            Self::TIME_OFF,
            LoadType::Time,
            Unit::Seconds,
            "Accumulated idle time",
        )?;

        Ok(Self {
            ports,
            on_off_signal,
            ambient_temperature,
            water_inlet_temperature,
            thermal_output_power,
            thermal_output_energy,
            electrical_input_power,
            electrical_input_energy,
            cop,
            outlet_temperature,
            mass_flow,
            time_on,
            time_off,
            rated_thermal_power_w,
            carnot_efficiency,
            cycling_mode,
            minimum_running_time_s,
            minimum_idle_time_s,
            seconds_per_timestep: params.seconds_per_timestep,
            state: HeatPumpState::default(),
            previous_state: HeatPumpState::default(),
            calculation_cache: CalculationCache::new(),
        })
    }

    /// Current internal state (for tests and summaries).
    pub fn state(&self) -> HeatPumpState {
        self.state
    }

    /// Performance cache statistics: `(hits, misses)`.
    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.calculation_cache.hits(),
            self.calculation_cache.misses(),
        )
    }

    /// Applies cycling protection: the previous state persists until its
    /// minimum time has elapsed, overriding the requested signal.
    fn apply_cycling_override(&self, requested: i8) -> i8 {
        if !self.cycling_mode {
            return requested;
        }
        // Checked at construction.
        let minimum_running = self.minimum_running_time_s.unwrap_or(0);
        let minimum_idle = self.minimum_idle_time_s.unwrap_or(0);

        if self.state.on_off_previous == 1 && self.state.time_on_s < minimum_running {
            1
        } else if self.state.on_off_previous == -1 && self.state.time_on_cooling_s < minimum_running
        {
            -1
        } else if self.state.on_off_previous == 0 && self.state.time_off_s < minimum_idle {
            0
        } else {
            requested
        }
    }

    /// Memoized performance lookup for the rounded operating point.
    fn cached_performance(
        &mut self,
        t_source_c: f32,
        t_return_c: f32,
        mode: i8,
    ) -> performance::PerformancePoint {
        let request = CalculationRequest::new(t_source_c, t_return_c, mode);
        let rated = self.rated_thermal_power_w;
        let efficiency = self.carnot_efficiency;
        self.calculation_cache.get_or_insert_with(request, || {
            // Recompute from the rounded key so cache hits and fresh
            // computations agree exactly.
            let t_source = request.t_source_decicelsius as f32 / 10.0;
            let t_return = request.t_return_decicelsius as f32 / 10.0;
            if mode == 1 {
                performance::heating(t_source, t_return, rated, efficiency)
            } else {
                performance::cooling(t_source, t_return, rated, efficiency)
            }
        })
    }
}

impl Component for HeatPump {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }

    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    fn default_connections(&self) -> Vec<DefaultConnection> {
        vec![
            DefaultConnection::new(
                Self::ON_OFF_SIGNAL,
                HeatPumpController::NAME,
                HeatPumpController::STATE,
            ),
            DefaultConnection::new(
                Self::AMBIENT_TEMPERATURE,
                Weather::NAME,
                Weather::AMBIENT_TEMPERATURE,
            ),
            DefaultConnection::new(
                Self::WATER_INLET_TEMPERATURE,
                HotWaterStorage::NAME,
                HotWaterStorage::WATER_TEMPERATURE,
            ),
        ]
    }

    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        let signal = values.get_input_value(self.ports.input(self.on_off_signal));
        let t_ambient = values.get_input_value(self.ports.input(self.ambient_temperature));
        let t_inlet = values.get_input_value(self.ports.input(self.water_inlet_temperature));

        let requested: i8 = if signal == 1.0 {
            1
        } else if signal == -1.0 {
            -1
        } else if signal == 0.0 {
            0
        } else {
            return Err(SimulationError::UnknownOnOffSignal {
                component: Self::NAME.to_string(),
                value: signal,
            });
        };

        let on_off = self.apply_cycling_override(requested);
        let dt = self.seconds_per_timestep;
        let dt_hours = dt as f32 / 3600.0;

        let mut time_on = self.state.time_on_s;
        let mut time_on_cooling = self.state.time_on_cooling_s;
        let mut time_off = self.state.time_off_s;

        let (p_th, p_el, cop, t_out, m_dot) = match on_off {
            1 => {
                let point = self.cached_performance(t_ambient, t_inlet, 1);
                time_on += dt;
                time_on_cooling = 0;
                time_off = 0;
                (
                    point.thermal_power_w,
                    point.electrical_power_w,
                    point.cop,
                    point.outlet_temperature_c,
                    point.mass_flow_kg_per_s,
                )
            }
            -1 => {
                let point = self.cached_performance(t_ambient, t_inlet, -1);
                time_on_cooling += dt;
                time_on = 0;
                time_off = 0;
                (
                    point.thermal_power_w,
                    point.electrical_power_w,
                    point.cop,
                    point.outlet_temperature_c,
                    point.mass_flow_kg_per_s,
                )
            }
            _ => {
                time_off += dt;
                time_on = 0;
                time_on_cooling = 0;
                // Outlet follows the inlet when idle.
                (0.0, 0.0, 0.0, t_inlet, 0.0)
            }
        };

        values.set_output_value(self.ports.output(self.thermal_output_power), p_th);
        values.set_output_value(
            self.ports.output(self.thermal_output_energy),
            p_th * dt_hours,
        );
        values.set_output_value(self.ports.output(self.electrical_input_power), p_el);
        values.set_output_value(
            self.ports.output(self.electrical_input_energy),
            p_el * dt_hours,
        );
        values.set_output_value(self.ports.output(self.cop), cop);
        values.set_output_value(self.ports.output(self.outlet_temperature), t_out);
        values.set_output_value(self.ports.output(self.mass_flow), m_dot);
        values.set_output_value(self.ports.output(self.time_on), time_on as f32);
        values.set_output_value(self.ports.output(self.time_off), time_off as f32);

        self.state.time_on_s = time_on;
        self.state.time_on_cooling_s = time_on_cooling;
        self.state.time_off_s = time_off;
        self.state.on_off_previous = on_off;
        Ok(())
    }

    fn i_save_state(&mut self) {
        self.previous_state = self.state;
    }

    fn i_restore_state(&mut self) {
        self.state = self.previous_state;
    }
}

/// Carnot-fraction performance model.
///
/// Pure functions of the operating temperatures; the component treats this
/// as an external physics model and caches its results.
mod performance {
    use super::WATER_HEAT_CAPACITY;

    /// Temperature rise across the condenser at rated flow (K).
    const CONDENSER_LIFT_K: f32 = 5.0;
    /// Lower bound on the effective temperature lift (K) to keep the COP
    /// finite near crossover.
    const MIN_LIFT_K: f32 = 10.0;

    /// One steady-state operating point.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct PerformancePoint {
        /// Thermal power delivered (W); negative in cooling mode.
        pub thermal_power_w: f32,
        /// Electrical power drawn (W, positive).
        pub electrical_power_w: f32,
        /// Coefficient of performance (heating) or EER (cooling).
        pub cop: f32,
        /// Condenser outlet water temperature (°C).
        pub outlet_temperature_c: f32,
        /// Condenser water mass flow (kg/s).
        pub mass_flow_kg_per_s: f32,
    }

    /// Heating operating point.
    pub fn heating(
        t_source_c: f32,
        t_return_c: f32,
        rated_thermal_power_w: f32,
        carnot_efficiency: f32,
    ) -> PerformancePoint {
        let t_sink_c = t_return_c + CONDENSER_LIFT_K;
        let lift = (t_sink_c - t_source_c).max(MIN_LIFT_K);
        let cop = (carnot_efficiency * (t_sink_c + 273.15) / lift).clamp(1.0, 7.0);

        // Available capacity shrinks with colder source air.
        let capacity_factor = (1.0 + 0.01 * (t_source_c - 2.0)).clamp(0.5, 1.2);
        let thermal_power_w = rated_thermal_power_w * capacity_factor;

        PerformancePoint {
            thermal_power_w,
            electrical_power_w: thermal_power_w / cop,
            cop,
            outlet_temperature_c: t_sink_c,
            mass_flow_kg_per_s: thermal_power_w / (WATER_HEAT_CAPACITY * CONDENSER_LIFT_K),
        }
    }

    /// Cooling operating point. Thermal power is negative (heat removed
    /// from the water loop); `cop` reports the EER.
    pub fn cooling(
        t_source_c: f32,
        t_return_c: f32,
        rated_thermal_power_w: f32,
        carnot_efficiency: f32,
    ) -> PerformancePoint {
        let t_sink_c = t_return_c - CONDENSER_LIFT_K;
        let lift = (t_source_c - t_sink_c).max(MIN_LIFT_K);
        let eer = (carnot_efficiency * (t_sink_c + 273.15) / lift).clamp(1.0, 6.0);

        let thermal_power_w = -0.7 * rated_thermal_power_w;

        PerformancePoint {
            thermal_power_w,
            electrical_power_w: -thermal_power_w / eer,
            cop: eer,
            outlet_temperature_c: t_sink_c,
            mass_flow_kg_per_s: -thermal_power_w / (WATER_HEAT_CAPACITY * CONDENSER_LIFT_K),
        }
    }

}
