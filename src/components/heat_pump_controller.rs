//! Hysteresis heat pump controller.

use crate::components::storage::HotWaterStorage;
use crate::components::weather::Weather;
use crate::graph::{
    Component, DefaultConnection, GraphError, InputHandle, LoadType, OutputHandle, PortSet,
    SimulationError, StepValues, Unit,
};

/// Controller operating policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// Heating/off only.
    OnOff,
    /// Heating, cooling, and off. Cooling requires floor heating
    /// distribution; enforced by configuration validation.
    HeatCool,
}

/// Internal controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatingState {
    Heating,
    Cooling,
    Off,
}

/// Heat pump on/off controller.
///
/// Watches the storage water temperature and switches the heat pump with a
/// hysteresis band around the set flow temperature. Daily average outdoor
/// temperature gates heating (and cooling) seasonally: above the heating
/// threshold the heat pump stays off no matter how cold the storage gets.
///
/// During a forced convergence pass the controller does nothing; its
/// previous `State` output stands, so the rest of the coupled subset can
/// settle.
pub struct HeatPumpController {
    ports: PortSet,
    // Inputs
    water_temperature: InputHandle,
    daily_average_temperature: InputHandle,
    // Outputs
    state: OutputHandle,
    // Parameters
    mode: ControllerMode,
    set_flow_temperature_c: f32,
    offset_c: f32,
    heating_threshold_c: Option<f32>,
    cooling_threshold_c: Option<f32>,
    // State
    operating_state: OperatingState,
    previous_operating_state: OperatingState,
}

impl HeatPumpController {
    pub const NAME: &'static str = "HeatPumpController";

    // Inputs
    pub const WATER_TEMPERATURE: &'static str = "WaterTemperature"; // °C
    pub const DAILY_AVERAGE_TEMPERATURE: &'static str = "DailyAverageTemperature"; // °C

    // Outputs
    pub const STATE: &'static str = "State"; // 1 = heat, -1 = cool, 0 = off

    /// Creates a controller.
    ///
    /// # Arguments
    ///
    /// * `mode` - Operating policy
    /// * `set_flow_temperature_c` - Target storage water temperature (°C)
    /// * `offset_c` - Hysteresis half-band (°C, must be > 0)
    /// * `heating_threshold_c` - Daily average above which heating is
    ///   blocked; `None` disables the seasonal gate
    /// * `cooling_threshold_c` - Daily average below which cooling is
    ///   blocked; `None` disables the gate
    pub fn new(
        mode: ControllerMode,
        set_flow_temperature_c: f32,
        offset_c: f32,
        heating_threshold_c: Option<f32>,
        cooling_threshold_c: Option<f32>,
    ) -> Result<Self, GraphError> {
        assert!(offset_c > 0.0, "hysteresis offset must be > 0");

        let mut ports = PortSet::new(Self::NAME);
        let water_temperature = ports.declare_input(
            Self::WATER_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            true,
        )?;
        let daily_average_temperature = ports.declare_input(
            Self::DAILY_AVERAGE_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            true,
        )?;
        let state = ports.declare_output(
            Self::STATE,
            LoadType::Any,
            Unit::Any,
            "Heat pump signal: 1 heating, -1 cooling, 0 off",
        )?;

        Ok(Self {
            ports,
            water_temperature,
            daily_average_temperature,
            state,
            mode,
            set_flow_temperature_c,
            offset_c,
            heating_threshold_c,
            cooling_threshold_c,
            operating_state: OperatingState::Off,
            previous_operating_state: OperatingState::Off,
        })
    }

    /// Seasonal heating gate: heating is allowed when no threshold is set
    /// or the daily average is below it.
    fn heating_season(&self, daily_average_c: f32) -> bool {
        match self.heating_threshold_c {
            None => true,
            Some(threshold) => daily_average_c < threshold,
        }
    }

    /// Seasonal cooling gate: cooling is allowed when no threshold is set
    /// or the daily average is above it.
    fn cooling_season(&self, daily_average_c: f32) -> bool {
        match self.cooling_threshold_c {
            None => true,
            Some(threshold) => daily_average_c > threshold,
        }
    }

    /// Heating/off transitions with hysteresis.
    fn transition_on_off(&mut self, water_c: f32, heating_allowed: bool) {
        match self.operating_state {
            OperatingState::Heating => {
                if water_c > self.set_flow_temperature_c + self.offset_c || !heating_allowed {
                    self.operating_state = OperatingState::Off;
                }
            }
            OperatingState::Off => {
                if water_c < self.set_flow_temperature_c - self.offset_c && heating_allowed {
                    self.operating_state = OperatingState::Heating;
                }
            }
            // A controller restricted to on/off never enters Cooling;
            // recover to Off if it somehow did.
            OperatingState::Cooling => {
                self.operating_state = OperatingState::Off;
            }
        }
    }

    /// Heating/cooling/off transitions with hysteresis.
    fn transition_heat_cool(&mut self, water_c: f32, heating_allowed: bool, cooling_allowed: bool) {
        let set = self.set_flow_temperature_c;
        match self.operating_state {
            OperatingState::Heating => {
                if water_c >= set || !heating_allowed {
                    self.operating_state = OperatingState::Off;
                }
            }
            OperatingState::Cooling => {
                if water_c <= set || !cooling_allowed {
                    self.operating_state = OperatingState::Off;
                }
            }
            OperatingState::Off => {
                if water_c < set - self.offset_c && heating_allowed {
                    self.operating_state = OperatingState::Heating;
                } else if water_c > set + self.offset_c && cooling_allowed {
                    self.operating_state = OperatingState::Cooling;
                }
            }
        }
    }
}

impl Component for HeatPumpController {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }

    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    fn default_connections(&self) -> Vec<DefaultConnection> {
        vec![
            DefaultConnection::new(
                Self::WATER_TEMPERATURE,
                HotWaterStorage::NAME,
                HotWaterStorage::WATER_TEMPERATURE,
            ),
            DefaultConnection::new(
                Self::DAILY_AVERAGE_TEMPERATURE,
                Weather::NAME,
                Weather::DAILY_AVERAGE_TEMPERATURE,
            ),
        ]
    }

    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        force_convergence: bool,
    ) -> Result<(), SimulationError> {
        if force_convergence {
            // Final mandatory pass: the previous State output stands.
            return Ok(());
        }

        let water_c = values.get_input_value(self.ports.input(self.water_temperature));
        let daily_average_c =
            values.get_input_value(self.ports.input(self.daily_average_temperature));

        let heating_allowed = self.heating_season(daily_average_c);
        match self.mode {
            ControllerMode::OnOff => self.transition_on_off(water_c, heating_allowed),
            ControllerMode::HeatCool => {
                let cooling_allowed = self.cooling_season(daily_average_c);
                self.transition_heat_cool(water_c, heating_allowed, cooling_allowed);
            }
        }

        let signal = match self.operating_state {
            OperatingState::Heating => 1.0,
            OperatingState::Cooling => -1.0,
            OperatingState::Off => 0.0,
        };
        values.set_output_value(self.ports.output(self.state), signal);
        Ok(())
    }

    fn i_save_state(&mut self) {
        self.previous_operating_state = self.operating_state;
    }

    fn i_restore_state(&mut self) {
        self.operating_state = self.previous_operating_state;
    }
}
