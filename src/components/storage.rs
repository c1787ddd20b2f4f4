//! Single-node hot water buffer storage.

use crate::components::heat_pump::HeatPump;
use crate::components::occupancy::Occupancy;
use crate::graph::{
    Component, DefaultConnection, GraphError, InputHandle, LoadType, OutputHandle, PortSet,
    SimulationError, StepValues, Unit,
};
use crate::sim::types::SimParameters;

/// Specific heat capacity of water, J/(kg·K).
const WATER_HEAT_CAPACITY: f32 = 4186.0;

/// Hot water buffer storage, modeled as one fully mixed node.
///
/// Receives heat from the heat pump, loses heat to the hot water draw and
/// to standing losses against the room. This component closes the
/// controller → heat pump → storage → controller feedback loop that the
/// engine's convergence iteration resolves.
pub struct HotWaterStorage {
    ports: PortSet,
    // Inputs
    thermal_power_in: InputHandle,
    thermal_power_demand: InputHandle,
    // Outputs
    water_temperature: OutputHandle,
    stored_energy: OutputHandle,
    // Parameters
    water_mass_kg: f32,
    ambient_temperature_c: f32,
    loss_w_per_k: f32,
    seconds_per_timestep: u32,
    // State
    temperature_c: f32,
    previous_temperature_c: f32,
}

impl HotWaterStorage {
    pub const NAME: &'static str = "HotWaterStorage";

    // Inputs
    pub const THERMAL_POWER_IN: &'static str = "ThermalPowerIn"; // W
    pub const THERMAL_POWER_DEMAND: &'static str = "ThermalPowerDemand"; // W

    // Outputs
    pub const WATER_TEMPERATURE: &'static str = "WaterTemperature"; // °C
    pub const STORED_ENERGY: &'static str = "StoredEnergy"; // Wh above ambient

    /// Creates a storage tank.
    ///
    /// # Arguments
    ///
    /// * `volume_l` - Tank volume in liters (1 l of water = 1 kg)
    /// * `initial_temperature_c` - Water temperature at simulation start
    /// * `ambient_temperature_c` - Room temperature for standing losses
    /// * `loss_w_per_k` - Standing loss coefficient (W/K)
    /// * `params` - Simulation timing
    ///
    /// # Panics
    ///
    /// Panics on non-positive volume or negative loss coefficient.
    pub fn new(
        volume_l: f32,
        initial_temperature_c: f32,
        ambient_temperature_c: f32,
        loss_w_per_k: f32,
        params: &SimParameters,
    ) -> Result<Self, GraphError> {
        assert!(volume_l > 0.0, "volume must be > 0");
        assert!(loss_w_per_k >= 0.0, "loss coefficient must be >= 0");

        let mut ports = PortSet::new(Self::NAME);
        let thermal_power_in =
            ports.declare_input(Self::THERMAL_POWER_IN, LoadType::Heating, Unit::Watt, true)?;
        let thermal_power_demand = ports.declare_input(
            Self::THERMAL_POWER_DEMAND,
            LoadType::Heating,
            Unit::Watt,
            true,
        )?;
        let water_temperature = ports.declare_output(
            Self::WATER_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            "Mixed tank water temperature",
        )?;
        let stored_energy = ports.declare_output(
            Self::STORED_ENERGY,
            LoadType::Heating,
            Unit::WattHour,
            "Stored heat relative to room temperature",
        )?;

        Ok(Self {
            ports,
            thermal_power_in,
            thermal_power_demand,
            water_temperature,
            stored_energy,
            water_mass_kg: volume_l,
            ambient_temperature_c,
            loss_w_per_k,
            seconds_per_timestep: params.seconds_per_timestep,
            temperature_c: initial_temperature_c,
            previous_temperature_c: initial_temperature_c,
        })
    }

    /// Current water temperature (for tests).
    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }
}

impl Component for HotWaterStorage {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }

    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    fn default_connections(&self) -> Vec<DefaultConnection> {
        vec![
            DefaultConnection::new(
                Self::THERMAL_POWER_IN,
                HeatPump::NAME,
                HeatPump::THERMAL_OUTPUT_POWER,
            ),
            DefaultConnection::new(
                Self::THERMAL_POWER_DEMAND,
                Occupancy::NAME,
                Occupancy::HOT_WATER_DEMAND,
            ),
        ]
    }

    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        let power_in = values.get_input_value(self.ports.input(self.thermal_power_in));
        let power_demand = values.get_input_value(self.ports.input(self.thermal_power_demand));

        let loss = self.loss_w_per_k * (self.temperature_c - self.ambient_temperature_c);
        let net_power = power_in - power_demand - loss;
        let heat_capacity = self.water_mass_kg * WATER_HEAT_CAPACITY; // J/K
        let delta_t = net_power * self.seconds_per_timestep as f32 / heat_capacity;

        // The tank cannot leave the physically plausible liquid band.
        self.temperature_c = (self.temperature_c + delta_t).clamp(0.0, 100.0);

        values.set_output_value(
            self.ports.output(self.water_temperature),
            self.temperature_c,
        );
        let stored_wh = heat_capacity * (self.temperature_c - self.ambient_temperature_c) / 3600.0;
        values.set_output_value(self.ports.output(self.stored_energy), stored_wh);
        Ok(())
    }

    fn i_save_state(&mut self) {
        self.previous_temperature_c = self.temperature_c;
    }

    fn i_restore_state(&mut self) {
        self.temperature_c = self.previous_temperature_c;
    }

    fn i_doublecheck(&self, _timestep: usize, _values: &StepValues) {
        debug_assert!(
            (0.0..=100.0).contains(&self.temperature_c),
            "storage temperature left the liquid band: {} °C",
            self.temperature_c
        );
    }
}
