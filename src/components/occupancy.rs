//! Synthetic household load profile.

use rand::{SeedableRng, rngs::StdRng};

use crate::components::gaussian_noise;
use crate::graph::{
    Component, GraphError, LoadType, OutputHandle, PortSet, SimulationError, StepValues, Unit,
};
use crate::sim::types::SimParameters;

/// Seed offset for the occupancy RNG to avoid correlation with the weather
/// noise stream.
const OCCUPANCY_SEED_OFFSET: u64 = 31;

/// Household occupancy profile generator.
///
/// Produces electricity plug-load consumption and hot water heat demand for
/// a residential household: a base load with morning and evening peaks plus
/// seeded Gaussian noise. Profiles are precomputed in
/// `i_prepare_simulation` and are deterministic per seed.
pub struct Occupancy {
    ports: PortSet,
    electricity_consumption: OutputHandle,
    hot_water_demand: OutputHandle,
    base_load_w: f32,
    peak_load_w: f32,
    hot_water_peak_w: f32,
    noise_std_w: f32,
    seed: u64,
    steps_per_day: usize,
    total_steps: usize,
    electricity_profile: Vec<f32>,
    hot_water_profile: Vec<f32>,
}

impl Occupancy {
    pub const NAME: &'static str = "Occupancy";

    // Outputs
    pub const ELECTRICITY_CONSUMPTION: &'static str = "ElectricityConsumption"; // W
    pub const HOT_WATER_DEMAND: &'static str = "HotWaterDemand"; // W thermal

    /// Creates an occupancy profile generator.
    ///
    /// # Arguments
    ///
    /// * `base_load_w` - Always-on plug load (W)
    /// * `peak_load_w` - Additional peak-hour plug load (W)
    /// * `hot_water_peak_w` - Peak hot water heat draw (W thermal)
    /// * `noise_std_w` - Gaussian noise standard deviation (W)
    /// * `params` - Simulation timing (profile length, master seed)
    pub fn new(
        base_load_w: f32,
        peak_load_w: f32,
        hot_water_peak_w: f32,
        noise_std_w: f32,
        params: &SimParameters,
    ) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(Self::NAME);
        let electricity_consumption = ports.declare_output(
            Self::ELECTRICITY_CONSUMPTION,
            LoadType::Electricity,
            Unit::Watt,
            "Household plug-load electricity consumption",
        )?;
        let hot_water_demand = ports.declare_output(
            Self::HOT_WATER_DEMAND,
            LoadType::Heating,
            Unit::Watt,
            "Hot water heat demand drawn from storage",
        )?;
        Ok(Self {
            ports,
            electricity_consumption,
            hot_water_demand,
            base_load_w,
            peak_load_w,
            hot_water_peak_w,
            noise_std_w,
            seed: params.seed.wrapping_add(OCCUPANCY_SEED_OFFSET),
            steps_per_day: params.steps_per_day(),
            total_steps: params.total_steps(),
            electricity_profile: Vec::new(),
            hot_water_profile: Vec::new(),
        })
    }

    /// Gaussian activity bump centered at `center_hr` with width `width_hr`.
    fn bump(hour: f32, center_hr: f32, width_hr: f32) -> f32 {
        let d = (hour - center_hr) / width_hr;
        (-0.5 * d * d).exp()
    }
}

impl Component for Occupancy {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }

    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    fn i_prepare_simulation(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.electricity_profile = Vec::with_capacity(self.total_steps);
        self.hot_water_profile = Vec::with_capacity(self.total_steps);

        for t in 0..self.total_steps {
            let hour = (t % self.steps_per_day) as f32 * 24.0 / self.steps_per_day as f32;

            let activity = Self::bump(hour, 7.5, 1.2) + Self::bump(hour, 19.0, 2.0);
            let electricity = self.base_load_w
                + self.peak_load_w * activity
                + gaussian_noise(&mut rng, self.noise_std_w);
            self.electricity_profile.push(electricity.max(0.0));

            let draw = Self::bump(hour, 7.0, 0.7) + Self::bump(hour, 20.0, 1.0);
            let hot_water = self.hot_water_peak_w * draw
                + gaussian_noise(&mut rng, self.noise_std_w * 0.5);
            self.hot_water_profile.push(hot_water.max(0.0));
        }
    }

    fn i_simulate(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        values.set_output_value(
            self.ports.output(self.electricity_consumption),
            self.electricity_profile[timestep],
        );
        values.set_output_value(
            self.ports.output(self.hot_water_demand),
            self.hot_water_profile[timestep],
        );
        Ok(())
    }

    fn i_save_state(&mut self) {}

    fn i_restore_state(&mut self) {}
}
