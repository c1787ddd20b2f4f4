//! Ambient temperature source.

use rand::{SeedableRng, rngs::StdRng};

use crate::components::gaussian_noise;
use crate::graph::{
    Component, GraphError, LoadType, OutputHandle, PortSet, SimulationError, StepValues, Unit,
};
use crate::sim::types::SimParameters;

/// Outdoor weather source.
///
/// Produces an ambient temperature trace from a seasonal plus daily
/// sinusoid with seeded Gaussian noise, and a noise-free daily average used
/// by controllers for summer-mode decisions. The whole trace is precomputed
/// in `i_prepare_simulation`, so repeated convergence passes within a
/// timestep read identical values.
pub struct Weather {
    ports: PortSet,
    ambient_temperature: OutputHandle,
    daily_average_temperature: OutputHandle,
    annual_mean_c: f32,
    annual_amplitude_c: f32,
    daily_amplitude_c: f32,
    noise_std_c: f32,
    seed: u64,
    steps_per_day: usize,
    total_steps: usize,
    ambient_profile: Vec<f32>,
    daily_average_profile: Vec<f32>,
}

impl Weather {
    pub const NAME: &'static str = "Weather";

    // Outputs
    pub const AMBIENT_TEMPERATURE: &'static str = "AmbientTemperature"; // °C
    pub const DAILY_AVERAGE_TEMPERATURE: &'static str = "DailyAverageTemperature"; // °C

    /// Creates a weather source.
    ///
    /// # Arguments
    ///
    /// * `annual_mean_c` - Yearly mean outdoor temperature (°C)
    /// * `annual_amplitude_c` - Seasonal swing around the mean (°C)
    /// * `daily_amplitude_c` - Day/night swing (°C), coldest at midnight
    /// * `noise_std_c` - Gaussian noise standard deviation (°C)
    /// * `params` - Simulation timing (profile length, master seed)
    pub fn new(
        annual_mean_c: f32,
        annual_amplitude_c: f32,
        daily_amplitude_c: f32,
        noise_std_c: f32,
        params: &SimParameters,
    ) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(Self::NAME);
        let ambient_temperature = ports.declare_output(
            Self::AMBIENT_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            "Outdoor air temperature",
        )?;
        let daily_average_temperature = ports.declare_output(
            Self::DAILY_AVERAGE_TEMPERATURE,
            LoadType::Temperature,
            Unit::Celsius,
            "Noise-free daily average outdoor temperature",
        )?;
        Ok(Self {
            ports,
            ambient_temperature,
            daily_average_temperature,
            annual_mean_c,
            annual_amplitude_c,
            daily_amplitude_c,
            noise_std_c,
            seed: params.seed,
            steps_per_day: params.steps_per_day(),
            total_steps: params.total_steps(),
            ambient_profile: Vec::new(),
            daily_average_profile: Vec::new(),
        })
    }
}

impl Component for Weather {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }

    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    fn i_prepare_simulation(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.ambient_profile = Vec::with_capacity(self.total_steps);
        self.daily_average_profile = Vec::with_capacity(self.total_steps);

        for t in 0..self.total_steps {
            let day = (t / self.steps_per_day) as f32;
            let day_pos = (t % self.steps_per_day) as f32 / self.steps_per_day as f32;

            // Coldest day of the simulated span at day 0.
            let seasonal = self.annual_mean_c
                - self.annual_amplitude_c * (2.0 * std::f32::consts::PI * day / 365.0).cos();
            let diurnal =
                -self.daily_amplitude_c * (2.0 * std::f32::consts::PI * day_pos).cos();
            let noise = gaussian_noise(&mut rng, self.noise_std_c);

            self.ambient_profile.push(seasonal + diurnal + noise);
            self.daily_average_profile.push(seasonal);
        }
    }

    fn i_simulate(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        values.set_output_value(
            self.ports.output(self.ambient_temperature),
            self.ambient_profile[timestep],
        );
        values.set_output_value(
            self.ports.output(self.daily_average_temperature),
            self.daily_average_profile[timestep],
        );
        Ok(())
    }

    // No mutable per-timestep state; the profile is fixed after prepare.
    fn i_save_state(&mut self) {}

    fn i_restore_state(&mut self) {}
}
