//! Domain components for household energy system modeling.

use rand::{Rng, rngs::StdRng};

/// Dynamic electricity aggregation meter.
pub mod electricity_meter;
/// Heat pump with cycling protection.
pub mod heat_pump;
/// Hysteresis heat pump controller.
pub mod heat_pump_controller;
/// Household load profile generator.
pub mod occupancy;
/// Hot water buffer storage.
pub mod storage;
/// Outdoor temperature source.
pub mod weather;

// Re-export the main types for convenience
pub use electricity_meter::ElectricityMeter;
pub use heat_pump::HeatPump;
pub use heat_pump_controller::{ControllerMode, HeatPumpController};
pub use occupancy::Occupancy;
pub use storage::HotWaterStorage;
pub use weather::Weather;

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified
/// standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_std_dev_yields_zero_noise() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn noise_is_seed_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(gaussian_noise(&mut a, 1.0), gaussian_noise(&mut b, 1.0));
    }
}
