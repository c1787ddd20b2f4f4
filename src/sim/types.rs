//! Core simulation types: timing parameters and recorded results.

use std::fmt;

use crate::graph::SlotInfo;

/// Centralized simulation timing parameters.
///
/// Every component and the engine reference this struct for timing,
/// eliminating duplicated timestep-length computations.
///
/// # Examples
///
/// ```
/// use hes_sim::sim::types::SimParameters;
///
/// let params = SimParameters::new(1, 900, 42);
/// assert_eq!(params.steps_per_day(), 96);
/// assert_eq!(params.total_steps(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct SimParameters {
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one timestep in seconds, must divide a day evenly.
    pub seconds_per_timestep: u32,
    /// Master random seed for reproducibility.
    pub seed: u64,
    /// Convergence iteration cap per timestep.
    pub max_iterations: usize,
    /// Convergence tolerance: largest allowed slot delta between passes.
    pub tolerance: f32,
}

impl SimParameters {
    /// Creates parameters with the default iteration cap (11) and tolerance
    /// (1e-3).
    ///
    /// The default cap is odd: an on/off feedback loop that flips between
    /// passes alternates with period 2, and the forced final pass inherits
    /// the last unforced pass. An odd cap makes that the same decision the
    /// first pass took from the committed values.
    ///
    /// # Panics
    ///
    /// Panics if `days` is zero or `seconds_per_timestep` is zero or does
    /// not divide 86400.
    pub fn new(days: usize, seconds_per_timestep: u32, seed: u64) -> Self {
        assert!(days > 0, "days must be > 0");
        assert!(
            seconds_per_timestep > 0 && 86400 % seconds_per_timestep == 0,
            "seconds_per_timestep must divide a day"
        );
        Self {
            days,
            seconds_per_timestep,
            seed,
            max_iterations: 11,
            tolerance: 1e-3,
        }
    }

    /// Number of timesteps per simulated day.
    pub fn steps_per_day(&self) -> usize {
        (86400 / self.seconds_per_timestep) as usize
    }

    /// Total number of timesteps across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day() * self.days
    }

    /// Duration of one timestep in hours.
    pub fn dt_hours(&self) -> f32 {
        self.seconds_per_timestep as f32 / 3600.0
    }
}

/// Complete record of one simulation run.
///
/// One row per timestep, one column per output slot of the frozen graph,
/// plus convergence statistics.
#[derive(Debug, Clone)]
pub struct SimulationResults {
    /// Metadata of every column, in slot order.
    pub columns: Vec<SlotInfo>,
    /// Recorded slot values, one row per timestep.
    pub rows: Vec<Vec<f32>>,
    /// Duration of one timestep in hours, for energy integration.
    pub dt_hours: f32,
    /// Total simulation passes across all timesteps.
    pub total_passes: usize,
    /// Timesteps that hit the iteration cap and were force-converged.
    pub forced_timesteps: usize,
}

impl SimulationResults {
    /// Column index of the named output, when recorded.
    pub fn column(&self, component: &str, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.component == component && c.field == field)
    }

    /// Full time series of the named output.
    pub fn series(&self, component: &str, field: &str) -> Option<Vec<f32>> {
        self.column(component, field)
            .map(|idx| self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Mean simulation passes per timestep.
    pub fn mean_passes(&self) -> f32 {
        if self.rows.is_empty() {
            0.0
        } else {
            self.total_passes as f32 / self.rows.len() as f32
        }
    }
}

impl fmt::Display for SimulationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} timesteps, {} columns, {:.2} passes/step, {} forced",
            self.rows.len(),
            self.columns.len(),
            self.mean_passes(),
            self.forced_timesteps,
        )
    }
}
