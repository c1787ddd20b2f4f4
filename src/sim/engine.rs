//! Timestep execution engine.
//!
//! Drives a frozen component graph through the per-timestep protocol:
//! simulate every component in dependency order, iterate the whole pass
//! until the value vector stabilizes (feedback cycles), save state at the
//! converged timestep boundary, and record the values row.

use crate::graph::{FrozenGraph, SimulationError, StepValues};

use super::types::{SimParameters, SimulationResults};

/// Simulation engine owning the frozen graph and timing parameters.
pub struct Engine {
    graph: FrozenGraph,
    parameters: SimParameters,
}

impl Engine {
    /// Creates an engine for a frozen graph.
    pub fn new(graph: FrozenGraph, parameters: SimParameters) -> Self {
        Self { graph, parameters }
    }

    /// The frozen graph, for slot lookups.
    pub fn graph(&self) -> &FrozenGraph {
        &self.graph
    }

    /// The timing parameters.
    pub fn parameters(&self) -> &SimParameters {
        &self.parameters
    }

    /// Executes all timesteps and returns the complete record.
    ///
    /// Before the first timestep every component is prepared and its
    /// initial state saved, so a mid-timestep restore never precedes the
    /// first save.
    ///
    /// # Errors
    ///
    /// The first error from any component's `i_simulate` aborts the whole
    /// run; coupled physical state cannot tolerate partial failure.
    pub fn run(&mut self) -> Result<SimulationResults, SimulationError> {
        for component in self.graph.components_mut() {
            component.i_prepare_simulation();
            component.i_save_state();
        }

        let total = self.parameters.total_steps();
        let mut values = StepValues::new(self.graph.slot_count());
        let mut rows = Vec::with_capacity(total);
        let mut total_passes = 0;
        let mut forced_timesteps = 0;

        for timestep in 0..total {
            let (passes, forced) = self.simulate_timestep(timestep, &mut values)?;
            total_passes += passes;
            if forced {
                forced_timesteps += 1;
            }
            rows.push(values.values().to_vec());
        }

        Ok(SimulationResults {
            columns: self.graph.slots().to_vec(),
            rows,
            dt_hours: self.parameters.dt_hours(),
            total_passes,
            forced_timesteps,
        })
    }

    /// Simulates one timestep to convergence.
    ///
    /// Returns `(passes, forced)` where `forced` reports whether the
    /// iteration cap was hit and the final mandatory pass was taken.
    fn simulate_timestep(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
    ) -> Result<(usize, bool), SimulationError> {
        // Values entering the timestep; the first pass converges against
        // these when the system is already steady.
        let mut previous = values.values().to_vec();
        let mut passes = 0;
        let mut forced = false;

        loop {
            passes += 1;
            self.run_pass(timestep, values, false)?;

            if values.max_abs_delta(&previous) <= self.parameters.tolerance {
                break;
            }
            if passes >= self.parameters.max_iterations {
                // Cap hit: roll back and take one final mandatory pass.
                self.restore_all();
                self.run_pass(timestep, values, true)?;
                passes += 1;
                forced = true;
                break;
            }
            previous.copy_from_slice(values.values());
            self.restore_all();
        }

        for component in self.graph.components() {
            component.i_doublecheck(timestep, values);
        }
        for component in self.graph.components_mut() {
            component.i_save_state();
        }
        Ok((passes, forced))
    }

    /// Runs every component once, in execution order, and checks the
    /// single-writer invariant.
    fn run_pass(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        force_convergence: bool,
    ) -> Result<(), SimulationError> {
        values.begin_pass();
        let order = self.graph.execution_order().to_vec();
        for index in order {
            self.graph.components_mut()[index].i_simulate(timestep, values, force_convergence)?;
        }
        if let Some(&slot) = values.double_written_slots().first() {
            return Err(SimulationError::DoubleWrite {
                output: self.graph.slots()[slot].label(),
            });
        }
        Ok(())
    }

    fn restore_all(&mut self) {
        for component in self.graph.components_mut() {
            component.i_restore_state();
        }
    }
}
