//! The component trait: lifecycle hooks every simulation unit implements.

use super::error::SimulationError;
use super::port::PortSet;
use super::values::StepValues;

/// A declarative fallback wiring for one input.
///
/// Components advertise default connections for their inputs; the wiring
/// resolver applies them at freeze time, in declaration order, skipping any
/// input the user has already connected explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConnection {
    /// Field name of the input on the advertising component.
    pub input_field: String,
    /// Name of the default source component.
    pub source_component: String,
    /// Field name of the default source output.
    pub source_field: String,
}

impl DefaultConnection {
    pub fn new(input_field: &str, source_component: &str, source_field: &str) -> Self {
        Self {
            input_field: input_field.to_string(),
            source_component: source_component.to_string(),
            source_field: source_field.to_string(),
        }
    }
}

/// A named unit of simulation logic with typed ports and internal state.
///
/// The engine drives each component through a fixed per-timestep protocol:
///
/// 1. `i_prepare_simulation`: once, before the first timestep.
/// 2. `i_simulate`: at least once per timestep; repeatedly while the engine
///    iterates a coupled subset toward convergence. Between iterations the
///    engine calls `i_restore_state` so that every pass starts from the last
///    saved state.
/// 3. `i_doublecheck`: once per timestep after convergence; side-effect
///    free.
/// 4. `i_save_state`: once per timestep after convergence; also once before
///    the first timestep so that a restore never precedes the first save.
///
/// When `force_convergence` is `true` the engine is making the final,
/// mandatory pass of a timestep that failed to converge: the component must
/// produce output values and must not fail for lack of settled data.
pub trait Component {
    /// Unique name of this component within the simulation.
    fn name(&self) -> &str {
        self.port_set().component_name()
    }

    /// The component's declared ports.
    fn port_set(&self) -> &PortSet;

    /// Mutable access to the declared ports, used by the wiring resolver.
    fn port_set_mut(&mut self) -> &mut PortSet;

    /// Fallback wirings applied at freeze time to inputs the user left
    /// unbound.
    fn default_connections(&self) -> Vec<DefaultConnection> {
        Vec::new()
    }

    /// Called once before the first timestep. Internal caches and
    /// precomputed profiles go here; no observable state mutation.
    fn i_prepare_simulation(&mut self) {}

    /// Simulates one timestep: reads bound inputs from `values`, updates
    /// internal state, writes outputs into `values`.
    fn i_simulate(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        force_convergence: bool,
    ) -> Result<(), SimulationError>;

    /// Snapshots internal state. The next `i_restore_state` returns to this
    /// snapshot.
    fn i_save_state(&mut self);

    /// Rolls internal state back to the last snapshot.
    fn i_restore_state(&mut self);

    /// Optional post-convergence consistency assertion; must not mutate
    /// state or values.
    fn i_doublecheck(&self, _timestep: usize, _values: &StepValues) {}
}
