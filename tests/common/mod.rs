//! Shared test fixtures for integration tests.
#![allow(dead_code)] // each test binary uses a different fixture subset

use std::cell::Cell;
use std::rc::Rc;

use hes_sim::graph::{
    Component, GraphError, InputHandle, LoadType, OutputHandle, PortSet, SimulationError,
    StepValues, Unit,
};
use hes_sim::sim::types::SimParameters;

/// One day of hourly timesteps, fixed seed.
pub fn hourly_params() -> SimParameters {
    SimParameters::new(1, 3600, 42)
}

/// Source emitting a constant value on a single named output.
pub struct ConstantSource {
    ports: PortSet,
    output: OutputHandle,
    value: f32,
}

impl ConstantSource {
    pub fn new(
        name: &str,
        field: &str,
        load_type: LoadType,
        unit: Unit,
        value: f32,
    ) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(name);
        let output = ports.declare_output(field, load_type, unit, "constant test source")?;
        Ok(Self {
            ports,
            output,
            value,
        })
    }
}

impl Component for ConstantSource {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        values.set_output_value(self.ports.output(self.output), self.value);
        Ok(())
    }
    fn i_save_state(&mut self) {}
    fn i_restore_state(&mut self) {}
}

/// Source emitting one scheduled value per timestep; the last entry repeats
/// past the end of the schedule.
pub struct ScheduledSource {
    ports: PortSet,
    output: OutputHandle,
    schedule: Vec<f32>,
}

impl ScheduledSource {
    pub fn new(name: &str, field: &str, schedule: Vec<f32>) -> Result<Self, GraphError> {
        assert!(!schedule.is_empty());
        let mut ports = PortSet::new(name);
        let output =
            ports.declare_output(field, LoadType::Any, Unit::Any, "scheduled test source")?;
        Ok(Self {
            ports,
            output,
            schedule,
        })
    }
}

impl Component for ScheduledSource {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_simulate(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        let value = *self
            .schedule
            .get(timestep)
            .unwrap_or_else(|| self.schedule.last().expect("schedule is non-empty"));
        values.set_output_value(self.ports.output(self.output), value);
        Ok(())
    }
    fn i_save_state(&mut self) {}
    fn i_restore_state(&mut self) {}
}

/// Copies its mandatory input to its output within the same pass.
pub struct Relay {
    ports: PortSet,
    input: InputHandle,
    output: OutputHandle,
}

impl Relay {
    pub const INPUT: &'static str = "In";
    pub const OUTPUT: &'static str = "Out";

    pub fn new(name: &str, load_type: LoadType, unit: Unit) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(name);
        let input = ports.declare_input(Self::INPUT, load_type, unit, true)?;
        let output = ports.declare_output(Self::OUTPUT, load_type, unit, "relayed value")?;
        Ok(Self {
            ports,
            input,
            output,
        })
    }
}

impl Component for Relay {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        let value = values.get_input_value(self.ports.input(self.input));
        values.set_output_value(self.ports.output(self.output), value);
        Ok(())
    }
    fn i_save_state(&mut self) {}
    fn i_restore_state(&mut self) {}
}

/// Affine map `out = gain * in + offset`, for building feedback cycles.
pub struct AffineStage {
    ports: PortSet,
    input: InputHandle,
    output: OutputHandle,
    gain: f32,
    offset: f32,
}

impl AffineStage {
    pub const INPUT: &'static str = "In";
    pub const OUTPUT: &'static str = "Out";

    pub fn new(name: &str, gain: f32, offset: f32) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(name);
        let input = ports.declare_input(Self::INPUT, LoadType::Any, Unit::Any, true)?;
        let output = ports.declare_output(Self::OUTPUT, LoadType::Any, Unit::Any, "affine map")?;
        Ok(Self {
            ports,
            input,
            output,
            gain,
            offset,
        })
    }
}

impl Component for AffineStage {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        let value = values.get_input_value(self.ports.input(self.input));
        values.set_output_value(self.ports.output(self.output), self.gain * value + self.offset);
        Ok(())
    }
    fn i_save_state(&mut self) {}
    fn i_restore_state(&mut self) {}
}

/// Counts engine protocol calls through shared cells, so tests can inspect
/// them after the engine has taken ownership.
#[derive(Clone, Default)]
pub struct ProtocolCounters {
    pub prepares: Rc<Cell<usize>>,
    pub simulates: Rc<Cell<usize>>,
    pub saves: Rc<Cell<usize>>,
    pub restores: Rc<Cell<usize>>,
    pub doublechecks: Rc<Cell<usize>>,
}

/// Component that records every lifecycle call it receives.
pub struct ProtocolProbe {
    ports: PortSet,
    output: OutputHandle,
    counters: ProtocolCounters,
}

impl ProtocolProbe {
    pub fn new(name: &str) -> Result<(Self, ProtocolCounters), GraphError> {
        let mut ports = PortSet::new(name);
        let output = ports.declare_output("Pulse", LoadType::Any, Unit::Any, "probe pulse")?;
        let counters = ProtocolCounters::default();
        Ok((
            Self {
                ports,
                output,
                counters: counters.clone(),
            },
            counters,
        ))
    }
}

impl Component for ProtocolProbe {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_prepare_simulation(&mut self) {
        self.counters.prepares.set(self.counters.prepares.get() + 1);
    }
    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        self.counters.simulates.set(self.counters.simulates.get() + 1);
        values.set_output_value(self.ports.output(self.output), 1.0);
        Ok(())
    }
    fn i_save_state(&mut self) {
        self.counters.saves.set(self.counters.saves.get() + 1);
    }
    fn i_restore_state(&mut self) {
        self.counters.restores.set(self.counters.restores.get() + 1);
    }
    fn i_doublecheck(&self, _timestep: usize, _values: &StepValues) {
        self.counters
            .doublechecks
            .set(self.counters.doublechecks.get() + 1);
    }
}

/// Writes its single output twice per pass, violating the single-writer
/// invariant on purpose.
pub struct DoubleWriter {
    ports: PortSet,
    output: OutputHandle,
}

impl DoubleWriter {
    pub fn new(name: &str) -> Result<Self, GraphError> {
        let mut ports = PortSet::new(name);
        let output = ports.declare_output("Twice", LoadType::Any, Unit::Any, "")?;
        Ok(Self { ports, output })
    }
}

impl Component for DoubleWriter {
    fn port_set(&self) -> &PortSet {
        &self.ports
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }
    fn i_simulate(
        &mut self,
        _timestep: usize,
        values: &mut StepValues,
        _force_convergence: bool,
    ) -> Result<(), SimulationError> {
        values.set_output_value(self.ports.output(self.output), 1.0);
        values.set_output_value(self.ports.output(self.output), 2.0);
        Ok(())
    }
    fn i_save_state(&mut self) {}
    fn i_restore_state(&mut self) {}
}
