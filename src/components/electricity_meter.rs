//! Dynamic electricity meter: aggregates consumers discovered at build time.

use crate::graph::{
    Component, DynamicPorts, GraphError, LoadType, OutputHandle, PortSet, SimulationError,
    StepValues, Tag, TagSet, Unit,
};

/// Dynamic-input weight for plug loads discovered by substring match.
const PLUG_LOAD_WEIGHT: u32 = 1;
/// Dynamic-input weight for the heat pump's electrical draw.
const HEAT_PUMP_WEIGHT: u32 = 2;
/// Weight of the grid balance dynamic output.
const GRID_BALANCE_WEIGHT: u32 = 1;

/// Household electricity meter.
///
/// The meter does not know at definition time which consumers a scenario
/// contains: sources are discovered during the build phase by scanning
/// candidate components' output names ([`ElectricityMeter::connect_sources`]).
/// At simulation time the discovered inputs are addressed through their
/// tags, never by field name. A scenario with no matching sources is legal;
/// the meter then reports zero consumption.
pub struct ElectricityMeter {
    ports: PortSet,
    dynamic: DynamicPorts,
    // Static outputs
    total_consumption: OutputHandle,
    heat_pump_consumption: OutputHandle,
    // Precomputed lookup predicates
    consumption_tags: TagSet,
    heat_pump_tags: TagSet,
    grid_tags: TagSet,
}

impl ElectricityMeter {
    pub const NAME: &'static str = "ElectricityMeter";

    // Outputs
    pub const TOTAL_CONSUMPTION: &'static str = "TotalConsumption"; // W
    pub const HEAT_PUMP_CONSUMPTION: &'static str = "HeatPumpConsumption"; // W

    /// Display-name fragment matched against candidate plug-load outputs.
    pub const PLUG_LOAD_FRAGMENT: &'static str = "ElectricityConsumption";
    /// Display-name fragment matched against candidate heat pump outputs.
    pub const HEAT_PUMP_FRAGMENT: &'static str = "ElectricalInputPower";

    /// Creates a meter with no connected sources.
    pub fn new() -> Result<Self, GraphError> {
        let mut ports = PortSet::new(Self::NAME);
        let total_consumption = ports.declare_output(
            Self::TOTAL_CONSUMPTION,
            LoadType::Electricity,
            Unit::Watt,
            "Total electricity consumption of all connected sources",
        )?;
        let heat_pump_consumption = ports.declare_output(
            Self::HEAT_PUMP_CONSUMPTION,
            LoadType::Electricity,
            Unit::Watt,
            "Heat pump share of the electricity consumption",
        )?;

        let mut dynamic = DynamicPorts::new();
        // Grid balance is published through a dynamic output so downstream
        // components can discover it by tag.
        dynamic.add_output(
            &mut ports,
            "GridBalance",
            TagSet::from([Tag::GridBalance]),
            LoadType::Electricity,
            Unit::Watt,
            GRID_BALANCE_WEIGHT,
        )?;

        Ok(Self {
            ports,
            dynamic,
            total_consumption,
            heat_pump_consumption,
            consumption_tags: TagSet::from([Tag::ElectricityConsumption]),
            heat_pump_tags: TagSet::from([Tag::HeatPump]),
            grid_tags: TagSet::from([Tag::GridBalance]),
        })
    }

    /// Discovers and connects electricity sources among `candidates`.
    ///
    /// Scans every candidate's outputs for plug-load consumption and heat
    /// pump draw by display-name fragment. Returns the number of inputs
    /// created; zero is a legal result for a scenario without electrical
    /// consumers.
    pub fn connect_sources(&mut self, candidates: &[&PortSet]) -> Result<usize, GraphError> {
        let plug_loads = self.dynamic.add_inputs_and_connect(
            &mut self.ports,
            candidates,
            Self::PLUG_LOAD_FRAGMENT,
            LoadType::Electricity,
            Unit::Watt,
            TagSet::from([Tag::ElectricityConsumption, Tag::Occupancy]),
            PLUG_LOAD_WEIGHT,
        )?;
        let heat_pumps = self.dynamic.add_inputs_and_connect(
            &mut self.ports,
            candidates,
            Self::HEAT_PUMP_FRAGMENT,
            LoadType::Electricity,
            Unit::Watt,
            TagSet::from([Tag::ElectricityConsumption, Tag::HeatPump]),
            HEAT_PUMP_WEIGHT,
        )?;
        Ok(plug_loads.len() + heat_pumps.len())
    }

    /// Number of dynamically connected inputs.
    pub fn source_count(&self) -> usize {
        self.dynamic.inputs().len()
    }
}

impl Component for ElectricityMeter {
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
        let consumption: f32 = self
            .dynamic
            .get_dynamic_inputs(&self.ports, values, &self.consumption_tags)
            .iter()
            .sum();
        values.set_output_value(self.ports.output(self.total_consumption), consumption);

        // First-match lookup; a missing heat pump is "absent", not zero,
        // and the explicit branch decides what to report.
        let heat_pump_w = match self.dynamic.get_dynamic_input(
            &self.ports,
            values,
            &self.heat_pump_tags,
            HEAT_PUMP_WEIGHT,
        ) {
            Some(power) => power,
            None => 0.0,
        };
        values.set_output_value(self.ports.output(self.heat_pump_consumption), heat_pump_w);

        // Feeder convention: negative balance is a net draw from the grid.
        self.dynamic.set_dynamic_output(
            &self.ports,
            values,
            &self.grid_tags,
            GRID_BALANCE_WEIGHT,
            -consumption,
        );
        Ok(())
    }

    // The meter is stateless; everything is recomputed from inputs.
    fn i_save_state(&mut self) {}

    fn i_restore_state(&mut self) {}
}
