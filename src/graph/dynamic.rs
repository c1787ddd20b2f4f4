//! Dynamic port manager: build-time acquisition of tagged, weighted ports.
//!
//! Components with a fixed port count declare everything in their
//! constructor. Dynamic components (aggregators such as an electricity
//! meter) cannot know at definition time how many producers or consumers a
//! scenario wires into them. They embed a [`DynamicPorts`] registry next to
//! their [`PortSet`] and acquire ports during the build phase, each entry
//! tagged with semantic categories and a weight. At simulation time they
//! address those ports by `(tags, weight)` predicate instead of by field
//! name.
//!
//! Matching is by tag *superset* (see [`TagSet::is_superset_of`]) plus exact
//! weight, resolved in declaration order; callers that need determinism
//! among same-tagged entries must declare them in a deterministic order.

use super::error::GraphError;
use super::load::{LoadType, TagSet, Unit};
use super::port::{InputHandle, OutputHandle, PortSet};
use super::values::StepValues;

/// Registry entry for one dynamically acquired input.
///
/// Tags and weight live only here; the generic [`super::port::InputPort`]
/// knows nothing about them.
#[derive(Debug, Clone)]
pub struct DynamicConnectionInput {
    /// Handle of the input in the owning component's port set.
    pub handle: InputHandle,
    /// Name of the source component the input was bound to.
    pub source_component: String,
    /// Display name of the source output the input was bound to.
    pub source_output: String,
    /// Semantic categories of the source.
    pub tags: TagSet,
    /// Ordinal distinguishing multiple same-tagged sources.
    pub weight: u32,
}

/// Registry entry for one dynamically acquired output.
#[derive(Debug, Clone)]
pub struct DynamicConnectionOutput {
    /// Handle of the output in the owning component's port set.
    pub handle: OutputHandle,
    /// Semantic categories of the output.
    pub tags: TagSet,
    /// Ordinal distinguishing multiple same-tagged outputs.
    pub weight: u32,
}

/// Dynamic input/output registry of one component.
#[derive(Debug, Clone, Default)]
pub struct DynamicPorts {
    inputs: Vec<DynamicConnectionInput>,
    outputs: Vec<DynamicConnectionOutput>,
}

impl DynamicPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires one new input on `ports` and binds it to the output of
    /// `source` whose display name equals `source_output`.
    ///
    /// The input is auto-named positionally: `Input<N>` where `N` is the
    /// current input count of `ports`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoMatchingOutput`] when `source` has no output
    /// with that display name.
    pub fn add_input_and_connect(
        &mut self,
        ports: &mut PortSet,
        source: &PortSet,
        source_output: &str,
        load_type: LoadType,
        unit: Unit,
        tags: TagSet,
        weight: u32,
    ) -> Result<InputHandle, GraphError> {
        let matched = source
            .outputs()
            .iter()
            .find(|o| o.display_name() == source_output)
            .ok_or_else(|| GraphError::NoMatchingOutput {
                component: source.component_name().to_string(),
                name: source_output.to_string(),
            })?;

        let label = format!("Input{}", ports.inputs().len());
        let handle = ports.declare_input(&label, load_type, unit, true)?;
        ports.connect_input(handle, source.component_name(), matched.field_name());
        self.inputs.push(DynamicConnectionInput {
            handle,
            source_component: source.component_name().to_string(),
            source_output: source_output.to_string(),
            tags,
            weight,
        });
        Ok(handle)
    }

    /// Discovers and connects inputs in bulk: every output of every listed
    /// source whose display name *contains* `name_fragment` gets one new
    /// input, created and bound exactly as by
    /// [`DynamicPorts::add_input_and_connect`].
    ///
    /// The resulting inputs follow source order, then output declaration
    /// order within each source. Zero matches yields an empty vector, not
    /// an error: wiring through discovery is optional by contract, and
    /// callers must handle the empty case.
    pub fn add_inputs_and_connect(
        &mut self,
        ports: &mut PortSet,
        sources: &[&PortSet],
        name_fragment: &str,
        load_type: LoadType,
        unit: Unit,
        tags: TagSet,
        weight: u32,
    ) -> Result<Vec<InputHandle>, GraphError> {
        let mut handles = Vec::new();
        for source in sources {
            for output in source.outputs() {
                if !output.display_name().contains(name_fragment) {
                    continue;
                }
                let label = format!("Input{}", ports.inputs().len());
                let handle = ports.declare_input(&label, load_type, unit, true)?;
                ports.connect_input(handle, source.component_name(), output.field_name());
                self.inputs.push(DynamicConnectionInput {
                    handle,
                    source_component: source.component_name().to_string(),
                    source_output: output.display_name().to_string(),
                    tags: tags.clone(),
                    weight,
                });
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    /// Acquires one new output on `ports`.
    ///
    /// The output is auto-named positionally: field name `Output<N+1>`,
    /// display name `<name>Output<N+1>`.
    pub fn add_output(
        &mut self,
        ports: &mut PortSet,
        name: &str,
        tags: TagSet,
        load_type: LoadType,
        unit: Unit,
        weight: u32,
    ) -> Result<OutputHandle, GraphError> {
        let label = format!("Output{}", ports.outputs().len() + 1);
        let display = format!("{name}{label}");
        let handle =
            ports.declare_output_with_display(&label, &display, load_type, unit, name)?;
        self.outputs.push(DynamicConnectionOutput {
            handle,
            tags,
            weight,
        });
        Ok(handle)
    }

    /// Value of the FIRST dynamic input (declaration order) whose tag set is
    /// a superset of `tags` and whose weight equals `weight`.
    ///
    /// Returns `None` when nothing matches. `None` means "source absent" and
    /// must not be treated as zero by calling code.
    pub fn get_dynamic_input(
        &self,
        ports: &PortSet,
        values: &StepValues,
        tags: &TagSet,
        weight: u32,
    ) -> Option<f32> {
        self.inputs
            .iter()
            .find(|entry| entry.tags.is_superset_of(tags) && entry.weight == weight)
            .map(|entry| values.get_input_value(ports.input(entry.handle)))
    }

    /// Values of ALL dynamic inputs whose tag set is a superset of `tags`,
    /// ignoring weight, in declaration order.
    pub fn get_dynamic_inputs(
        &self,
        ports: &PortSet,
        values: &StepValues,
        tags: &TagSet,
    ) -> Vec<f32> {
        self.inputs
            .iter()
            .filter(|entry| entry.tags.is_superset_of(tags))
            .map(|entry| values.get_input_value(ports.input(entry.handle)))
            .collect()
    }

    /// Writes `value` into EVERY dynamic output whose tag set is a superset
    /// of `tags` and whose weight equals `weight`.
    ///
    /// Unlike [`DynamicPorts::get_dynamic_input`], which stops at the first
    /// match, this writes all matches: several outputs sharing one
    /// (tags, weight) pair all receive the value. The asymmetry is
    /// preserved behavior, kept as-is on purpose.
    pub fn set_dynamic_output(
        &self,
        ports: &PortSet,
        values: &mut StepValues,
        tags: &TagSet,
        weight: u32,
        value: f32,
    ) {
        for entry in &self.outputs {
            if entry.tags.is_superset_of(tags) && entry.weight == weight {
                values.set_output_value(ports.output(entry.handle), value);
            }
        }
    }

    /// Registered dynamic inputs in declaration order.
    pub fn inputs(&self) -> &[DynamicConnectionInput] {
        &self.inputs
    }

    /// Registered dynamic outputs in declaration order.
    pub fn outputs(&self) -> &[DynamicConnectionOutput] {
        &self.outputs
    }
}
