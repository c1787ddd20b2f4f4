//! Port descriptors and the per-component channel registry.

use super::error::GraphError;
use super::load::{LoadType, Unit};

/// Handle to an input port, stable for the lifetime of its component.
///
/// Handles are plain indices into the owning [`PortSet`]; calling code keeps
/// them instead of string field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputHandle(pub(crate) usize);

/// Handle to an output port, stable for the lifetime of its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputHandle(pub(crate) usize);

/// Recorded binding of an input to a source output, by name.
///
/// Existence of the source is not checked when the binding is recorded; the
/// wiring resolver validates it at freeze time.
#[derive(Debug, Clone, PartialEq)]
pub struct PortBinding {
    /// Name of the component owning the source output.
    pub source_component: String,
    /// Field name of the source output.
    pub source_field: String,
}

/// A typed input slot on a component.
#[derive(Debug, Clone)]
pub struct InputPort {
    owner: String,
    field_name: String,
    load_type: LoadType,
    unit: Unit,
    mandatory: bool,
    binding: Option<PortBinding>,
    /// Global value-vector slot of the bound source output; set at freeze.
    pub(crate) slot: Option<usize>,
}

impl InputPort {
    /// Name of the owning component.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Field name, unique among the owner's inputs.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Whether the graph refuses to freeze while this input is unbound.
    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    /// The recorded binding, if any.
    pub fn binding(&self) -> Option<&PortBinding> {
        self.binding.as_ref()
    }

    /// Returns `true` once a binding has been recorded.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }
}

/// A typed output slot on a component.
#[derive(Debug, Clone)]
pub struct OutputPort {
    owner: String,
    field_name: String,
    display_name: String,
    load_type: LoadType,
    unit: Unit,
    description: String,
    /// Global value-vector slot; set at freeze.
    pub(crate) slot: Option<usize>,
}

impl OutputPort {
    /// Name of the owning component.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Field name, unique among the owner's outputs.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Human-readable name used by substring discovery; defaults to the
    /// field name for statically declared outputs.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Ordered input/output port lists of one component.
///
/// Every component owns exactly one `PortSet`. Ports are declared during
/// construction (or, for dynamic components, during the build phase) and the
/// set is frozen before simulation starts. Declaration order is a documented
/// contract: dynamic lookups resolve ties by first match in declaration
/// order.
#[derive(Debug, Clone)]
pub struct PortSet {
    component_name: String,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl PortSet {
    /// Creates an empty port set for the named component.
    pub fn new(component_name: &str) -> Self {
        Self {
            component_name: component_name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Name of the owning component.
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Declares a new input port.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicatePort`] when an input with the same
    /// field name already exists on this component.
    pub fn declare_input(
        &mut self,
        field_name: &str,
        load_type: LoadType,
        unit: Unit,
        mandatory: bool,
    ) -> Result<InputHandle, GraphError> {
        if self.inputs.iter().any(|p| p.field_name == field_name) {
            return Err(GraphError::DuplicatePort {
                component: self.component_name.clone(),
                field: field_name.to_string(),
            });
        }
        self.inputs.push(InputPort {
            owner: self.component_name.clone(),
            field_name: field_name.to_string(),
            load_type,
            unit,
            mandatory,
            binding: None,
            slot: None,
        });
        Ok(InputHandle(self.inputs.len() - 1))
    }

    /// Declares a new output port. The display name equals the field name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicatePort`] when an output with the same
    /// field name already exists on this component.
    pub fn declare_output(
        &mut self,
        field_name: &str,
        load_type: LoadType,
        unit: Unit,
        description: &str,
    ) -> Result<OutputHandle, GraphError> {
        self.declare_output_with_display(field_name, field_name, load_type, unit, description)
    }

    /// Declares an output whose display name differs from its field name.
    /// Used by the dynamic port manager for positionally named outputs.
    pub(crate) fn declare_output_with_display(
        &mut self,
        field_name: &str,
        display_name: &str,
        load_type: LoadType,
        unit: Unit,
        description: &str,
    ) -> Result<OutputHandle, GraphError> {
        if self.outputs.iter().any(|p| p.field_name == field_name) {
            return Err(GraphError::DuplicatePort {
                component: self.component_name.clone(),
                field: field_name.to_string(),
            });
        }
        self.outputs.push(OutputPort {
            owner: self.component_name.clone(),
            field_name: field_name.to_string(),
            display_name: display_name.to_string(),
            load_type,
            unit,
            description: description.to_string(),
            slot: None,
        });
        Ok(OutputHandle(self.outputs.len() - 1))
    }

    /// Records a binding of `input` to the named source output.
    ///
    /// The source component and field do not have to exist yet; resolution
    /// is deferred until the graph is frozen. Re-connecting an input
    /// replaces its previous binding.
    pub fn connect_input(
        &mut self,
        input: InputHandle,
        source_component: &str,
        source_field: &str,
    ) {
        self.inputs[input.0].binding = Some(PortBinding {
            source_component: source_component.to_string(),
            source_field: source_field.to_string(),
        });
    }

    /// Looks up an input handle by field name.
    pub fn input_by_name(&self, field_name: &str) -> Option<InputHandle> {
        self.inputs
            .iter()
            .position(|p| p.field_name == field_name)
            .map(InputHandle)
    }

    /// Looks up an output handle by field name.
    pub fn output_by_name(&self, field_name: &str) -> Option<OutputHandle> {
        self.outputs
            .iter()
            .position(|p| p.field_name == field_name)
            .map(OutputHandle)
    }

    /// Returns the input port behind a handle.
    pub fn input(&self, handle: InputHandle) -> &InputPort {
        &self.inputs[handle.0]
    }

    /// Returns the output port behind a handle.
    pub fn output(&self, handle: OutputHandle) -> &OutputPort {
        &self.outputs[handle.0]
    }

    /// All inputs in declaration order.
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    /// All outputs in declaration order.
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [OutputPort] {
        &mut self.outputs
    }
}
