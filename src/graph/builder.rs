//! Graph assembly and the static wiring resolver.
//!
//! Components are registered into a [`SimulationGraph`], wired by name
//! (explicitly or through their default connections), then frozen.
//! [`SimulationGraph::freeze`] is where all deferred validation happens:
//! default connections are applied, every output gets a global value-vector
//! slot, every binding is resolved against the registered components, and
//! mandatory inputs without a binding fail fast.

use std::collections::HashMap;

use super::component::Component;
use super::error::GraphError;
use super::load::{LoadType, Unit};
use super::port::OutputHandle;

/// Metadata of one value-vector slot, kept for reporting and export.
#[derive(Debug, Clone)]
pub struct SlotInfo {
    /// Name of the component owning the output.
    pub component: String,
    /// Field name of the output.
    pub field: String,
    pub load_type: LoadType,
    pub unit: Unit,
}

impl SlotInfo {
    /// `Component.Field` label used in logs and CSV headers.
    pub fn label(&self) -> String {
        format!("{}.{}", self.component, self.field)
    }
}

/// Builder for a simulation graph.
pub struct SimulationGraph {
    components: Vec<Box<dyn Component>>,
}

impl SimulationGraph {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Registers a component.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateComponent`] when a component with the
    /// same name is already registered.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> Result<(), GraphError> {
        if self
            .components
            .iter()
            .any(|c| c.name() == component.name())
        {
            return Err(GraphError::DuplicateComponent(component.name().to_string()));
        }
        self.components.push(component);
        Ok(())
    }

    /// Explicitly binds `component.field` to `source.source_field`.
    ///
    /// The component and its input field must already be registered; the
    /// source side is validated at freeze time only.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownInput`] when `component` is not
    /// registered or has no input named `field`.
    pub fn connect(
        &mut self,
        component: &str,
        field: &str,
        source: &str,
        source_field: &str,
    ) -> Result<(), GraphError> {
        let target = self
            .components
            .iter_mut()
            .find(|c| c.name() == component)
            .ok_or_else(|| GraphError::UnknownInput {
                component: component.to_string(),
                field: field.to_string(),
            })?;
        let ports = target.port_set_mut();
        let handle = ports
            .input_by_name(field)
            .ok_or_else(|| GraphError::UnknownInput {
                component: component.to_string(),
                field: field.to_string(),
            })?;
        ports.connect_input(handle, source, source_field);
        Ok(())
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Applies default connections, assigns slots, resolves every binding,
    /// and computes the execution order.
    ///
    /// # Errors
    ///
    /// See [`GraphError`]; in particular every mandatory input left unbound
    /// yields [`GraphError::MissingConnection`] naming the offending
    /// component and field.
    pub fn freeze(mut self) -> Result<FrozenGraph, GraphError> {
        self.apply_default_connections()?;

        // Assign a global slot to every output, in registration order.
        let mut slots = Vec::new();
        for component in &mut self.components {
            for output in component.port_set_mut().outputs_mut() {
                output.slot = Some(slots.len());
                slots.push(SlotInfo {
                    component: output.owner().to_string(),
                    field: output.field_name().to_string(),
                    load_type: output.load_type(),
                    unit: output.unit(),
                });
            }
        }

        // Snapshot of every component's outputs for binding resolution.
        struct OutputInfo {
            field: String,
            slot: usize,
            load_type: LoadType,
            unit: Unit,
        }
        let mut outputs_by_component: HashMap<String, Vec<OutputInfo>> = HashMap::new();
        for component in &self.components {
            let infos = component
                .port_set()
                .outputs()
                .iter()
                .map(|o| OutputInfo {
                    field: o.field_name().to_string(),
                    slot: o.slot.expect("slot assigned above"),
                    load_type: o.load_type(),
                    unit: o.unit(),
                })
                .collect();
            outputs_by_component.insert(component.name().to_string(), infos);
        }
        let component_index: HashMap<String, usize> = self
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name().to_string(), i))
            .collect();

        // Resolve bindings and collect dependency edges.
        let count = self.components.len();
        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (index, component) in self.components.iter_mut().enumerate() {
            let name = component.name().to_string();
            for input in component.port_set_mut().inputs_mut() {
                let Some(binding) = input.binding().cloned() else {
                    if input.mandatory() {
                        return Err(GraphError::MissingConnection {
                            component: name,
                            field: input.field_name().to_string(),
                        });
                    }
                    continue;
                };
                let source_outputs = outputs_by_component
                    .get(&binding.source_component)
                    .ok_or_else(|| GraphError::UnknownSourceComponent {
                        component: name.clone(),
                        field: input.field_name().to_string(),
                        source_component: binding.source_component.clone(),
                    })?;
                let output = source_outputs
                    .iter()
                    .find(|o| o.field == binding.source_field)
                    .ok_or_else(|| GraphError::UnknownSourceOutput {
                        component: name.clone(),
                        field: input.field_name().to_string(),
                        source_component: binding.source_component.clone(),
                        source_field: binding.source_field.clone(),
                    })?;
                if !input.load_type().compatible_with(output.load_type) {
                    return Err(GraphError::LoadTypeMismatch {
                        component: name.clone(),
                        field: input.field_name().to_string(),
                        source_component: binding.source_component.clone(),
                        source_field: binding.source_field.clone(),
                        input_kind: format!("{:?}", input.load_type()),
                        output_kind: format!("{:?}", output.load_type),
                    });
                }
                if !input.unit().compatible_with(output.unit) {
                    return Err(GraphError::UnitMismatch {
                        component: name.clone(),
                        field: input.field_name().to_string(),
                        source_component: binding.source_component.clone(),
                        source_field: binding.source_field.clone(),
                        input_unit: input.unit().to_string(),
                        output_unit: output.unit.to_string(),
                    });
                }
                input.slot = Some(output.slot);

                let source_index = component_index[&binding.source_component];
                if source_index != index && !dependencies[index].contains(&source_index) {
                    dependencies[index].push(source_index);
                }
            }
        }

        let order = execution_order(&dependencies);

        Ok(FrozenGraph {
            components: self.components,
            order,
            slots,
        })
    }

    /// Applies every component's default connections to its still-unbound
    /// inputs, in declaration order.
    fn apply_default_connections(&mut self) -> Result<(), GraphError> {
        for component in &mut self.components {
            let defaults = component.default_connections();
            let name = component.name().to_string();
            let ports = component.port_set_mut();
            for default in defaults {
                let handle = ports.input_by_name(&default.input_field).ok_or_else(|| {
                    GraphError::UnknownInput {
                        component: name.clone(),
                        field: default.input_field.clone(),
                    }
                })?;
                // Explicit user wiring wins over the default.
                if ports.input(handle).is_bound() {
                    continue;
                }
                ports.connect_input(handle, &default.source_component, &default.source_field);
            }
        }
        Ok(())
    }
}

impl Default for SimulationGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Dependency-respecting execution order.
///
/// Kahn's algorithm with the lowest registration index first, so the result
/// is deterministic. Components left over after the acyclic part is
/// exhausted form feedback cycles; they are appended in registration order
/// and rely on the engine's convergence iteration.
fn execution_order(dependencies: &[Vec<usize>]) -> Vec<usize> {
    let count = dependencies.len();
    let mut placed = vec![false; count];
    let mut order = Vec::with_capacity(count);

    loop {
        let mut advanced = false;
        for index in 0..count {
            if placed[index] {
                continue;
            }
            let ready = dependencies[index].iter().all(|&dep| placed[dep]);
            if ready {
                placed[index] = true;
                order.push(index);
                advanced = true;
            }
        }
        if !advanced {
            break;
        }
    }
    // Remainder: cyclic subset, registration order.
    for index in 0..count {
        if !placed[index] {
            order.push(index);
        }
    }
    order
}

/// A validated, slot-assigned graph ready for the engine.
pub struct FrozenGraph {
    components: Vec<Box<dyn Component>>,
    order: Vec<usize>,
    slots: Vec<SlotInfo>,
}

impl FrozenGraph {
    /// Components, in registration order.
    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    pub(crate) fn components_mut(&mut self) -> &mut [Box<dyn Component>] {
        &mut self.components
    }

    /// Execution order as component indices into
    /// [`FrozenGraph::components`].
    pub fn execution_order(&self) -> &[usize] {
        &self.order
    }

    /// Number of value-vector slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Metadata of every slot, in slot order.
    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    /// Slot of the named output, when it exists.
    pub fn output_slot(&self, component: &str, field: &str) -> Option<usize> {
        self.components
            .iter()
            .find(|c| c.name() == component)
            .and_then(|c| {
                let ports = c.port_set();
                ports
                    .output_by_name(field)
                    .map(|handle: OutputHandle| ports.output(handle))
            })
            .and_then(|output| output.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_order_is_topological_when_acyclic() {
        // 0 depends on 1, 1 depends on 2.
        let deps = vec![vec![1], vec![2], vec![]];
        assert_eq!(execution_order(&deps), vec![2, 1, 0]);
    }

    #[test]
    fn execution_order_prefers_registration_order_on_ties() {
        let deps = vec![vec![], vec![], vec![0, 1]];
        assert_eq!(execution_order(&deps), vec![0, 1, 2]);
    }

    #[test]
    fn cyclic_remainder_keeps_registration_order() {
        // 0 independent; 1 and 2 form a cycle.
        let deps = vec![vec![], vec![2], vec![1]];
        assert_eq!(execution_order(&deps), vec![0, 1, 2]);
    }
}
