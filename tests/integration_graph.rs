//! Static wiring, freeze-time validation, and value propagation.

mod common;

use common::{ConstantSource, Relay, hourly_params};
use hes_sim::graph::{
    Component, DefaultConnection, GraphError, LoadType, PortSet, SimulationError, SimulationGraph,
    StepValues, Unit,
};
use hes_sim::sim::engine::Engine;

#[test]
fn output_value_reaches_bound_input_in_same_pass() {
    // A declares Output "X"; B's mandatory input "Y" reads it in one pass.
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Electricity, Unit::Watt, 5.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Electricity, Unit::Watt).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "X").unwrap();

    let frozen = graph.freeze().unwrap();
    let mut engine = Engine::new(frozen, hourly_params());
    let results = engine.run().unwrap();

    assert_eq!(results.series("B", Relay::OUTPUT).unwrap()[0], 5.0);
}

#[test]
fn freeze_fails_on_unbound_mandatory_input() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Electricity, Unit::Watt).unwrap(),
        ))
        .unwrap();

    let err = graph.freeze().err().expect("freeze must fail");
    assert_eq!(
        err,
        GraphError::MissingConnection {
            component: "B".to_string(),
            field: Relay::INPUT.to_string(),
        }
    );
}

#[test]
fn freeze_succeeds_once_all_mandatory_inputs_are_bound() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Electricity, Unit::Watt, 1.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Electricity, Unit::Watt).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "X").unwrap();
    assert!(graph.freeze().is_ok());
}

#[test]
fn duplicate_component_names_are_rejected() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Any, Unit::Any, 1.0).unwrap(),
        ))
        .unwrap();
    let err = graph.add_component(Box::new(
        ConstantSource::new("A", "Y", LoadType::Any, Unit::Any, 2.0).unwrap(),
    ));
    assert_eq!(err, Err(GraphError::DuplicateComponent("A".to_string())));
}

#[test]
fn binding_to_unknown_source_component_fails_at_freeze() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Any, Unit::Any).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "Ghost", "X").unwrap();

    let err = graph.freeze().err().expect("freeze must fail");
    assert!(matches!(err, GraphError::UnknownSourceComponent { source_component, .. } if source_component == "Ghost"));
}

#[test]
fn binding_to_unknown_source_output_fails_at_freeze() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Any, Unit::Any, 1.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Any, Unit::Any).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "NoSuchField").unwrap();

    let err = graph.freeze().err().expect("freeze must fail");
    assert!(
        matches!(err, GraphError::UnknownSourceOutput { source_field, .. } if source_field == "NoSuchField")
    );
}

#[test]
fn load_type_mismatch_fails_at_freeze() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Heating, Unit::Watt, 1.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Electricity, Unit::Watt).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "X").unwrap();

    let err = graph.freeze().err().expect("freeze must fail");
    assert!(matches!(err, GraphError::LoadTypeMismatch { .. }));
}

#[test]
fn unit_mismatch_fails_at_freeze() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Temperature, Unit::Celsius, 1.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Temperature, Unit::Watt).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "X").unwrap();

    let err = graph.freeze().err().expect("freeze must fail");
    assert!(matches!(err, GraphError::UnitMismatch { .. }));
}

/// Relay variant advertising a default connection to `DefaultSource.X`.
struct RelayWithDefault {
    inner: Relay,
}

impl Component for RelayWithDefault {
    fn port_set(&self) -> &PortSet {
        self.inner.port_set()
    }
    fn port_set_mut(&mut self) -> &mut PortSet {
        self.inner.port_set_mut()
    }
    fn default_connections(&self) -> Vec<DefaultConnection> {
        vec![DefaultConnection::new(Relay::INPUT, "DefaultSource", "X")]
    }
    fn i_simulate(
        &mut self,
        timestep: usize,
        values: &mut StepValues,
        force_convergence: bool,
    ) -> Result<(), SimulationError> {
        self.inner.i_simulate(timestep, values, force_convergence)
    }
    fn i_save_state(&mut self) {
        self.inner.i_save_state();
    }
    fn i_restore_state(&mut self) {
        self.inner.i_restore_state();
    }
}

#[test]
fn default_connection_applies_when_user_left_input_unbound() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("DefaultSource", "X", LoadType::Any, Unit::Any, 7.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(RelayWithDefault {
            inner: Relay::new("B", LoadType::Any, Unit::Any).unwrap(),
        }))
        .unwrap();

    let frozen = graph.freeze().unwrap();
    let mut engine = Engine::new(frozen, hourly_params());
    let results = engine.run().unwrap();
    assert_eq!(results.series("B", Relay::OUTPUT).unwrap()[0], 7.0);
}

#[test]
fn explicit_connection_wins_over_default() {
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            ConstantSource::new("DefaultSource", "X", LoadType::Any, Unit::Any, 7.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            ConstantSource::new("Explicit", "X", LoadType::Any, Unit::Any, 9.0).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(RelayWithDefault {
            inner: Relay::new("B", LoadType::Any, Unit::Any).unwrap(),
        }))
        .unwrap();
    graph.connect("B", Relay::INPUT, "Explicit", "X").unwrap();

    let frozen = graph.freeze().unwrap();
    let mut engine = Engine::new(frozen, hourly_params());
    let results = engine.run().unwrap();
    assert_eq!(results.series("B", Relay::OUTPUT).unwrap()[0], 9.0);
}

#[test]
fn execution_order_respects_dependencies_regardless_of_registration() {
    // Chain C <- B <- A registered backwards.
    let mut graph = SimulationGraph::new();
    graph
        .add_component(Box::new(
            Relay::new("C", LoadType::Any, Unit::Any).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            Relay::new("B", LoadType::Any, Unit::Any).unwrap(),
        ))
        .unwrap();
    graph
        .add_component(Box::new(
            ConstantSource::new("A", "X", LoadType::Any, Unit::Any, 3.0).unwrap(),
        ))
        .unwrap();
    graph.connect("B", Relay::INPUT, "A", "X").unwrap();
    graph.connect("C", Relay::INPUT, "B", Relay::OUTPUT).unwrap();

    let frozen = graph.freeze().unwrap();
    // A (index 2) first, then B (1), then C (0).
    assert_eq!(frozen.execution_order(), &[2, 1, 0]);

    let mut engine = Engine::new(frozen, hourly_params());
    let results = engine.run().unwrap();
    assert_eq!(results.series("C", Relay::OUTPUT).unwrap()[0], 3.0);
}
