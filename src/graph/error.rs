//! Error taxonomy for graph construction and simulation.

use thiserror::Error;

/// Configuration-time errors raised while building or freezing a graph.
///
/// These are fatal and surface immediately to the caller of graph
/// construction; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A component declared two ports with the same field name in the same
    /// direction.
    #[error("component \"{component}\" already declares a port named \"{field}\"")]
    DuplicatePort { component: String, field: String },

    /// Two components were registered under the same name.
    #[error("a component named \"{0}\" is already registered")]
    DuplicateComponent(String),

    /// A connection referenced an input field the component does not declare.
    #[error("component \"{component}\" has no input named \"{field}\"")]
    UnknownInput { component: String, field: String },

    /// A mandatory input was left unbound at freeze time.
    #[error("mandatory input \"{component}.{field}\" is not connected")]
    MissingConnection { component: String, field: String },

    /// An input binding named a source component that is not registered.
    #[error(
        "input \"{component}.{field}\" is bound to unknown component \"{source_component}\""
    )]
    UnknownSourceComponent {
        component: String,
        field: String,
        source_component: String,
    },

    /// An input binding named an output the source component does not have.
    #[error(
        "input \"{component}.{field}\" is bound to \"{source_component}.{source_field}\", \
         but \"{source_component}\" has no such output"
    )]
    UnknownSourceOutput {
        component: String,
        field: String,
        source_component: String,
        source_field: String,
    },

    /// Input and source output carry incompatible load types.
    #[error(
        "input \"{component}.{field}\" ({input_kind}) is bound to \
         \"{source_component}.{source_field}\" ({output_kind}): load types do not match"
    )]
    LoadTypeMismatch {
        component: String,
        field: String,
        source_component: String,
        source_field: String,
        input_kind: String,
        output_kind: String,
    },

    /// Input and source output carry incompatible units.
    #[error(
        "input \"{component}.{field}\" [{input_unit}] is bound to \
         \"{source_component}.{source_field}\" [{output_unit}]: units do not match"
    )]
    UnitMismatch {
        component: String,
        field: String,
        source_component: String,
        source_field: String,
        input_unit: String,
        output_unit: String,
    },

    /// `add_input_and_connect` named an output display name the source does
    /// not expose.
    #[error("component \"{component}\" has no output with display name \"{name}\"")]
    NoMatchingOutput { component: String, name: String },
}

/// Runtime errors raised during `i_simulate`.
///
/// These indicate a programming or configuration defect, not a transient
/// condition; the engine aborts the whole run rather than retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// An on/off signal input carried a value outside {-1, 0, 1}.
    #[error("component \"{component}\": unknown on/off signal value {value}")]
    UnknownOnOffSignal { component: String, value: f32 },

    /// A component reached an internal mode its state machine does not know.
    #[error("component \"{component}\": invalid state \"{state}\"")]
    InvalidState { component: String, state: String },

    /// Two writes landed on the same output slot within one simulation pass.
    #[error("output \"{output}\" was written twice within one pass")]
    DoubleWrite { output: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_connection_names_component_and_field() {
        let err = GraphError::MissingConnection {
            component: "HeatPump".to_string(),
            field: "OnOffSignal".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("HeatPump"));
        assert!(msg.contains("OnOffSignal"));
    }

    #[test]
    fn unknown_signal_names_value() {
        let err = SimulationError::UnknownOnOffSignal {
            component: "HeatPump".to_string(),
            value: 2.0,
        };
        assert!(err.to_string().contains('2'));
    }
}
