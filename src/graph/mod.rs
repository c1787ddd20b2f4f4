//! The dynamic component-graph core.
//!
//! Components declare typed input/output ports, get wired together by name
//! (statically or through tag-based dynamic discovery), and are executed
//! timestep by timestep against a shared value vector.

pub mod builder;
pub mod cache;
pub mod component;
pub mod dynamic;
pub mod error;
pub mod load;
pub mod port;
pub mod values;

pub use builder::{FrozenGraph, SimulationGraph, SlotInfo};
pub use cache::CalculationCache;
pub use component::{Component, DefaultConnection};
pub use dynamic::{DynamicConnectionInput, DynamicConnectionOutput, DynamicPorts};
pub use error::{GraphError, SimulationError};
pub use load::{LoadType, Tag, TagSet, Unit};
pub use port::{InputHandle, InputPort, OutputHandle, OutputPort, PortSet};
pub use values::StepValues;
