//! The shared per-timestep value vector.

use super::port::{InputPort, OutputPort};

/// Shared value vector for one timestep.
///
/// Every output port of the frozen graph owns exactly one slot. Components
/// write their outputs and read their bound inputs through this vector
/// during `i_simulate`. Values persist across passes and timesteps: a
/// component that does not write during a pass leaves its previous value in
/// place.
///
/// Write tracking enforces the single-writer invariant per pass: the engine
/// calls [`StepValues::begin_pass`] before each pass and checks
/// [`StepValues::double_written_slots`] afterwards.
#[derive(Debug, Clone)]
pub struct StepValues {
    values: Vec<f32>,
    write_counts: Vec<u8>,
}

impl StepValues {
    /// Creates a zero-initialized value vector with `len` slots.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
            write_counts: vec![0; len],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the vector has no slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads the value of the output bound to `input`.
    ///
    /// # Panics
    ///
    /// Panics when the input is unbound. The wiring resolver guarantees a
    /// slot for every mandatory input; optional inputs must be read through
    /// [`StepValues::get_optional_input_value`].
    pub fn get_input_value(&self, input: &InputPort) -> f32 {
        match input.slot {
            Some(slot) => self.values[slot],
            None => panic!(
                "input \"{}.{}\" is read but not bound",
                input.owner(),
                input.field_name()
            ),
        }
    }

    /// Reads the value of the output bound to `input`, or `None` when the
    /// (optional) input is unbound.
    pub fn get_optional_input_value(&self, input: &InputPort) -> Option<f32> {
        input.slot.map(|slot| self.values[slot])
    }

    /// Writes `value` into the slot owned by `output`.
    ///
    /// # Panics
    ///
    /// Panics when the output has no slot, i.e. the graph was not frozen.
    pub fn set_output_value(&mut self, output: &OutputPort, value: f32) {
        match output.slot {
            Some(slot) => {
                self.values[slot] = value;
                self.write_counts[slot] = self.write_counts[slot].saturating_add(1);
            }
            None => panic!(
                "output \"{}.{}\" is written before the graph was frozen",
                output.owner(),
                output.field_name()
            ),
        }
    }

    /// Reads a slot directly. Used by the engine and by result recording.
    pub fn slot_value(&self, slot: usize) -> f32 {
        self.values[slot]
    }

    /// The raw slot values in slot order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Clears per-pass write tracking. Called by the engine before each pass.
    pub fn begin_pass(&mut self) {
        self.write_counts.fill(0);
    }

    /// Slots written more than once since the last [`StepValues::begin_pass`].
    pub fn double_written_slots(&self) -> Vec<usize> {
        self.write_counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 1)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Largest absolute difference against another snapshot of equal length.
    pub fn max_abs_delta(&self, other: &[f32]) -> f32 {
        self.values
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}
