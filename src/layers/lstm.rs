//! LSTM layer
//!
//! Long short-term memory layer over per-time-step features. The four gates
//! (input, forget, cell candidate, output) are stacked along the first
//! dimension of every weight matrix, so with `H` hidden units:
//! - input weights: `[4H, input_size]`
//! - recurrent weights: `[4H, H]`
//! - bias: `[4H, 1]`
//! - cell and hidden state: `[H, 1]`

use crate::error::{LayerStoreError, Result};
use crate::layers::array::{DenseArray, ParameterValue};
use crate::layers::learnable::{Initializer, LearnableParameter};
use crate::layers::validation::{validate_learnable, validate_one_of, validate_positive, validate_shape};
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::Lstm;

/// Whether the layer emits the full sequence or only the last time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Sequence,
    Last,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Sequence => "sequence",
            OutputMode::Last => "last",
        }
    }

    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match validate_one_of(KIND, field, value, &["sequence", "last"])? {
            "sequence" => Ok(OutputMode::Sequence),
            _ => Ok(OutputMode::Last),
        }
    }
}

/// Activation applied to the cell and hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateActivation {
    #[default]
    Tanh,
    Softsign,
}

impl StateActivation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateActivation::Tanh => "tanh",
            StateActivation::Softsign => "softsign",
        }
    }

    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match validate_one_of(KIND, field, value, &["tanh", "softsign"])? {
            "tanh" => Ok(StateActivation::Tanh),
            _ => Ok(StateActivation::Softsign),
        }
    }
}

/// Activation applied to the gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateActivation {
    #[default]
    Sigmoid,
    HardSigmoid,
}

impl GateActivation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateActivation::Sigmoid => "sigmoid",
            GateActivation::HardSigmoid => "hard-sigmoid",
        }
    }

    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match validate_one_of(KIND, field, value, &["sigmoid", "hard-sigmoid"])? {
            "sigmoid" => Ok(GateActivation::Sigmoid),
            _ => Ok(GateActivation::HardSigmoid),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LstmLayer {
    name: String,
    input_size: Option<usize>,
    num_hidden_units: usize,
    output_mode: OutputMode,
    state_activation: StateActivation,
    gate_activation: GateActivation,
    input_weights: LearnableParameter,
    recurrent_weights: LearnableParameter,
    bias: LearnableParameter,
    cell_state: DenseArray,
    hidden_state: DenseArray,
    has_state_inputs: bool,
    has_state_outputs: bool,
}

impl LstmLayer {
    /// Create a layer with `num_hidden_units` hidden units.
    ///
    /// Input weights use Glorot, recurrent weights orthogonal and the bias
    /// unit-forget-gate initialization.
    pub fn new(num_hidden_units: usize) -> Result<Self> {
        validate_positive(KIND, "num_hidden_units", num_hidden_units)?;
        Ok(Self {
            name: String::new(),
            input_size: None,
            num_hidden_units,
            output_mode: OutputMode::default(),
            state_activation: StateActivation::default(),
            gate_activation: GateActivation::default(),
            input_weights: LearnableParameter::new(Initializer::glorot()),
            recurrent_weights: LearnableParameter::new(Initializer::orthogonal()),
            bias: LearnableParameter::new(Initializer::unit_forget_gate())
                .with_regularization_factor(0.0),
            cell_state: DenseArray::empty(),
            hidden_state: DenseArray::empty(),
            has_state_inputs: false,
            has_state_outputs: false,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn input_size(&self) -> Option<usize> {
        self.input_size
    }

    pub fn num_hidden_units(&self) -> usize {
        self.num_hidden_units
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn state_activation(&self) -> StateActivation {
        self.state_activation
    }

    pub fn gate_activation(&self) -> GateActivation {
        self.gate_activation
    }

    pub fn input_weights(&self) -> &LearnableParameter {
        &self.input_weights
    }

    pub fn recurrent_weights(&self) -> &LearnableParameter {
        &self.recurrent_weights
    }

    pub fn bias(&self) -> &LearnableParameter {
        &self.bias
    }

    pub fn cell_state(&self) -> &DenseArray {
        &self.cell_state
    }

    pub fn hidden_state(&self) -> &DenseArray {
        &self.hidden_state
    }

    pub fn has_state_inputs(&self) -> bool {
        self.has_state_inputs
    }

    pub fn has_state_outputs(&self) -> bool {
        self.has_state_outputs
    }

    fn gates(&self) -> usize {
        4 * self.num_hidden_units
    }

    pub fn set_input_size(&mut self, input_size: Option<usize>) -> Result<()> {
        if let Some(size) = input_size {
            validate_positive(KIND, "input_size", size)?;
        }
        validate_shape(
            KIND,
            "input_weights.value",
            &self.input_weights.value,
            &[Some(self.gates()), input_size],
        )?;
        self.input_size = input_size;
        Ok(())
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn set_state_activation(&mut self, activation: StateActivation) {
        self.state_activation = activation;
    }

    pub fn set_gate_activation(&mut self, activation: GateActivation) {
        self.gate_activation = activation;
    }

    /// Replace the input weights. An automatic input size is inferred from them.
    pub fn set_input_weights(&mut self, weights: LearnableParameter) -> Result<()> {
        validate_learnable(
            KIND,
            "input_weights",
            &weights,
            &[Some(self.gates()), self.input_size],
        )?;
        if self.input_size.is_none() && weights.is_initialized() {
            self.input_size = Some(weights.value.shape()[1]);
        }
        self.input_weights = weights;
        Ok(())
    }

    pub fn set_recurrent_weights(&mut self, weights: LearnableParameter) -> Result<()> {
        validate_learnable(
            KIND,
            "recurrent_weights",
            &weights,
            &[Some(self.gates()), Some(self.num_hidden_units)],
        )?;
        self.recurrent_weights = weights;
        Ok(())
    }

    pub fn set_bias(&mut self, bias: LearnableParameter) -> Result<()> {
        validate_learnable(KIND, "bias", &bias, &[Some(self.gates()), Some(1)])?;
        self.bias = bias;
        Ok(())
    }

    /// Set the cell state. The value is materialized in host memory.
    pub fn set_cell_state(&mut self, value: impl Into<ParameterValue>) -> Result<()> {
        self.cell_state = self.check_state("cell_state", value.into())?;
        Ok(())
    }

    /// Set the hidden state. The value is materialized in host memory.
    pub fn set_hidden_state(&mut self, value: impl Into<ParameterValue>) -> Result<()> {
        self.hidden_state = self.check_state("hidden_state", value.into())?;
        Ok(())
    }

    fn check_state(&self, field: &str, value: ParameterValue) -> Result<DenseArray> {
        validate_shape(KIND, field, &value, &[Some(self.num_hidden_units), Some(1)])?;
        let array = value.into_host_dense();
        if array.data().iter().any(|v| !v.is_finite()) {
            return Err(LayerStoreError::validation(KIND, field, "must be finite"));
        }
        Ok(array)
    }

    pub fn set_has_state_inputs(&mut self, enabled: bool) {
        self.has_state_inputs = enabled;
    }

    pub fn set_has_state_outputs(&mut self, enabled: bool) {
        self.has_state_outputs = enabled;
    }
}

impl NetworkLayer for LstmLayer {
    fn kind(&self) -> LayerKind {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn description(&self) -> String {
        format!("LSTM with {} hidden units", self.num_hidden_units)
    }
}
