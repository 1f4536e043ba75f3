//! Fully connected layer
//!
//! Multiplies the input by a weight matrix of shape `[output_size, input_size]`
//! and adds a bias column of shape `[output_size, 1]`.

use crate::error::Result;
use crate::layers::learnable::{Initializer, LearnableParameter};
use crate::layers::validation::{validate_learnable, validate_positive};
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::FullyConnected;

#[derive(Debug, Clone, PartialEq)]
pub struct FullyConnectedLayer {
    name: String,
    /// `None` until inferred from the incoming layer or from the weights.
    input_size: Option<usize>,
    output_size: usize,
    weights: LearnableParameter,
    bias: LearnableParameter,
}

impl FullyConnectedLayer {
    /// Create a layer with `output_size` outputs.
    ///
    /// Weights default to Glorot initialization, the bias to zeros with no
    /// L2 regularization.
    pub fn new(output_size: usize) -> Result<Self> {
        validate_positive(KIND, "output_size", output_size)?;
        Ok(Self {
            name: String::new(),
            input_size: None,
            output_size,
            weights: LearnableParameter::new(Initializer::glorot()),
            bias: LearnableParameter::new(Initializer::zeros()).with_regularization_factor(0.0),
        })
    }

    /// Assemble a layer from already-decoded parts, validating all of them.
    pub fn from_parts(
        name: String,
        input_size: Option<usize>,
        output_size: usize,
        weights: LearnableParameter,
        bias: LearnableParameter,
    ) -> Result<Self> {
        let mut layer = Self::new(output_size)?;
        layer.name = name;
        if let Some(size) = input_size {
            layer.input_size = Some(validate_positive(KIND, "input_size", size)?);
        }
        layer.set_weights(weights)?;
        layer.set_bias(bias)?;
        Ok(layer)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_input_size(mut self, input_size: usize) -> Result<Self> {
        self.input_size = Some(validate_positive(KIND, "input_size", input_size)?);
        validate_learnable(KIND, "weights", &self.weights, &self.weight_shape())?;
        Ok(self)
    }

    pub fn input_size(&self) -> Option<usize> {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn weights(&self) -> &LearnableParameter {
        &self.weights
    }

    pub fn bias(&self) -> &LearnableParameter {
        &self.bias
    }

    fn weight_shape(&self) -> [Option<usize>; 2] {
        [Some(self.output_size), self.input_size]
    }

    /// Replace the weights. An automatic input size is inferred from them.
    pub fn set_weights(&mut self, weights: LearnableParameter) -> Result<()> {
        validate_learnable(KIND, "weights", &weights, &self.weight_shape())?;
        if self.input_size.is_none() && weights.is_initialized() {
            self.input_size = Some(weights.value.shape()[1]);
        }
        self.weights = weights;
        Ok(())
    }

    pub fn set_bias(&mut self, bias: LearnableParameter) -> Result<()> {
        validate_learnable(KIND, "bias", &bias, &[Some(self.output_size), Some(1)])?;
        self.bias = bias;
        Ok(())
    }
}

impl NetworkLayer for FullyConnectedLayer {
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
        format!("{} fully connected layer", self.output_size)
    }
}
