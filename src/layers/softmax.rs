//! Softmax layer

use crate::error::Result;
use crate::layers::validation::validate_positive;
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::Softmax;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoftmaxLayer {
    name: String,
    /// Inputs arrive as plain vectors rather than spatial data.
    vector_format: bool,
    /// Dimension the softmax is taken over; `None` until inferred.
    channel_dim: Option<usize>,
}

impl SoftmaxLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_vector_format(mut self, vector_format: bool) -> Self {
        self.vector_format = vector_format;
        self
    }

    pub fn with_channel_dim(mut self, channel_dim: Option<usize>) -> Result<Self> {
        self.set_channel_dim(channel_dim)?;
        Ok(self)
    }

    pub fn vector_format(&self) -> bool {
        self.vector_format
    }

    pub fn channel_dim(&self) -> Option<usize> {
        self.channel_dim
    }

    pub fn set_channel_dim(&mut self, channel_dim: Option<usize>) -> Result<()> {
        if let Some(dim) = channel_dim {
            validate_positive(KIND, "channel_dim", dim)?;
        }
        self.channel_dim = channel_dim;
        Ok(())
    }
}

impl NetworkLayer for SoftmaxLayer {
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
        "softmax".to_string()
    }
}
