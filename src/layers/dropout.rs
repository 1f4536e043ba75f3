//! Dropout layer

use crate::error::Result;
use crate::layers::validation::validate_probability;
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::Dropout;

/// Default probability of dropping an input element.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct DropoutLayer {
    name: String,
    probability: f64,
}

impl Default for DropoutLayer {
    fn default() -> Self {
        Self {
            name: String::new(),
            probability: DEFAULT_PROBABILITY,
        }
    }
}

impl DropoutLayer {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            name: String::new(),
            probability: validate_probability(KIND, "probability", probability)?,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_probability(&mut self, probability: f64) -> Result<()> {
        self.probability = validate_probability(KIND, "probability", probability)?;
        Ok(())
    }
}

impl NetworkLayer for DropoutLayer {
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
        format!("dropout with probability {}", self.probability)
    }
}
