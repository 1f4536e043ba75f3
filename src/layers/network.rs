//! Ordered layer stack.

use std::collections::HashSet;

use crate::error::{LayerStoreError, Result};
use crate::layers::{
    ClassificationLayer, DropoutLayer, FullyConnectedLayer, Layer, LstmLayer, NetworkLayer,
    OutputMode, SequenceInputLayer, SoftmaxLayer,
};

/// Layers in evaluation order. Names are unique; unnamed layers are assigned
/// `<kind>_<n>` when added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let mut network = Self::new();
        for layer in layers {
            network.push(layer)?;
        }
        Ok(network)
    }

    /// LSTM sequence-to-label classifier over per-time-step morphology features.
    ///
    /// sequence input -> LSTM (last output) -> dropout -> fully connected
    /// -> softmax -> classification
    pub fn liver_stage_classifier(
        num_features: usize,
        num_hidden_units: usize,
        classes: Vec<String>,
        dropout: f64,
    ) -> Result<Self> {
        let num_classes = classes.len();
        Self::from_layers(vec![
            SequenceInputLayer::new(vec![num_features])?
                .with_name("sequence")
                .into(),
            LstmLayer::new(num_hidden_units)?
                .with_name("lstm")
                .with_output_mode(OutputMode::Last)
                .into(),
            DropoutLayer::new(dropout)?.with_name("dropout").into(),
            FullyConnectedLayer::new(num_classes)?.with_name("fc").into(),
            SoftmaxLayer::new().with_name("softmax").into(),
            ClassificationLayer::with_classes(classes)?
                .with_name("classoutput")
                .into(),
        ])
    }

    /// Append a layer, generating a name if it has none.
    pub fn push(&mut self, layer: impl Into<Layer>) -> Result<()> {
        let mut layer = layer.into();
        let names: HashSet<&str> = self.layers.iter().map(|l| l.name()).collect();

        if layer.name().is_empty() {
            let prefix = layer.kind().as_str();
            let mut n = 1;
            while names.contains(format!("{}_{}", prefix, n).as_str()) {
                n += 1;
            }
            layer.set_name(format!("{}_{}", prefix, n));
        } else if names.contains(layer.name()) {
            return Err(LayerStoreError::validation(
                layer.kind(),
                "name",
                format!("duplicate layer name '{}'", layer.name()),
            ));
        }

        self.layers.push(layer);
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerKind;

    #[test]
    fn test_classifier_architecture() {
        let classes = vec!["arrested".to_string(), "developing".to_string()];
        let network = Network::liver_stage_classifier(17, 100, classes, 0.2).unwrap();
        let kinds: Vec<LayerKind> = network.layers().iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, LayerKind::ALL.to_vec());

        match &network.layers()[3] {
            Layer::FullyConnected(fc) => assert_eq!(fc.output_size(), 2),
            other => panic!("expected fully connected layer, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_unnamed_layers_get_generated_names() {
        let mut network = Network::new();
        network.push(SoftmaxLayer::new()).unwrap();
        network.push(SoftmaxLayer::new()).unwrap();
        let names: Vec<&str> = network.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["softmax_1", "softmax_2"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut network = Network::new();
        network.push(SoftmaxLayer::new().with_name("out")).unwrap();
        let err = network
            .push(DropoutLayer::default().with_name("out"))
            .unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(network.len(), 1);
    }
}
