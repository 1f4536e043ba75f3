//! Layer Model Module
//!
//! Live configurations for the layers of the liver-stage classifier:
//! - Sequence input (per-time-step morphological features)
//! - LSTM
//! - Dropout
//! - Fully connected
//! - Softmax
//! - Classification output
//!
//! Layers hold hyperparameters and learnable parameters only. Every property
//! is validated on construction and on every setter.

mod array;
mod classification;
mod dropout;
mod fully_connected;
mod learnable;
mod lstm;
mod network;
mod sequence_input;
mod softmax;
pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use array::{DenseArray, ParameterValue, SparseArray};
pub use classification::ClassificationLayer;
pub use dropout::DropoutLayer;
pub use fully_connected::FullyConnectedLayer;
pub use learnable::{Initializer, LearnableParameter};
pub use lstm::{GateActivation, LstmLayer, OutputMode, StateActivation};
pub use network::Network;
pub use sequence_input::{Normalization, NormalizationDimension, SequenceInputLayer};
pub use softmax::SoftmaxLayer;

/// Identifies which layer type produced a record.
///
/// Each kind carries its own schema version lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    SequenceInput,
    FullyConnected,
    Lstm,
    Softmax,
    Dropout,
    Classification,
}

impl LayerKind {
    /// Every layer kind, in network order of the liver-stage classifier.
    pub const ALL: [LayerKind; 6] = [
        LayerKind::SequenceInput,
        LayerKind::Lstm,
        LayerKind::Dropout,
        LayerKind::FullyConnected,
        LayerKind::Softmax,
        LayerKind::Classification,
    ];

    /// Identifier used in records and for generated layer names.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::SequenceInput => "sequence_input",
            LayerKind::FullyConnected => "fully_connected",
            LayerKind::Lstm => "lstm",
            LayerKind::Softmax => "softmax",
            LayerKind::Dropout => "dropout",
            LayerKind::Classification => "classification",
        }
    }

    /// Human-readable type label for display.
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::SequenceInput => "Sequence Input",
            LayerKind::FullyConnected => "Fully Connected",
            LayerKind::Lstm => "LSTM",
            LayerKind::Softmax => "Softmax",
            LayerKind::Dropout => "Dropout",
            LayerKind::Classification => "Classification Output",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::SequenceInput => "SequenceInput",
            LayerKind::FullyConnected => "FullyConnected",
            LayerKind::Lstm => "Lstm",
            LayerKind::Softmax => "Softmax",
            LayerKind::Dropout => "Dropout",
            LayerKind::Classification => "Classification",
        };
        f.write_str(name)
    }
}

/// Common surface of every live layer.
pub trait NetworkLayer {
    /// Get the layer kind
    fn kind(&self) -> LayerKind;

    /// Get the layer name (may be empty)
    fn name(&self) -> &str;

    /// Set the layer name
    fn set_name(&mut self, name: String);

    /// One-line description for display
    fn description(&self) -> String;

    /// Type label for display
    fn type_label(&self) -> &'static str {
        self.kind().label()
    }
}

/// Any live layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    SequenceInput(SequenceInputLayer),
    FullyConnected(FullyConnectedLayer),
    Lstm(LstmLayer),
    Softmax(SoftmaxLayer),
    Dropout(DropoutLayer),
    Classification(ClassificationLayer),
}

impl Layer {
    fn as_layer(&self) -> &dyn NetworkLayer {
        match self {
            Layer::SequenceInput(layer) => layer,
            Layer::FullyConnected(layer) => layer,
            Layer::Lstm(layer) => layer,
            Layer::Softmax(layer) => layer,
            Layer::Dropout(layer) => layer,
            Layer::Classification(layer) => layer,
        }
    }

    fn as_layer_mut(&mut self) -> &mut dyn NetworkLayer {
        match self {
            Layer::SequenceInput(layer) => layer,
            Layer::FullyConnected(layer) => layer,
            Layer::Lstm(layer) => layer,
            Layer::Softmax(layer) => layer,
            Layer::Dropout(layer) => layer,
            Layer::Classification(layer) => layer,
        }
    }
}

impl NetworkLayer for Layer {
    fn kind(&self) -> LayerKind {
        self.as_layer().kind()
    }

    fn name(&self) -> &str {
        self.as_layer().name()
    }

    fn set_name(&mut self, name: String) {
        self.as_layer_mut().set_name(name);
    }

    fn description(&self) -> String {
        self.as_layer().description()
    }
}

macro_rules! impl_from_layer {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Layer {
                fn from(layer: $ty) -> Self {
                    Layer::$variant(layer)
                }
            }
        )*
    };
}

impl_from_layer! {
    SequenceInput => SequenceInputLayer,
    FullyConnected => FullyConnectedLayer,
    Lstm => LstmLayer,
    Softmax => SoftmaxLayer,
    Dropout => DropoutLayer,
    Classification => ClassificationLayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(LayerKind::FullyConnected).unwrap();
        assert_eq!(json, serde_json::json!("fully_connected"));
        let kind: LayerKind = serde_json::from_value(serde_json::json!("lstm")).unwrap();
        assert_eq!(kind, LayerKind::Lstm);
    }

    #[test]
    fn test_kind_identifiers_match_serde() {
        for kind in LayerKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json.as_str(), Some(kind.as_str()));
        }
    }

    #[test]
    fn test_layer_enum_delegates() {
        let mut layer: Layer = DropoutLayer::new(0.2).unwrap().into();
        assert_eq!(layer.kind(), LayerKind::Dropout);
        assert_eq!(layer.type_label(), "Dropout");
        layer.set_name("drop".to_string());
        assert_eq!(layer.name(), "drop");
        assert!(layer.description().contains("0.2"));
    }
}
