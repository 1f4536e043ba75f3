//! LSTM record layout.
//!
//! | version | change |
//! |---|---|
//! | 2 | `cell_state` and `output_state` wrapped as `{"value": ...}`; `output_state` renamed `hidden_state`, `output_size` renamed `num_hidden_units` |
//! | 3 | `state_activation_function = "tanh"`, `gate_activation_function = "sigmoid"` |
//! | 4 | initializers: narrow-normal input and recurrent weights, unit-forget-gate bias |
//! | 5 | `has_state_inputs = false`, `has_state_outputs = false` |

use serde_json::json;

use crate::error::Result;
use crate::layers::{
    GateActivation, Initializer, LayerKind, LstmLayer, NetworkLayer, OutputMode, StateActivation,
};
use crate::state::migration::KindSchema;
use crate::state::record::LayerRecord;
use crate::state::schema::{
    decode_learnable, decode_state, default_initializer, encode_learnable, encode_state,
};

pub const CURRENT_VERSION: u32 = 5;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::Lstm,
    current_version: CURRENT_VERSION,
    steps: &[v1_to_v2, v2_to_v3, v3_to_v4, v4_to_v5],
    fields: &[
        "name",
        "input_size",
        "num_hidden_units",
        "output_mode",
        "state_activation_function",
        "gate_activation_function",
        "input_weights",
        "recurrent_weights",
        "bias",
        "cell_state",
        "hidden_state",
        "has_state_inputs",
        "has_state_outputs",
    ],
};

fn v1_to_v2(record: LayerRecord) -> Result<LayerRecord> {
    let mut record = record.rename("output_size", "num_hidden_units")?;
    let cell_state = record.take("cell_state")?;
    let hidden_state = record.take("output_state")?;
    Ok(record
        .with("cell_state", json!({ "value": cell_state }))
        .with("hidden_state", json!({ "value": hidden_state })))
}

fn v2_to_v3(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record
        .with_default("state_activation_function", "tanh")
        .with_default("gate_activation_function", "sigmoid"))
}

fn v3_to_v4(record: LayerRecord) -> Result<LayerRecord> {
    let record = default_initializer(record, "input_weights", Initializer::narrow_normal())?;
    let record = default_initializer(record, "recurrent_weights", Initializer::narrow_normal())?;
    default_initializer(record, "bias", Initializer::unit_forget_gate())
}

fn v4_to_v5(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record
        .with_default("has_state_inputs", false)
        .with_default("has_state_outputs", false))
}

pub fn encode(layer: &LstmLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::Lstm, CURRENT_VERSION)
        .with("name", layer.name())
        .with("input_size", layer.input_size())
        .with("num_hidden_units", layer.num_hidden_units())
        .with("output_mode", layer.output_mode().as_str())
        .with("state_activation_function", layer.state_activation().as_str())
        .with("gate_activation_function", layer.gate_activation().as_str())
        .with("input_weights", encode_learnable(layer.input_weights()))
        .with("recurrent_weights", encode_learnable(layer.recurrent_weights()))
        .with("bias", encode_learnable(layer.bias()))
        .with("cell_state", encode_state(layer.cell_state()))
        .with("hidden_state", encode_state(layer.hidden_state()))
        .with("has_state_inputs", layer.has_state_inputs())
        .with("has_state_outputs", layer.has_state_outputs())
}

/// Scalar settings are applied before the weights so that shapes are checked
/// against the recorded sizes.
pub fn decode(record: &LayerRecord) -> Result<LstmLayer> {
    let mut layer = LstmLayer::new(record.read_usize("num_hidden_units")?)?
        .with_name(&record.read_name()?);

    layer.set_input_size(record.read_opt_usize("input_size")?)?;
    layer.set_output_mode(OutputMode::parse("output_mode", record.read_str("output_mode")?)?);
    layer.set_state_activation(StateActivation::parse(
        "state_activation_function",
        record.read_str("state_activation_function")?,
    )?);
    layer.set_gate_activation(GateActivation::parse(
        "gate_activation_function",
        record.read_str("gate_activation_function")?,
    )?);

    layer.set_input_weights(decode_learnable(record, "input_weights")?)?;
    layer.set_recurrent_weights(decode_learnable(record, "recurrent_weights")?)?;
    layer.set_bias(decode_learnable(record, "bias")?)?;
    layer.set_cell_state(decode_state(record, "cell_state")?)?;
    layer.set_hidden_state(decode_state(record, "hidden_state")?)?;

    layer.set_has_state_inputs(record.read_bool("has_state_inputs")?);
    layer.set_has_state_outputs(record.read_bool("has_state_outputs")?);
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::migration::upgrade_record;
    use pretty_assertions::assert_eq;

    fn host(shape: &[usize], data: &[f32]) -> serde_json::Value {
        json!({"storage": "host", "shape": shape, "data": data})
    }

    fn learnable(shape: &[usize], data: &[f32]) -> serde_json::Value {
        json!({"value": host(shape, data), "learn_rate_factor": 1.0, "regularization_factor": 1.0})
    }

    fn v1_record() -> LayerRecord {
        LayerRecord::new(LayerKind::Lstm, 1)
            .with("name", "lstm")
            .with("input_size", 1)
            .with("output_size", 1)
            .with("output_mode", "last")
            .with("input_weights", learnable(&[4, 1], &[0.1, 0.2, 0.3, 0.4]))
            .with("recurrent_weights", learnable(&[4, 1], &[0.5, 0.6, 0.7, 0.8]))
            .with("bias", learnable(&[4, 1], &[0.0, 1.0, 0.0, 0.0]))
            .with("cell_state", host(&[1, 1], &[0.25]))
            .with("output_state", host(&[1, 1], &[-0.25]))
    }

    #[test]
    fn test_v1_to_v2_restructures_state() {
        let record = v1_to_v2(v1_record()).unwrap();
        assert!(!record.contains("output_size"));
        assert!(!record.contains("output_state"));
        assert_eq!(record.get("num_hidden_units"), Some(&json!(1)));
        assert_eq!(record.get("cell_state"), Some(&json!({"value": host(&[1, 1], &[0.25])})));
        assert_eq!(record.get("hidden_state"), Some(&json!({"value": host(&[1, 1], &[-0.25])})));
    }

    #[test]
    fn test_v1_upgrade_then_decode() {
        let layer = decode(&upgrade_record(v1_record()).unwrap()).unwrap();
        assert_eq!(layer.num_hidden_units(), 1);
        assert_eq!(layer.output_mode(), OutputMode::Last);
        assert_eq!(layer.state_activation(), StateActivation::Tanh);
        assert_eq!(layer.gate_activation(), GateActivation::Sigmoid);
        assert_eq!(layer.input_weights().initializer, Initializer::narrow_normal());
        assert_eq!(layer.recurrent_weights().initializer, Initializer::narrow_normal());
        assert_eq!(layer.bias().initializer, Initializer::unit_forget_gate());
        assert_eq!(layer.cell_state().data(), &[0.25]);
        assert_eq!(layer.hidden_state().data(), &[-0.25]);
        assert!(!layer.has_state_inputs());
    }

    #[test]
    fn test_v1_without_output_state_is_format_error() {
        let mut record = v1_record();
        record.fields.remove("output_state");
        let err = upgrade_record(record).unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("output_state"));
    }

    #[test]
    fn test_encode_decode() {
        let mut layer = LstmLayer::new(3).unwrap().with_name("lstm");
        layer.set_input_size(Some(2)).unwrap();
        layer.set_gate_activation(GateActivation::HardSigmoid);
        layer.set_has_state_outputs(true);
        layer
            .set_hidden_state(crate::layers::DenseArray::column(vec![0.1, 0.2, 0.3]))
            .unwrap();
        assert_eq!(decode(&encode(&layer)).unwrap(), layer);
    }
}
