//! Sequence input record layout.
//!
//! | version | change |
//! |---|---|
//! | 2 | `normalization` added, default empty transform list |
//! | 3 | `normalization_dimension` added, default `"auto"` |
//! | 4 | `min_length` added, default `1` |
//! | 5 | `split_complex_inputs` added, default `false` |
//!
//! `normalization` is a list of at most one transform object:
//! `{"method": "zscore", "mean": <array|null>, "std": <array|null>}`.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::layers::{
    LayerKind, NetworkLayer, Normalization, NormalizationDimension, SequenceInputLayer,
};
use crate::state::migration::KindSchema;
use crate::state::record::{ArrayRecord, LayerRecord};

pub const CURRENT_VERSION: u32 = 5;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::SequenceInput,
    current_version: CURRENT_VERSION,
    steps: &[v1_to_v2, v2_to_v3, v3_to_v4, v4_to_v5],
    fields: &[
        "name",
        "input_size",
        "normalization",
        "normalization_dimension",
        "min_length",
        "split_complex_inputs",
    ],
};

fn v1_to_v2(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record.with_default("normalization", json!([])))
}

fn v2_to_v3(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record.with_default("normalization_dimension", "auto"))
}

fn v3_to_v4(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record.with_default("min_length", 1))
}

fn v4_to_v5(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record.with_default("split_complex_inputs", false))
}

fn encode_normalization(normalization: &Normalization) -> Value {
    if let Normalization::None = normalization {
        return json!([]);
    }
    let mut transform = Map::new();
    transform.insert("method".to_string(), json!(normalization.method()));
    for (stat, value) in normalization.statistics() {
        let value = value.map_or(Value::Null, |array| ArrayRecord::from_host(array).into());
        transform.insert(stat.to_string(), value);
    }
    json!([transform])
}

fn decode_normalization(record: &LayerRecord) -> Result<Normalization> {
    let transforms = record
        .require("normalization")?
        .as_array()
        .ok_or_else(|| record.invalid("normalization", "expected a list of transforms"))?;

    let transform = match transforms.as_slice() {
        [] => return Ok(Normalization::None),
        [transform] => transform
            .as_object()
            .ok_or_else(|| record.invalid("normalization", "expected a transform object"))?,
        _ => {
            return Err(record.invalid(
                "normalization",
                format!("at most one transform is supported, found {}", transforms.len()),
            ))
        }
    };

    let method = transform
        .get("method")
        .ok_or_else(|| record.missing("normalization.method"))?
        .as_str()
        .ok_or_else(|| record.invalid("normalization.method", "expected a string"))?;

    Normalization::from_method(method, |stat| {
        match transform.get(stat) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => record
                .read_array_value(&format!("normalization.{}", stat), value)
                .map(Some),
        }
    })
}

pub fn encode(layer: &SequenceInputLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::SequenceInput, CURRENT_VERSION)
        .with("name", layer.name())
        .with("input_size", layer.input_size().to_vec())
        .with("normalization", encode_normalization(layer.normalization()))
        .with(
            "normalization_dimension",
            layer.normalization_dimension().as_str(),
        )
        .with("min_length", layer.min_length())
        .with("split_complex_inputs", layer.split_complex_inputs())
}

/// The dimension is applied before the statistics so that the statistics are
/// checked against it.
pub fn decode(record: &LayerRecord) -> Result<SequenceInputLayer> {
    let mut layer = SequenceInputLayer::new(record.read_usize_list("input_size")?)?
        .with_name(&record.read_name()?);
    layer.set_normalization_dimension(NormalizationDimension::parse(
        record.read_str("normalization_dimension")?,
    )?)?;
    layer.set_normalization(decode_normalization(record)?)?;
    layer.set_min_length(record.read_usize("min_length")?)?;
    layer.set_split_complex_inputs(record.read_bool("split_complex_inputs")?);
    Ok(layer)
}
