//! Softmax record layout.
//!
//! | version | change |
//! |---|---|
//! | 2 | `vector_format` added, default `false` |
//! | 3 | `channel_dim` added: `3` for spatial input, null for vector input |
//! | 4 | vector input and unknown `channel_dim` both normalize to `1` |

use serde_json::Value;

use crate::error::Result;
use crate::layers::{LayerKind, NetworkLayer, SoftmaxLayer};
use crate::state::migration::KindSchema;
use crate::state::record::LayerRecord;

pub const CURRENT_VERSION: u32 = 4;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::Softmax,
    current_version: CURRENT_VERSION,
    steps: &[v1_to_v2, v2_to_v3, v3_to_v4],
    fields: &["name", "vector_format", "channel_dim"],
};

fn v1_to_v2(record: LayerRecord) -> Result<LayerRecord> {
    Ok(record.with_default("vector_format", false))
}

fn v2_to_v3(record: LayerRecord) -> Result<LayerRecord> {
    let channel_dim = if record.read_bool("vector_format")? {
        Value::Null
    } else {
        Value::from(3)
    };
    Ok(record.with("channel_dim", channel_dim))
}

fn v3_to_v4(record: LayerRecord) -> Result<LayerRecord> {
    let vector_format = record.read_bool("vector_format")?;
    let unknown = matches!(record.get("channel_dim"), None | Some(Value::Null));
    if vector_format || unknown {
        Ok(record.with("channel_dim", 1))
    } else {
        Ok(record)
    }
}

pub fn encode(layer: &SoftmaxLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::Softmax, CURRENT_VERSION)
        .with("name", layer.name())
        .with("vector_format", layer.vector_format())
        .with("channel_dim", layer.channel_dim())
}

pub fn decode(record: &LayerRecord) -> Result<SoftmaxLayer> {
    SoftmaxLayer::new()
        .with_name(&record.read_name()?)
        .with_vector_format(record.read_bool("vector_format")?)
        .with_channel_dim(record.read_opt_usize("channel_dim")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::migration::upgrade_record;
    use serde_json::json;

    #[test]
    fn test_v1_spatial_input_keeps_channel_dim_three() {
        let record = upgrade_record(LayerRecord::new(LayerKind::Softmax, 1)).unwrap();
        assert_eq!(record.schema_version, 4);
        assert_eq!(record.get("vector_format"), Some(&json!(false)));
        assert_eq!(record.get("channel_dim"), Some(&json!(3)));
    }

    #[test]
    fn test_v2_vector_input_becomes_channel_dim_one() {
        let record = LayerRecord::new(LayerKind::Softmax, 2).with("vector_format", true);
        let v3 = v2_to_v3(record).unwrap();
        assert_eq!(v3.get("channel_dim"), Some(&Value::Null));
        let v4 = v3_to_v4(v3).unwrap();
        assert_eq!(v4.get("channel_dim"), Some(&json!(1)));
    }

    #[test]
    fn test_v3_empty_channel_dim_becomes_one() {
        let record = LayerRecord::new(LayerKind::Softmax, 3)
            .with("vector_format", false)
            .with("channel_dim", Value::Null);
        let v4 = upgrade_record(record).unwrap();
        assert_eq!(v4.get("channel_dim"), Some(&json!(1)));
    }

    #[test]
    fn test_encode_decode() {
        let layer = SoftmaxLayer::new()
            .with_name("sm")
            .with_channel_dim(Some(2))
            .unwrap();
        assert_eq!(decode(&encode(&layer)).unwrap(), layer);
    }
}
