//! Fully connected record layout.
//!
//! | version | change |
//! |---|---|
//! | 2 | weight and bias values forced host-resident |
//! | 3 | `initializer` added: narrow-normal for weights, zeros for bias |

use crate::error::Result;
use crate::layers::{FullyConnectedLayer, Initializer, LayerKind, NetworkLayer};
use crate::state::migration::KindSchema;
use crate::state::record::LayerRecord;
use crate::state::schema::{
    decode_learnable, default_initializer, encode_learnable, gather_learnable_value,
};

pub const CURRENT_VERSION: u32 = 3;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::FullyConnected,
    current_version: CURRENT_VERSION,
    steps: &[v1_to_v2, v2_to_v3],
    fields: &["name", "input_size", "output_size", "weights", "bias"],
};

fn v1_to_v2(record: LayerRecord) -> Result<LayerRecord> {
    let record = gather_learnable_value(record, "weights")?;
    gather_learnable_value(record, "bias")
}

fn v2_to_v3(record: LayerRecord) -> Result<LayerRecord> {
    let record = default_initializer(record, "weights", Initializer::narrow_normal())?;
    default_initializer(record, "bias", Initializer::zeros())
}

pub fn encode(layer: &FullyConnectedLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::FullyConnected, CURRENT_VERSION)
        .with("name", layer.name())
        .with("input_size", layer.input_size())
        .with("output_size", layer.output_size())
        .with("weights", encode_learnable(layer.weights()))
        .with("bias", encode_learnable(layer.bias()))
}

pub fn decode(record: &LayerRecord) -> Result<FullyConnectedLayer> {
    FullyConnectedLayer::from_parts(
        record.read_name()?,
        record.read_opt_usize("input_size")?,
        record.read_usize("output_size")?,
        decode_learnable(record, "weights")?,
        decode_learnable(record, "bias")?,
    )
}
