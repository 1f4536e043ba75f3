//! Dropout record layout. Only one version exists.

use crate::error::Result;
use crate::layers::{DropoutLayer, LayerKind, NetworkLayer};
use crate::state::migration::KindSchema;
use crate::state::record::LayerRecord;

pub const CURRENT_VERSION: u32 = 1;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::Dropout,
    current_version: CURRENT_VERSION,
    steps: &[],
    fields: &["name", "probability"],
};

pub fn encode(layer: &DropoutLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::Dropout, CURRENT_VERSION)
        .with("name", layer.name())
        .with("probability", layer.probability())
}

pub fn decode(record: &LayerRecord) -> Result<DropoutLayer> {
    Ok(DropoutLayer::new(record.read_f64("probability")?)?.with_name(&record.read_name()?))
}
