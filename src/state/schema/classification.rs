//! Classification output record layout. Only one version exists.

use crate::error::Result;
use crate::layers::{ClassificationLayer, LayerKind, NetworkLayer};
use crate::state::migration::KindSchema;
use crate::state::record::LayerRecord;

pub const CURRENT_VERSION: u32 = 1;

pub(crate) static SCHEMA: KindSchema = KindSchema {
    kind: LayerKind::Classification,
    current_version: CURRENT_VERSION,
    steps: &[],
    fields: &["name", "classes", "output_size"],
};

pub fn encode(layer: &ClassificationLayer) -> LayerRecord {
    LayerRecord::new(LayerKind::Classification, CURRENT_VERSION)
        .with("name", layer.name())
        .with("classes", layer.classes().to_vec())
        .with("output_size", layer.output_size())
}

pub fn decode(record: &LayerRecord) -> Result<ClassificationLayer> {
    let mut layer = ClassificationLayer::with_classes(record.read_str_list("classes")?)?
        .with_name(&record.read_name()?);
    layer.set_output_size(record.read_opt_usize("output_size")?)?;
    Ok(layer)
}
