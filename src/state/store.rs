//! Versioned layer store.
//!
//! Encodes live layers into records at the current schema version of their
//! kind, and decodes records of any known version back into live layers.

use log::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{LayerStoreError, Result};
use crate::layers::{Layer, LayerKind};
use crate::state::migration::{self, schema_for};
use crate::state::record::LayerRecord;
use crate::state::schema;

/// Entry point for layer (de)serialization.
#[derive(Debug, Clone, Default)]
pub struct VersionedLayerStore {
    config: StoreConfig,
}

impl VersionedLayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current schema version for a layer kind.
    pub fn current_version(&self, kind: LayerKind) -> u32 {
        migration::current_version(kind)
    }

    /// Snapshot a live layer. Every parameter value is written host-resident
    /// and dense.
    pub fn encode(&self, layer: &Layer) -> LayerRecord {
        match layer {
            Layer::SequenceInput(layer) => schema::sequence_input::encode(layer),
            Layer::FullyConnected(layer) => schema::fully_connected::encode(layer),
            Layer::Lstm(layer) => schema::lstm::encode(layer),
            Layer::Softmax(layer) => schema::softmax::encode(layer),
            Layer::Dropout(layer) => schema::dropout::encode(layer),
            Layer::Classification(layer) => schema::classification::encode(layer),
        }
    }

    /// Bring a record to the current version without building the layer.
    pub fn upgrade(&self, record: LayerRecord) -> Result<LayerRecord> {
        migration::upgrade_record(record)
    }

    /// Apply at most one upgrade step; no-op at the current version.
    pub fn upgrade_step(&self, record: LayerRecord) -> Result<LayerRecord> {
        migration::upgrade_step(record)
    }

    /// Consume a record and build the live layer it describes.
    ///
    /// # Errors
    /// Format errors for unknown or newer versions and missing fields,
    /// validation errors for fields that fail their constraints.
    pub fn decode(&self, record: LayerRecord) -> Result<Layer> {
        let from = record.schema_version;
        let record = self.upgrade(record)?;
        debug!(
            "Decoding {} record (schema version {} -> {})",
            record.layer_kind, from, record.schema_version
        );
        self.check_fields(&record)?;

        let layer: Layer = match record.layer_kind {
            LayerKind::SequenceInput => schema::sequence_input::decode(&record)?.into(),
            LayerKind::FullyConnected => schema::fully_connected::decode(&record)?.into(),
            LayerKind::Lstm => schema::lstm::decode(&record)?.into(),
            LayerKind::Softmax => schema::softmax::decode(&record)?.into(),
            LayerKind::Dropout => schema::dropout::decode(&record)?.into(),
            LayerKind::Classification => schema::classification::decode(&record)?.into(),
        };
        Ok(layer)
    }

    fn check_fields(&self, record: &LayerRecord) -> Result<()> {
        let known = schema_for(record.layer_kind).fields;
        for field in record.fields.keys() {
            if known.contains(&field.as_str()) {
                continue;
            }
            if self.config.strict_fields {
                return Err(LayerStoreError::validation(
                    record.layer_kind,
                    field,
                    "not part of the current schema",
                ));
            }
            warn!(
                "Ignoring unknown field '{}' in {} record",
                field, record.layer_kind
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{DropoutLayer, NetworkLayer, SoftmaxLayer};

    #[test]
    fn test_encode_tags_current_version() {
        let store = VersionedLayerStore::new();
        let record = store.encode(&SoftmaxLayer::new().into());
        assert_eq!(record.layer_kind, LayerKind::Softmax);
        assert_eq!(record.schema_version, store.current_version(LayerKind::Softmax));
    }

    #[test]
    fn test_unknown_fields_ignored_by_default() {
        let store = VersionedLayerStore::new();
        let record = store
            .encode(&DropoutLayer::new(0.1).unwrap().into())
            .with("comment", "tuned by hand");
        let layer = store.decode(record).unwrap();
        assert_eq!(layer.kind(), LayerKind::Dropout);
    }

    #[test]
    fn test_unknown_fields_rejected_when_strict() {
        let store = VersionedLayerStore::with_config(StoreConfig {
            strict_fields: true,
            ..StoreConfig::default()
        });
        let record = store
            .encode(&DropoutLayer::new(0.1).unwrap().into())
            .with("comment", "tuned by hand");
        let err = store.decode(record).unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("comment"));
    }
}
