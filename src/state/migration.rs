//! Schema upgrade support for layer records.
//!
//! Every layer kind has its own version lineage `1..=current`. A record is
//! brought to the current version by applying the registered step for
//! `v -> v + 1` until it reaches the current version. There is no way to skip
//! a version and no way to go back.

use log::debug;

use crate::error::{LayerStoreError, Result};
use crate::layers::LayerKind;
use crate::state::record::LayerRecord;
use crate::state::schema;

/// Type alias for upgrade steps.
/// Takes a record at version `v` and returns the record laid out for `v + 1`.
/// The engine, not the step, bumps `schema_version`.
pub type UpgradeFn = fn(LayerRecord) -> Result<LayerRecord>;

/// Version lineage and field layout of one layer kind.
#[derive(Debug)]
pub struct KindSchema {
    pub kind: LayerKind,
    pub current_version: u32,
    /// `steps[i]` upgrades version `i + 1` to `i + 2`.
    pub steps: &'static [UpgradeFn],
    /// Fields of a current-version record, besides the version and kind tags.
    pub fields: &'static [&'static str],
}

/// Registry lookup for a layer kind.
pub fn schema_for(kind: LayerKind) -> &'static KindSchema {
    match kind {
        LayerKind::SequenceInput => &schema::sequence_input::SCHEMA,
        LayerKind::FullyConnected => &schema::fully_connected::SCHEMA,
        LayerKind::Lstm => &schema::lstm::SCHEMA,
        LayerKind::Softmax => &schema::softmax::SCHEMA,
        LayerKind::Dropout => &schema::dropout::SCHEMA,
        LayerKind::Classification => &schema::classification::SCHEMA,
    }
}

/// Current schema version for a layer kind.
pub fn current_version(kind: LayerKind) -> u32 {
    schema_for(kind).current_version
}

/// Reject versions outside `1..=current`.
fn check_version(record: &LayerRecord, schema: &KindSchema) -> Result<()> {
    if record.schema_version == 0 {
        return Err(LayerStoreError::InvalidVersion {
            kind: record.layer_kind,
            version: record.schema_version,
        });
    }
    if record.schema_version > schema.current_version {
        return Err(LayerStoreError::UnsupportedVersion {
            kind: record.layer_kind,
            version: record.schema_version,
            current: schema.current_version,
        });
    }
    Ok(())
}

/// Find the sequence of steps needed to bring a record of `kind` from `from`
/// to the current version.
///
/// # Returns
/// A vector of (from_version, to_version) tuples. Empty if `from` is already
/// current or outside the known range.
pub fn find_upgrade_path(kind: LayerKind, from: u32) -> Vec<(u32, u32)> {
    let current = current_version(kind);
    if from == 0 || from >= current {
        return Vec::new();
    }
    (from..current).map(|v| (v, v + 1)).collect()
}

fn apply_step(schema: &KindSchema, record: LayerRecord) -> Result<LayerRecord> {
    let from = record.schema_version;
    let kind = record.layer_kind;
    let step = schema.steps.get((from - 1) as usize).ok_or_else(|| {
        LayerStoreError::MalformedRecord {
            reason: format!("no upgrade step registered for {} version {}", kind, from),
        }
    })?;

    let mut upgraded = step(record)?;
    debug_assert_eq!(upgraded.layer_kind, kind, "upgrade steps never change the kind");
    upgraded.schema_version = from + 1;

    debug!("Upgraded {} record from schema version {} to {}", kind, from, from + 1);
    Ok(upgraded)
}

/// Bring a record to the current version of its kind.
///
/// # Errors
/// Returns `LayerStoreError::UnsupportedVersion` if the record is newer than
/// this build knows about, `LayerStoreError::InvalidVersion` for version 0 and
/// `LayerStoreError::MissingField` if a step needs a field the record lacks.
pub fn upgrade_record(mut record: LayerRecord) -> Result<LayerRecord> {
    let schema = schema_for(record.layer_kind);
    check_version(&record, schema)?;

    for _ in find_upgrade_path(record.layer_kind, record.schema_version) {
        record = apply_step(schema, record)?;
    }

    Ok(record)
}

/// Apply at most one upgrade step. A current-version record is returned as is.
pub fn upgrade_step(record: LayerRecord) -> Result<LayerRecord> {
    let schema = schema_for(record.layer_kind);
    check_version(&record, schema)?;

    if record.schema_version == schema.current_version {
        return Ok(record);
    }
    apply_step(schema, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_kind_has_one_step_per_transition() {
        for kind in LayerKind::ALL {
            let schema = schema_for(kind);
            assert_eq!(schema.kind, kind);
            assert_eq!(schema.steps.len() as u32, schema.current_version - 1);
        }
    }

    #[test]
    fn test_current_versions() {
        assert_eq!(current_version(LayerKind::Softmax), 4);
        assert_eq!(current_version(LayerKind::FullyConnected), 3);
        assert_eq!(current_version(LayerKind::SequenceInput), 5);
        assert_eq!(current_version(LayerKind::Lstm), 5);
        assert_eq!(current_version(LayerKind::Dropout), 1);
        assert_eq!(current_version(LayerKind::Classification), 1);
    }

    #[test]
    fn test_find_upgrade_path_sequential() {
        let path = find_upgrade_path(LayerKind::Softmax, 1);
        assert_eq!(path, vec![(1, 2), (2, 3), (3, 4)]);
        assert_eq!(find_upgrade_path(LayerKind::Softmax, 3), vec![(3, 4)]);
    }

    #[test]
    fn test_find_upgrade_path_current_or_unknown() {
        assert!(find_upgrade_path(LayerKind::Softmax, 4).is_empty());
        assert!(find_upgrade_path(LayerKind::Softmax, 9).is_empty());
        assert!(find_upgrade_path(LayerKind::Softmax, 0).is_empty());
        assert!(find_upgrade_path(LayerKind::Dropout, 1).is_empty());
    }

    #[test]
    fn test_upgrade_newer_version_rejected() {
        let record = LayerRecord::new(LayerKind::Softmax, 5);
        match upgrade_record(record) {
            Err(LayerStoreError::UnsupportedVersion {
                kind,
                version,
                current,
            }) => {
                assert_eq!(kind, LayerKind::Softmax);
                assert_eq!(version, 5);
                assert_eq!(current, 4);
            }
            other => panic!("Expected UnsupportedVersion error, got {:?}", other),
        }
    }

    #[test]
    fn test_upgrade_version_zero_rejected() {
        let record = LayerRecord::new(LayerKind::Dropout, 0);
        assert!(matches!(
            upgrade_record(record),
            Err(LayerStoreError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_upgrade_step_advances_one_version() {
        let record = LayerRecord::new(LayerKind::SequenceInput, 2);
        let next = upgrade_step(record).unwrap();
        assert_eq!(next.schema_version, 3);
        assert_eq!(next.get("normalization_dimension"), Some(&json!("auto")));
        assert!(!next.contains("min_length"));
    }

    #[test]
    fn test_upgrade_step_at_current_is_noop() {
        let record = LayerRecord::new(LayerKind::Softmax, 4)
            .with("vector_format", true)
            .with("channel_dim", 1);
        let same = upgrade_step(record.clone()).unwrap();
        assert_eq!(same, record);
    }

    #[test]
    fn test_missing_step_input_is_format_error() {
        // 2 -> 3 derives channel_dim from vector_format
        let record = LayerRecord::new(LayerKind::Softmax, 2);
        let err = upgrade_record(record).unwrap_err();
        assert!(err.is_format_error());
        match err {
            LayerStoreError::MissingField { field, version, .. } => {
                assert_eq!(field, "vector_format");
                assert_eq!(version, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
