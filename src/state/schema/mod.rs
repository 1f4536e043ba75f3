//! Per-kind record layouts.
//!
//! Each submodule owns one layer kind: its current version, its ordered
//! upgrade steps, its field list, and the mapping between a current-version
//! record and the live layer. Codecs shared between kinds live here.

pub mod classification;
pub mod dropout;
pub mod fully_connected;
pub mod lstm;
pub mod sequence_input;
pub mod softmax;

use serde_json::{json, Value};

use crate::error::Result;
use crate::layers::{DenseArray, Initializer, LearnableParameter, ParameterValue};
use crate::state::record::{ArrayRecord, LayerRecord};

// ============================================================================
// Learnable parameters
// ============================================================================

/// Learnable parameter sub-record. The value is always written host-resident.
pub(crate) fn encode_learnable(param: &LearnableParameter) -> Value {
    json!({
        "value": ArrayRecord::from_host(&param.host_value()),
        "initializer": param.initializer,
        "learn_rate_factor": param.learn_rate_factor,
        "regularization_factor": param.regularization_factor,
    })
}

/// Read a learnable parameter sub-record. The value is materialized on the
/// host whatever storage the record used.
pub(crate) fn decode_learnable(record: &LayerRecord, field: &str) -> Result<LearnableParameter> {
    let object = record.require_object(field)?;
    let path = |sub: &str| format!("{}.{}", field, sub);
    let get = |sub: &str| {
        object
            .get(sub)
            .ok_or_else(|| record.missing(&path(sub)))
    };

    let value = record.read_array_value(&path("value"), get("value")?)?;
    let initializer: Initializer = serde_json::from_value(get("initializer")?.clone())
        .map_err(|e| record.invalid(&path("initializer"), e.to_string()))?;
    let learn_rate_factor = record.f64_value(&path("learn_rate_factor"), get("learn_rate_factor")?)?;
    let regularization_factor =
        record.f64_value(&path("regularization_factor"), get("regularization_factor")?)?;

    Ok(LearnableParameter {
        value: ParameterValue::Host(value),
        initializer,
        learn_rate_factor,
        regularization_factor,
    })
}

// ============================================================================
// Recurrent state
// ============================================================================

pub(crate) fn encode_state(array: &DenseArray) -> Value {
    json!({ "value": ArrayRecord::from_host(array) })
}

pub(crate) fn decode_state(record: &LayerRecord, field: &str) -> Result<DenseArray> {
    let object = record.require_object(field)?;
    let path = format!("{}.value", field);
    let value = object.get("value").ok_or_else(|| record.missing(&path))?;
    record.read_array_value(&path, value)
}

// ============================================================================
// Upgrade helpers
// ============================================================================

/// Rewrite a learnable parameter's value as a host array record.
pub(crate) fn gather_learnable_value(record: LayerRecord, field: &str) -> Result<LayerRecord> {
    record.update_object(field, |record, object| {
        let path = format!("{}.value", field);
        let value = object
            .remove("value")
            .ok_or_else(|| record.missing(&path))?;
        let host = record
            .parse_array(&path, value)?
            .gather()
            .map_err(|reason| record.invalid(&path, reason))?;
        object.insert("value".to_string(), host.into());
        Ok(())
    })
}

/// Give a learnable parameter an initializer if it has none.
pub(crate) fn default_initializer(
    record: LayerRecord,
    field: &str,
    initializer: Initializer,
) -> Result<LayerRecord> {
    record.update_object(field, |_, object| {
        object
            .entry("initializer")
            .or_insert_with(|| json!(initializer));
        Ok(())
    })
}
