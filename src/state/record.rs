//! Persistable layer records.
//!
//! A record is a flat JSON object:
//!
//! ```json
//! {"schema_version": 4, "layer_kind": "softmax", "name": "out", "vector_format": false, "channel_dim": 3}
//! ```
//!
//! Which fields are present depends on the kind and schema version. Readers
//! here report absent fields as format errors and ill-typed fields as
//! validation errors, both attributed to the record's kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LayerStoreError, Result};
use crate::layers::{DenseArray, LayerKind, ParameterValue, SparseArray};

/// A versioned snapshot of one layer's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Field layout the record follows.
    pub schema_version: u32,

    /// Layer type that produced the record.
    pub layer_kind: LayerKind,

    /// Layout-dependent fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LayerRecord {
    pub fn new(layer_kind: LayerKind, schema_version: u32) -> Self {
        Self {
            schema_version,
            layer_kind,
            fields: Map::new(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Set a field only if it is absent.
    pub fn with_default(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Error for a field this record should have but does not.
    pub fn missing(&self, field: &str) -> LayerStoreError {
        LayerStoreError::MissingField {
            kind: self.layer_kind,
            version: self.schema_version,
            field: field.to_string(),
        }
    }

    /// Error for a field that is present but invalid.
    pub fn invalid(&self, field: &str, reason: impl Into<String>) -> LayerStoreError {
        LayerStoreError::validation(self.layer_kind, field, reason)
    }

    pub fn require(&self, field: &str) -> Result<&Value> {
        self.fields.get(field).ok_or_else(|| self.missing(field))
    }

    /// Remove a required field and return its value.
    pub fn take(&mut self, field: &str) -> Result<Value> {
        match self.fields.remove(field) {
            Some(value) => Ok(value),
            None => Err(self.missing(field)),
        }
    }

    /// Move a required field to a new name.
    pub fn rename(mut self, from: &str, to: &str) -> Result<Self> {
        let value = self.take(from)?;
        self.fields.insert(to.to_string(), value);
        Ok(self)
    }

    pub fn require_object(&self, field: &str) -> Result<&Map<String, Value>> {
        self.require(field)?
            .as_object()
            .ok_or_else(|| self.invalid(field, "expected an object"))
    }

    /// Apply `f` to the object stored in a required field.
    pub fn update_object(
        mut self,
        field: &str,
        f: impl FnOnce(&Self, &mut Map<String, Value>) -> Result<()>,
    ) -> Result<Self> {
        let mut object = match self.take(field)? {
            Value::Object(object) => object,
            _ => return Err(self.invalid(field, "expected an object")),
        };
        f(&self, &mut object)?;
        self.fields.insert(field.to_string(), Value::Object(object));
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Typed readers
    // ------------------------------------------------------------------

    /// Layer name; absent or null means unnamed.
    pub fn read_name(&self) -> Result<String> {
        match self.get("name") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(name)) => Ok(name.clone()),
            Some(_) => Err(self.invalid("name", "expected a string")),
        }
    }

    pub fn read_bool(&self, field: &str) -> Result<bool> {
        self.bool_value(field, self.require(field)?)
    }

    pub fn read_str(&self, field: &str) -> Result<&str> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| self.invalid(field, "expected a string"))
    }

    pub fn read_f64(&self, field: &str) -> Result<f64> {
        self.f64_value(field, self.require(field)?)
    }

    pub fn read_usize(&self, field: &str) -> Result<usize> {
        self.usize_value(field, self.require(field)?)
    }

    /// Unsigned integer that may be null (meaning "automatic").
    pub fn read_opt_usize(&self, field: &str) -> Result<Option<usize>> {
        match self.require(field)? {
            Value::Null => Ok(None),
            value => self.usize_value(field, value).map(Some),
        }
    }

    pub fn read_usize_list(&self, field: &str) -> Result<Vec<usize>> {
        let items = self
            .require(field)?
            .as_array()
            .ok_or_else(|| self.invalid(field, "expected a list"))?;
        items
            .iter()
            .map(|item| self.usize_value(field, item))
            .collect()
    }

    pub fn read_str_list(&self, field: &str) -> Result<Vec<String>> {
        let items = self
            .require(field)?
            .as_array()
            .ok_or_else(|| self.invalid(field, "expected a list"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field, "expected a list of strings"))
            })
            .collect()
    }

    /// Decode an array value to host-resident dense form.
    pub fn read_array_value(&self, field: &str, value: &Value) -> Result<DenseArray> {
        let array = self.parse_array(field, value.clone())?;
        let value = array
            .into_parameter_value()
            .map_err(|reason| self.invalid(field, reason))?;
        Ok(value.into_host_dense())
    }

    pub fn parse_array(&self, field: &str, value: Value) -> Result<ArrayRecord> {
        serde_json::from_value(value).map_err(|e| self.invalid(field, e.to_string()))
    }

    pub fn bool_value(&self, field: &str, value: &Value) -> Result<bool> {
        value
            .as_bool()
            .ok_or_else(|| self.invalid(field, "expected a boolean"))
    }

    pub fn f64_value(&self, field: &str, value: &Value) -> Result<f64> {
        value
            .as_f64()
            .ok_or_else(|| self.invalid(field, "expected a number"))
    }

    pub fn usize_value(&self, field: &str, value: &Value) -> Result<usize> {
        value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.invalid(field, "expected a non-negative integer"))
    }
}

/// A numeric array as it appears inside a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", rename_all = "snake_case")]
pub enum ArrayRecord {
    Host {
        shape: Vec<usize>,
        data: Vec<f32>,
    },
    Device {
        device: String,
        shape: Vec<usize>,
        data: Vec<f32>,
    },
    Sparse {
        shape: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<f32>,
    },
}

impl ArrayRecord {
    /// Snapshot of a host array.
    pub fn from_host(array: &DenseArray) -> Self {
        ArrayRecord::Host {
            shape: array.shape().to_vec(),
            data: array.data().to_vec(),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, ArrayRecord::Host { .. })
    }

    /// Rebuild the in-memory value, checking shape consistency.
    pub fn into_parameter_value(self) -> std::result::Result<ParameterValue, String> {
        match self {
            ArrayRecord::Host { shape, data } => DenseArray::new(shape, data).map(ParameterValue::Host),
            ArrayRecord::Device {
                device,
                shape,
                data,
            } => DenseArray::new(shape, data).map(|array| ParameterValue::Device { device, array }),
            ArrayRecord::Sparse {
                shape,
                indices,
                values,
            } => SparseArray::new(shape, indices, values).map(ParameterValue::Sparse),
        }
    }

    /// Materialize as a host array record.
    pub fn gather(self) -> std::result::Result<Self, String> {
        if self.is_host() {
            return Ok(self);
        }
        let dense = self.into_parameter_value()?.into_host_dense();
        Ok(Self::from_host(&dense))
    }
}

impl From<ArrayRecord> for Value {
    fn from(array: ArrayRecord) -> Self {
        // Plain enum of vectors and strings; serialization cannot fail.
        serde_json::to_value(array).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_json_is_flat() {
        let record = LayerRecord::new(LayerKind::Softmax, 4)
            .with("name", "out")
            .with("channel_dim", 3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            json!({"schema_version": 4, "layer_kind": "softmax", "name": "out", "channel_dim": 3})
        );
        let back: LayerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_with_default_keeps_existing() {
        let record = LayerRecord::new(LayerKind::Dropout, 1)
            .with("probability", 0.3)
            .with_default("probability", 0.5)
            .with_default("name", "drop");
        assert_eq!(record.read_f64("probability").unwrap(), 0.3);
        assert_eq!(record.read_name().unwrap(), "drop");
    }

    #[test]
    fn test_missing_is_format_error() {
        let record = LayerRecord::new(LayerKind::Lstm, 2);
        let err = record.read_bool("has_state_inputs").unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_wrong_type_is_validation_error() {
        let record = LayerRecord::new(LayerKind::Lstm, 5).with("num_hidden_units", -3);
        assert!(record.read_usize("num_hidden_units").unwrap_err().is_validation_error());
        let record = record.with("name", 7);
        assert!(record.read_name().unwrap_err().is_validation_error());
    }

    #[test]
    fn test_rename_requires_source() {
        let record = LayerRecord::new(LayerKind::Lstm, 1).with("output_size", 10);
        let renamed = record.rename("output_size", "num_hidden_units").unwrap();
        assert!(!renamed.contains("output_size"));
        assert_eq!(renamed.read_usize("num_hidden_units").unwrap(), 10);
        assert!(renamed.rename("output_size", "x").is_err());
    }

    #[test]
    fn test_opt_usize_accepts_null() {
        let record = LayerRecord::new(LayerKind::FullyConnected, 3)
            .with("input_size", Value::Null)
            .with("output_size", 4);
        assert_eq!(record.read_opt_usize("input_size").unwrap(), None);
        assert_eq!(record.read_opt_usize("output_size").unwrap(), Some(4));
    }

    #[test]
    fn test_array_record_gather() {
        let device = ArrayRecord::Device {
            device: "gpu:0".to_string(),
            shape: vec![2, 1],
            data: vec![1.0, 2.0],
        };
        assert_eq!(
            device.gather().unwrap(),
            ArrayRecord::Host {
                shape: vec![2, 1],
                data: vec![1.0, 2.0]
            }
        );

        let sparse = ArrayRecord::Sparse {
            shape: vec![3, 1],
            indices: vec![2],
            values: vec![4.0],
        };
        assert_eq!(
            sparse.gather().unwrap(),
            ArrayRecord::Host {
                shape: vec![3, 1],
                data: vec![0.0, 0.0, 4.0]
            }
        );
    }

    #[test]
    fn test_read_array_value_checks_shape() {
        let record = LayerRecord::new(LayerKind::Lstm, 5);
        let bad = json!({"storage": "host", "shape": [2, 2], "data": [1.0]});
        assert!(record.read_array_value("cell_state", &bad).unwrap_err().is_validation_error());

        let complex = json!({"storage": "host", "shape": [1, 1], "data": [[1.0, 2.0]]});
        assert!(record.read_array_value("cell_state", &complex).is_err());
    }
}
