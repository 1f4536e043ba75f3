//! Per-field validation.
//!
//! Each check returns the accepted value or a `Validation` error attributed to
//! the layer kind and field that failed.

use crate::error::{LayerStoreError, Result};
use crate::layers::array::ParameterValue;
use crate::layers::learnable::LearnableParameter;
use crate::layers::LayerKind;

/// Learn-rate and regularization multipliers must be finite and non-negative.
pub fn validate_factor(kind: LayerKind, field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(LayerStoreError::validation(kind, field, "must be finite"));
    }
    if value < 0.0 {
        return Err(LayerStoreError::validation(
            kind,
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(value)
}

pub fn validate_positive(kind: LayerKind, field: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(LayerStoreError::validation(
            kind,
            field,
            "must be a positive integer",
        ));
    }
    Ok(value)
}

/// Probability in `[0, 1)`.
pub fn validate_probability(kind: LayerKind, field: &str, value: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&value) {
        return Err(LayerStoreError::validation(
            kind,
            field,
            format!("must be in [0, 1), got {}", value),
        ));
    }
    Ok(value)
}

pub fn validate_one_of<'a>(
    kind: LayerKind,
    field: &str,
    value: &'a str,
    allowed: &[&str],
) -> Result<&'a str> {
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(LayerStoreError::validation(
            kind,
            field,
            format!("'{}' is not one of {}", value, allowed.join(", ")),
        ))
    }
}

/// Check a value's shape. `None` entries accept any size. Empty values pass.
pub fn validate_shape(
    kind: LayerKind,
    field: &str,
    value: &ParameterValue,
    expected: &[Option<usize>],
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let shape = value.shape();
    let matches = shape.len() == expected.len()
        && shape
            .iter()
            .zip(expected)
            .all(|(&actual, want)| want.map_or(true, |w| w == actual));
    if !matches {
        let wanted: Vec<String> = expected
            .iter()
            .map(|d| d.map_or_else(|| "*".to_string(), |n| n.to_string()))
            .collect();
        return Err(LayerStoreError::validation(
            kind,
            field,
            format!("expected shape [{}], got {:?}", wanted.join(", "), shape),
        ));
    }
    Ok(())
}

/// Validate a learnable parameter: factors, initializer, shape and values.
/// Values must be finite so that every accepted parameter can be persisted.
pub fn validate_learnable(
    kind: LayerKind,
    field: &str,
    param: &LearnableParameter,
    expected: &[Option<usize>],
) -> Result<()> {
    validate_factor(
        kind,
        &format!("{}.learn_rate_factor", field),
        param.learn_rate_factor,
    )?;
    validate_factor(
        kind,
        &format!("{}.regularization_factor", field),
        param.regularization_factor,
    )?;
    param
        .initializer
        .check()
        .map_err(|reason| LayerStoreError::validation(kind, &format!("{}.initializer", field), reason))?;
    let value_field = format!("{}.value", field);
    validate_shape(kind, &value_field, &param.value, expected)?;
    if param.value.stored_values().iter().any(|v| !v.is_finite()) {
        return Err(LayerStoreError::validation(kind, &value_field, "must be finite"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{DenseArray, Initializer};

    #[test]
    fn test_validate_factor() {
        assert_eq!(validate_factor(LayerKind::Lstm, "f", 0.0).unwrap(), 0.0);
        assert!(validate_factor(LayerKind::Lstm, "f", -0.1).is_err());
        assert!(validate_factor(LayerKind::Lstm, "f", f64::NAN).is_err());
        assert!(validate_factor(LayerKind::Lstm, "f", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_probability_bounds() {
        assert!(validate_probability(LayerKind::Dropout, "p", 0.0).is_ok());
        assert!(validate_probability(LayerKind::Dropout, "p", 0.99).is_ok());
        assert!(validate_probability(LayerKind::Dropout, "p", 1.0).is_err());
        assert!(validate_probability(LayerKind::Dropout, "p", -0.5).is_err());
    }

    #[test]
    fn test_validate_shape_wildcards() {
        let value = ParameterValue::Host(DenseArray::zeros(vec![4, 3]).unwrap());
        assert!(validate_shape(LayerKind::FullyConnected, "w", &value, &[Some(4), None]).is_ok());
        assert!(validate_shape(LayerKind::FullyConnected, "w", &value, &[Some(4), Some(2)]).is_err());
        assert!(validate_shape(LayerKind::FullyConnected, "w", &value, &[Some(4)]).is_err());
        let empty = ParameterValue::default();
        assert!(validate_shape(LayerKind::FullyConnected, "w", &empty, &[Some(9), Some(9)]).is_ok());
    }

    #[test]
    fn test_validate_learnable_reports_nested_field() {
        let param = LearnableParameter::new(Initializer::glorot()).with_learn_rate_factor(-1.0);
        let err = validate_learnable(LayerKind::FullyConnected, "weights", &param, &[None, None])
            .unwrap_err();
        match err {
            LayerStoreError::Validation { kind, field, .. } => {
                assert_eq!(kind, LayerKind::FullyConnected);
                assert_eq!(field, "weights.learn_rate_factor");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_learnable_rejects_non_finite_values() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let param = LearnableParameter::new(Initializer::glorot())
                .with_value(DenseArray::new(vec![1, 2], vec![bad, 1.0]).unwrap());
            let err = validate_learnable(LayerKind::FullyConnected, "weights", &param, &[None, None])
                .unwrap_err();
            assert!(err.to_string().contains("weights.value"));
        }
    }
}
