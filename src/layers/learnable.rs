//! Learnable parameters and their initializers.

use serde::{Deserialize, Serialize};

use crate::layers::array::{DenseArray, ParameterValue};

/// Built-in initializer names.
pub const GLOROT: &str = "glorot";
pub const HE: &str = "he";
pub const ORTHOGONAL: &str = "orthogonal";
pub const NARROW_NORMAL: &str = "narrow-normal";
pub const ZEROS: &str = "zeros";
pub const ONES: &str = "ones";
pub const UNIT_FORGET_GATE: &str = "unit-forget-gate";

/// All initializer names accepted by [`Initializer::Named`].
pub const BUILTIN_INITIALIZERS: &[&str] = &[
    GLOROT,
    HE,
    ORTHOGONAL,
    NARROW_NORMAL,
    ZEROS,
    ONES,
    UNIT_FORGET_GATE,
];

/// How a learnable parameter is initialized before training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Initializer {
    /// Built-in initializer with optional constructor arguments.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<f64>,
    },
    /// Reference to a user-supplied initialization function.
    Custom { function: String },
}

impl Initializer {
    pub fn named(name: &str) -> Self {
        Initializer::Named {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn custom(function: &str) -> Self {
        Initializer::Custom {
            function: function.to_string(),
        }
    }

    pub fn glorot() -> Self {
        Self::named(GLOROT)
    }

    pub fn orthogonal() -> Self {
        Self::named(ORTHOGONAL)
    }

    pub fn narrow_normal() -> Self {
        Self::named(NARROW_NORMAL)
    }

    pub fn zeros() -> Self {
        Self::named(ZEROS)
    }

    pub fn unit_forget_gate() -> Self {
        Self::named(UNIT_FORGET_GATE)
    }

    /// Check the initializer refers to something that exists.
    pub fn check(&self) -> std::result::Result<(), String> {
        match self {
            Initializer::Named { name, args } => {
                if !BUILTIN_INITIALIZERS.contains(&name.as_str()) {
                    return Err(format!(
                        "unknown initializer '{}', expected one of {}",
                        name,
                        BUILTIN_INITIALIZERS.join(", ")
                    ));
                }
                if args.iter().any(|a| !a.is_finite()) {
                    return Err("initializer arguments must be finite".to_string());
                }
                Ok(())
            }
            Initializer::Custom { function } => {
                if function.trim().is_empty() {
                    Err("custom initializer function name is empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// One learnable tensor (weights or bias) with its training multipliers.
///
/// The factors scale the global learning rate and L2 regularization of the
/// optimizer for this parameter only.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnableParameter {
    pub value: ParameterValue,
    pub initializer: Initializer,
    pub learn_rate_factor: f64,
    pub regularization_factor: f64,
}

impl LearnableParameter {
    /// Uninitialized parameter with unit factors.
    pub fn new(initializer: Initializer) -> Self {
        Self {
            value: ParameterValue::default(),
            initializer,
            learn_rate_factor: 1.0,
            regularization_factor: 1.0,
        }
    }

    pub fn with_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_learn_rate_factor(mut self, factor: f64) -> Self {
        self.learn_rate_factor = factor;
        self
    }

    pub fn with_regularization_factor(mut self, factor: f64) -> Self {
        self.regularization_factor = factor;
        self
    }

    pub fn is_initialized(&self) -> bool {
        !self.value.is_empty()
    }

    /// Host-resident dense copy of the value.
    pub fn host_value(&self) -> DenseArray {
        self.value.to_host_dense()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializer_json_layout() {
        let json = serde_json::to_value(Initializer::narrow_normal()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "named", "name": "narrow-normal"})
        );

        let custom = serde_json::to_value(Initializer::custom("myInit")).unwrap();
        assert_eq!(
            custom,
            serde_json::json!({"type": "custom", "function": "myInit"})
        );
    }

    #[test]
    fn test_initializer_args_roundtrip() {
        let init = Initializer::Named {
            name: NARROW_NORMAL.to_string(),
            args: vec![0.0, 0.05],
        };
        let json = serde_json::to_value(&init).unwrap();
        let back: Initializer = serde_json::from_value(json).unwrap();
        assert_eq!(back, init);
    }

    #[test]
    fn test_initializer_check() {
        assert!(Initializer::glorot().check().is_ok());
        assert!(Initializer::named("uniform-ish").check().is_err());
        assert!(Initializer::custom("  ").check().is_err());
    }

    #[test]
    fn test_new_parameter_is_uninitialized() {
        let param = LearnableParameter::new(Initializer::zeros());
        assert!(!param.is_initialized());
        assert_eq!(param.learn_rate_factor, 1.0);
        let param = param.with_value(DenseArray::column(vec![1.0]));
        assert!(param.is_initialized());
    }
}
