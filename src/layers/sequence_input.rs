//! Sequence input layer
//!
//! Entry point of the network. Receives one feature vector (or feature image)
//! per time step and optionally normalizes it with precomputed statistics.

use crate::error::{LayerStoreError, Result};
use crate::layers::array::{element_count, DenseArray};
use crate::layers::validation::{validate_one_of, validate_positive};
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::SequenceInput;

/// Input normalization applied at every time step.
///
/// Statistics are `None` until computed from training data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Normalization {
    #[default]
    None,
    ZeroCenter {
        mean: Option<DenseArray>,
    },
    Zscore {
        mean: Option<DenseArray>,
        std: Option<DenseArray>,
    },
    RescaleSymmetric {
        min: Option<DenseArray>,
        max: Option<DenseArray>,
    },
    RescaleZeroOne {
        min: Option<DenseArray>,
        max: Option<DenseArray>,
    },
}

impl Normalization {
    pub const METHODS: [&'static str; 5] = [
        "none",
        "zerocenter",
        "zscore",
        "rescale-symmetric",
        "rescale-zero-one",
    ];

    pub fn method(&self) -> &'static str {
        match self {
            Normalization::None => "none",
            Normalization::ZeroCenter { .. } => "zerocenter",
            Normalization::Zscore { .. } => "zscore",
            Normalization::RescaleSymmetric { .. } => "rescale-symmetric",
            Normalization::RescaleZeroOne { .. } => "rescale-zero-one",
        }
    }

    /// Names of the statistics a method carries, in storage order.
    pub fn statistic_names(method: &str) -> &'static [&'static str] {
        match method {
            "zerocenter" => &["mean"],
            "zscore" => &["mean", "std"],
            "rescale-symmetric" | "rescale-zero-one" => &["min", "max"],
            _ => &[],
        }
    }

    /// Statistics in storage order; `None` where not yet computed.
    pub fn statistics(&self) -> Vec<(&'static str, Option<&DenseArray>)> {
        match self {
            Normalization::None => Vec::new(),
            Normalization::ZeroCenter { mean } => vec![("mean", mean.as_ref())],
            Normalization::Zscore { mean, std } => {
                vec![("mean", mean.as_ref()), ("std", std.as_ref())]
            }
            Normalization::RescaleSymmetric { min, max }
            | Normalization::RescaleZeroOne { min, max } => {
                vec![("min", min.as_ref()), ("max", max.as_ref())]
            }
        }
    }

    /// Build a normalization from its method name, pulling each statistic
    /// from `take`.
    pub fn from_method(
        method: &str,
        mut take: impl FnMut(&str) -> Result<Option<DenseArray>>,
    ) -> Result<Self> {
        validate_one_of(KIND, "normalization", method, &Self::METHODS)?;
        let normalization = match method {
            "none" => Normalization::None,
            "zerocenter" => Normalization::ZeroCenter { mean: take("mean")? },
            "zscore" => Normalization::Zscore {
                mean: take("mean")?,
                std: take("std")?,
            },
            "rescale-symmetric" => Normalization::RescaleSymmetric {
                min: take("min")?,
                max: take("max")?,
            },
            _ => Normalization::RescaleZeroOne {
                min: take("min")?,
                max: take("max")?,
            },
        };
        Ok(normalization)
    }
}

/// Dimension over which normalization statistics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationDimension {
    /// Any of the other three, decided by the statistics' size.
    #[default]
    Auto,
    Channel,
    Element,
    All,
}

impl NormalizationDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationDimension::Auto => "auto",
            NormalizationDimension::Channel => "channel",
            NormalizationDimension::Element => "element",
            NormalizationDimension::All => "all",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let value = validate_one_of(
            KIND,
            "normalization_dimension",
            value,
            &["auto", "channel", "element", "all"],
        )?;
        Ok(match value {
            "auto" => NormalizationDimension::Auto,
            "channel" => NormalizationDimension::Channel,
            "element" => NormalizationDimension::Element,
            _ => NormalizationDimension::All,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceInputLayer {
    name: String,
    input_size: Vec<usize>,
    normalization: Normalization,
    normalization_dimension: NormalizationDimension,
    min_length: usize,
    split_complex_inputs: bool,
}

impl SequenceInputLayer {
    /// Create an input layer for feature vectors or images of `input_size`.
    ///
    /// A single entry is the number of features per time step; three entries
    /// are `[height, width, channels]`.
    pub fn new(input_size: Vec<usize>) -> Result<Self> {
        if input_size.is_empty() {
            return Err(LayerStoreError::validation(
                KIND,
                "input_size",
                "must have at least one dimension",
            ));
        }
        for &size in &input_size {
            validate_positive(KIND, "input_size", size)?;
        }
        element_count(&input_size)
            .map_err(|reason| LayerStoreError::validation(KIND, "input_size", reason))?;
        Ok(Self {
            name: String::new(),
            input_size,
            normalization: Normalization::None,
            normalization_dimension: NormalizationDimension::Auto,
            min_length: 1,
            split_complex_inputs: false,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn input_size(&self) -> &[usize] {
        &self.input_size
    }

    /// Number of channels (the last input dimension).
    pub fn num_channels(&self) -> usize {
        self.input_size.last().copied().unwrap_or(1)
    }

    /// Number of elements per time step.
    pub fn num_elements(&self) -> usize {
        self.input_size
            .iter()
            .fold(1usize, |acc, &dim| acc.saturating_mul(dim))
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    pub fn normalization_dimension(&self) -> NormalizationDimension {
        self.normalization_dimension
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn split_complex_inputs(&self) -> bool {
        self.split_complex_inputs
    }

    /// Replace the normalization; its statistics must fit the current dimension.
    pub fn set_normalization(&mut self, normalization: Normalization) -> Result<()> {
        self.check_statistics(&normalization, self.normalization_dimension)?;
        self.normalization = normalization;
        Ok(())
    }

    /// Change the normalization dimension. Existing statistics are re-checked
    /// against the new dimension and the layer is left unchanged on failure.
    pub fn set_normalization_dimension(&mut self, dimension: NormalizationDimension) -> Result<()> {
        self.check_statistics(&self.normalization, dimension)?;
        self.normalization_dimension = dimension;
        Ok(())
    }

    pub fn set_min_length(&mut self, min_length: usize) -> Result<()> {
        self.min_length = validate_positive(KIND, "min_length", min_length)?;
        Ok(())
    }

    pub fn set_split_complex_inputs(&mut self, split: bool) {
        self.split_complex_inputs = split;
    }

    fn check_statistics(
        &self,
        normalization: &Normalization,
        dimension: NormalizationDimension,
    ) -> Result<()> {
        let channels = self.num_channels();
        let elements = self.num_elements();
        for (stat, value) in normalization.statistics() {
            let Some(value) = value else { continue };
            let found = value.numel();
            let fits = match dimension {
                NormalizationDimension::Channel => found == channels,
                NormalizationDimension::Element => found == elements,
                NormalizationDimension::All => found == 1,
                NormalizationDimension::Auto => {
                    found == channels || found == elements || found == 1
                }
            };
            if !fits {
                return Err(LayerStoreError::validation(
                    KIND,
                    &format!("normalization.{}", stat),
                    format!(
                        "{} values do not fit '{}' normalization of input size {:?}",
                        found,
                        dimension.as_str(),
                        self.input_size
                    ),
                ));
            }
            if value.data().iter().any(|v| !v.is_finite()) {
                return Err(LayerStoreError::validation(
                    KIND,
                    &format!("normalization.{}", stat),
                    "must be finite",
                ));
            }
        }
        Ok(())
    }
}

impl NetworkLayer for SequenceInputLayer {
    fn kind(&self) -> LayerKind {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn description(&self) -> String {
        let dims: Vec<String> = self.input_size.iter().map(|d| d.to_string()).collect();
        format!(
            "Sequence input with {} dimensions ({} normalization)",
            dims.join("x"),
            self.normalization.method()
        )
    }
}
