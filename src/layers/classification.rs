//! Classification output layer
//!
//! Computes the cross-entropy loss against the development-stage classes.
//! Classes are inferred from the training labels when left empty.

use std::collections::HashSet;

use crate::error::{LayerStoreError, Result};
use crate::layers::validation::validate_positive;
use crate::layers::{LayerKind, NetworkLayer};

const KIND: LayerKind = LayerKind::Classification;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationLayer {
    name: String,
    classes: Vec<String>,
    output_size: Option<usize>,
}

impl ClassificationLayer {
    /// Layer with automatically inferred classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer with a fixed, ordered class list.
    pub fn with_classes(classes: Vec<String>) -> Result<Self> {
        let mut layer = Self::new();
        layer.set_classes(classes)?;
        Ok(layer)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn output_size(&self) -> Option<usize> {
        self.output_size
    }

    /// Set the class list. A non-empty list fixes the output size.
    pub fn set_classes(&mut self, classes: Vec<String>) -> Result<()> {
        let mut seen = HashSet::new();
        for class in &classes {
            if class.is_empty() {
                return Err(LayerStoreError::validation(
                    KIND,
                    "classes",
                    "class names must not be empty",
                ));
            }
            if !seen.insert(class.as_str()) {
                return Err(LayerStoreError::validation(
                    KIND,
                    "classes",
                    format!("duplicate class '{}'", class),
                ));
            }
        }
        if !classes.is_empty() {
            self.output_size = Some(classes.len());
        }
        self.classes = classes;
        Ok(())
    }

    pub fn set_output_size(&mut self, output_size: Option<usize>) -> Result<()> {
        if let Some(size) = output_size {
            validate_positive(KIND, "output_size", size)?;
            if !self.classes.is_empty() && size != self.classes.len() {
                return Err(LayerStoreError::validation(
                    KIND,
                    "output_size",
                    format!("{} does not match {} classes", size, self.classes.len()),
                ));
            }
        }
        self.output_size = output_size;
        Ok(())
    }
}

impl NetworkLayer for ClassificationLayer {
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
        if self.classes.is_empty() {
            "crossentropyex".to_string()
        } else {
            format!("crossentropyex with {} classes", self.classes.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classes_fix_output_size() {
        let layer = ClassificationLayer::with_classes(names(&["early", "late"])).unwrap();
        assert_eq!(layer.output_size(), Some(2));
        assert_eq!(layer.description(), "crossentropyex with 2 classes");
    }

    #[test]
    fn test_duplicate_classes_rejected() {
        assert!(ClassificationLayer::with_classes(names(&["a", "a"])).is_err());
        assert!(ClassificationLayer::with_classes(names(&[""])).is_err());
    }

    #[test]
    fn test_output_size_must_match_classes() {
        let mut layer = ClassificationLayer::with_classes(names(&["a", "b", "c"])).unwrap();
        assert!(layer.set_output_size(Some(2)).is_err());
        layer.set_output_size(Some(3)).unwrap();

        let mut auto = ClassificationLayer::new();
        auto.set_output_size(Some(4)).unwrap();
        assert_eq!(auto.output_size(), Some(4));
    }
}
