//! Numeric arrays held by layers.
//!
//! `DenseArray` is the host-resident form every decoded value ends up in.
//! `ParameterValue` also models values that still live on an accelerator or
//! in sparse storage; those must be materialized before they are persisted.

use std::collections::HashSet;

/// Largest number of elements a single array may hold (1 GiB of `f32`).
pub const MAX_ELEMENTS: usize = 1 << 28;

/// Number of elements described by `shape`.
///
/// # Errors
/// Fails if the product overflows or exceeds [`MAX_ELEMENTS`].
pub fn element_count(shape: &[usize]) -> std::result::Result<usize, String> {
    let count = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| format!("shape {:?} overflows the element count", shape))?;
    if count > MAX_ELEMENTS {
        return Err(format!(
            "shape {:?} has {} elements, more than the limit of {}",
            shape, count, MAX_ELEMENTS
        ));
    }
    Ok(count)
}

/// Dense, real-valued, host-resident array in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Default for DenseArray {
    fn default() -> Self {
        Self::empty()
    }
}

impl DenseArray {
    /// Create an array, checking that the data length matches the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> std::result::Result<Self, String> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(format!(
                "shape {:?} needs {} values, found {}",
                shape,
                expected,
                data.len()
            ));
        }
        Ok(Self { shape, data })
    }

    /// The 0x0 array held by parameters that have not been initialized.
    pub fn empty() -> Self {
        Self {
            shape: vec![0, 0],
            data: Vec::new(),
        }
    }

    pub fn zeros(shape: Vec<usize>) -> std::result::Result<Self, String> {
        let len = element_count(&shape)?;
        Ok(Self {
            shape,
            data: vec![0.0; len],
        })
    }

    /// Column vector of shape `[n, 1]`.
    pub fn column(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len(), 1],
            data,
        }
    }

    pub fn scalar(value: f32) -> Self {
        Self {
            shape: vec![1, 1],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<f32>) {
        (self.shape, self.data)
    }
}

/// Sparse array stored as linear (column-major) indices and values.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
    shape: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseArray {
    /// Create a sparse array; indices must be in range and unique, and the
    /// dense shape must stay within [`MAX_ELEMENTS`].
    pub fn new(
        shape: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<f32>,
    ) -> std::result::Result<Self, String> {
        if indices.len() != values.len() {
            return Err(format!(
                "{} indices but {} values",
                indices.len(),
                values.len()
            ));
        }
        let numel = element_count(&shape)?;
        let mut seen = HashSet::with_capacity(indices.len());
        for &index in &indices {
            if index >= numel {
                return Err(format!("index {} out of range for shape {:?}", index, shape));
            }
            if !seen.insert(index) {
                return Err(format!("duplicate index {}", index));
            }
        }
        Ok(Self {
            shape,
            indices,
            values,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Expand into a dense array.
    pub fn to_dense(&self) -> DenseArray {
        // Shape was bounded by `new`.
        let numel = self.shape.iter().product();
        let mut dense = DenseArray {
            shape: self.shape.clone(),
            data: vec![0.0; numel],
        };
        for (&index, &value) in self.indices.iter().zip(&self.values) {
            dense.data[index] = value;
        }
        dense
    }
}

/// Value of a learnable parameter as held by a live layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Dense values in ordinary process memory.
    Host(DenseArray),
    /// Copy resident on an accelerator device.
    Device { device: String, array: DenseArray },
    /// Sparse storage.
    Sparse(SparseArray),
}

impl Default for ParameterValue {
    fn default() -> Self {
        ParameterValue::Host(DenseArray::empty())
    }
}

impl From<DenseArray> for ParameterValue {
    fn from(array: DenseArray) -> Self {
        ParameterValue::Host(array)
    }
}

impl ParameterValue {
    pub fn shape(&self) -> &[usize] {
        match self {
            ParameterValue::Host(array) => array.shape(),
            ParameterValue::Device { array, .. } => array.shape(),
            ParameterValue::Sparse(sparse) => sparse.shape(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shape().iter().any(|&dim| dim == 0)
    }

    /// Stored values. Sparse storage yields only its explicit entries.
    pub fn stored_values(&self) -> &[f32] {
        match self {
            ParameterValue::Host(array) => array.data(),
            ParameterValue::Device { array, .. } => array.data(),
            ParameterValue::Sparse(sparse) => sparse.values(),
        }
    }

    /// True if the value is already dense and in host memory.
    pub fn is_host_dense(&self) -> bool {
        matches!(self, ParameterValue::Host(_))
    }

    /// Materialize a dense host copy, gathering from the device if needed.
    pub fn to_host_dense(&self) -> DenseArray {
        match self {
            ParameterValue::Host(array) => array.clone(),
            ParameterValue::Device { array, .. } => array.clone(),
            ParameterValue::Sparse(sparse) => sparse.to_dense(),
        }
    }

    pub fn into_host_dense(self) -> DenseArray {
        match self {
            ParameterValue::Host(array) => array,
            ParameterValue::Device { array, .. } => array,
            ParameterValue::Sparse(sparse) => sparse.to_dense(),
        }
    }
}
