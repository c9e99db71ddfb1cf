//! Cluster membership input.
//!
//! Values are coerced with a single rule: any finite nonzero value (negative
//! included) marks the sample as a member of the node, `0.0` and `-0.0` do
//! not. Non-finite values are rejected as malformed.

use ndarray::{Array2, ArrayView2};

use crate::error::{GraphError, Result};

/// Largest `nodes x max(samples, 1)` a sparse shape may declare.
pub const MAX_SPARSE_ENTRIES: usize = u32::MAX as usize;

/// Binary (clusters x samples) membership matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipMatrix {
    bins: Array2<u8>,
}

impl MembershipMatrix {
    /// Builds a membership matrix from dense rows.
    ///
    /// Zero rows yield a `0 x 0` matrix.
    ///
    /// # Errors
    /// Returns [`GraphError::MalformedInput`] if rows have differing lengths or
    /// contain a non-finite value.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let num_samples = rows.first().map_or(0, |row| row.as_ref().len());
        let mut flat = Vec::with_capacity(rows.len() * num_samples);

        for (node, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != num_samples {
                return Err(GraphError::malformed(format!(
                    "row {node} has {} samples, expected {num_samples}",
                    row.len()
                )));
            }
            for (sample, &value) in row.iter().enumerate() {
                flat.push(coerce(value, node, sample)?);
            }
        }

        let bins = Array2::from_shape_vec((rows.len(), num_samples), flat)
            .map_err(|error| GraphError::malformed(error.to_string()))?;
        Ok(Self { bins })
    }

    /// Builds a membership matrix from a numeric 2-D array.
    ///
    /// # Errors
    /// Returns [`GraphError::MalformedInput`] if any entry is non-finite.
    pub fn from_array(values: ArrayView2<'_, f64>) -> Result<Self> {
        let mut bins = Array2::zeros(values.raw_dim());
        for ((node, sample), &value) in values.indexed_iter() {
            bins[[node, sample]] = coerce(value, node, sample)?;
        }
        Ok(Self { bins })
    }

    /// Builds a membership matrix from sparse `(row, col)` coordinates.
    ///
    /// When `values` is `None` every listed coordinate is a member. Repeated
    /// coordinates are merged.
    ///
    /// # Errors
    /// Returns [`GraphError::MalformedInput`] if the shape exceeds
    /// [`MAX_SPARSE_ENTRIES`], the coordinate vectors differ in length, a
    /// coordinate is out of bounds, or a value is non-finite.
    pub fn from_triplets(
        shape: (usize, usize),
        rows: &[usize],
        cols: &[usize],
        values: Option<&[f64]>,
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(GraphError::malformed(format!(
                "sparse rows ({}) and cols ({}) differ in length",
                rows.len(),
                cols.len()
            )));
        }
        if let Some(values) = values {
            if values.len() != rows.len() {
                return Err(GraphError::malformed(format!(
                    "sparse values ({}) and coordinates ({}) differ in length",
                    values.len(),
                    rows.len()
                )));
            }
        }

        let (num_nodes, num_samples) = shape;
        // Zero-sample shapes still cost one entry per node downstream.
        let declared = num_nodes.checked_mul(num_samples.max(1));
        if declared.is_none_or(|entries| entries > MAX_SPARSE_ENTRIES) {
            return Err(GraphError::malformed(format!(
                "sparse shape ({num_nodes}, {num_samples}) exceeds {MAX_SPARSE_ENTRIES} entries"
            )));
        }
        let mut bins = Array2::zeros(shape);
        for (position, (&node, &sample)) in rows.iter().zip(cols).enumerate() {
            if node >= num_nodes || sample >= num_samples {
                return Err(GraphError::malformed(format!(
                    "sparse entry ({node}, {sample}) lies outside shape \
                     ({num_nodes}, {num_samples})"
                )));
            }
            let value = values.map_or(1.0, |values| values[position]);
            if coerce(value, node, sample)? == 1 {
                bins[[node, sample]] = 1;
            }
        }
        Ok(Self { bins })
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.bins.nrows()
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.bins.ncols()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of (node, sample) memberships.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.bins.iter().filter(|&&bit| bit != 0).count()
    }

    /// Fraction of set entries, `0.0` for an empty matrix.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn density(&self) -> f64 {
        if self.bins.is_empty() {
            0.0
        } else {
            self.nnz() as f64 / self.bins.len() as f64
        }
    }

    /// 0/1 view of the matrix.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.bins.view()
    }

    /// Iterates over `(node, sample)` coordinates of every membership, row-major.
    pub fn members(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bins
            .indexed_iter()
            .filter(|(_, bit)| **bit != 0)
            .map(|(coordinate, _)| coordinate)
    }
}

fn coerce(value: f64, node: usize, sample: usize) -> Result<u8> {
    if !value.is_finite() {
        return Err(GraphError::malformed(format!(
            "non-finite membership value {value} at ({node}, {sample})"
        )));
    }
    Ok(u8::from(value != 0.0))
}
