use crate::error::{XRayError, XrResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `rows x cols` grid of activation values (one Class Activation Map).
///
/// Stored row-major. Always rectangular and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct ActivationGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

/// Unchecked wire form; deserialization goes through `ActivationGrid::new`.
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TryFrom<RawGrid> for ActivationGrid {
    type Error = XRayError;

    fn try_from(raw: RawGrid) -> XrResult<Self> {
        Self::new(raw.rows, raw.cols, raw.data)
    }
}

impl ActivationGrid {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> XrResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(XRayError::InvalidGrid(format!(
                "grid must be non-empty, got {}x{}",
                rows, cols
            )));
        }
        if data.len() != rows * cols {
            return Err(XRayError::ShapeMismatch {
                what: "activation grid data",
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a grid from nested rows, rejecting ragged input.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> XrResult<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(XRayError::InvalidGrid(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), cols, data)
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major view of every cell.
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Applies `f` to every cell, keeping the shape.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Linearly rescales the grid into [0, 1] using its own min and max.
    ///
    /// A flat grid (max == min) has no hot spot and normalizes to all zeros.
    pub fn normalize(&self) -> Self {
        let (min, max) = self.min_max();
        let range = max - min;
        if range == 0.0 || !range.is_finite() {
            return self.map(|_| 0.0);
        }
        self.map(|v| (v - min) / range)
    }
}

impl fmt::Display for ActivationGrid {
    /// One line per row, 7 decimals per cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            for v in row {
                write!(f, "{:.7} ", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
