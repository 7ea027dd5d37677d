use super::grid::ActivationGrid;
use super::weights::WeightTable;
use crate::error::{XRayError, XrResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Axis order a model uses when flattening its activation tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FlattenOrder {
    /// `[row][col][channel]`, spatial position outermost (TensorFlow style).
    RowsColsChannels,
    /// `[channel][row][col]`, channel outermost (CoreML style).
    ChannelsRowsCols,
}

/// Dimensions of the final activation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorShape {
    pub rows: usize,
    pub cols: usize,
    pub channels: usize,
}

impl TensorShape {
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense `rows x cols x channels` feature map, always in canonical order.
pub struct FeatureMap {
    shape: TensorShape,
    data: Vec<f32>,
}

impl FeatureMap {
    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize {
        (row * self.shape.cols + col) * self.shape.channels
    }

    /// All channel activations at one spatial position.
    #[inline(always)]
    pub fn pixel(&self, row: usize, col: usize) -> &[f32] {
        let start = self.offset(row, col);
        &self.data[start..start + self.shape.channels]
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }
}

/// Turns a raw activation tensor into one CAM per condition.
pub struct CamProcessor {
    order: FlattenOrder,
    shape: TensorShape,
    weights: Arc<WeightTable>,
}

impl CamProcessor {
    pub fn new(order: FlattenOrder, shape: TensorShape, weights: Arc<WeightTable>) -> XrResult<Self> {
        if shape.is_empty() {
            return Err(XRayError::Validation(format!(
                "tensor shape must be non-empty, got {}x{}x{}",
                shape.rows, shape.cols, shape.channels
            )));
        }
        if weights.channels() != shape.channels {
            return Err(XRayError::ShapeMismatch {
                what: "weight table channels",
                expected: shape.channels,
                actual: weights.channels(),
            });
        }
        Ok(Self {
            order,
            shape,
            weights,
        })
    }

    pub fn order(&self) -> FlattenOrder {
        self.order
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    pub fn weights(&self) -> &Arc<WeightTable> {
        &self.weights
    }

    /// Number of grids `build_cams` produces.
    pub fn num_conditions(&self) -> usize {
        self.weights.len()
    }

    /// Source dimensions in flattened order.
    fn source_dims(&self) -> (usize, usize, usize) {
        let s = self.shape;
        match self.order {
            FlattenOrder::RowsColsChannels => (s.rows, s.cols, s.channels),
            FlattenOrder::ChannelsRowsCols => (s.channels, s.rows, s.cols),
        }
    }

    /// Maps a source index triple to (row, col, channel).
    #[inline(always)]
    fn canonical_index(&self, d1: usize, d2: usize, d3: usize) -> (usize, usize, usize) {
        match self.order {
            FlattenOrder::RowsColsChannels => (d1, d2, d3),
            FlattenOrder::ChannelsRowsCols => (d2, d3, d1),
        }
    }

    /// Copies the model output into a canonical `rows x cols x channels` map.
    pub fn feature_map(&self, raw: &[f32]) -> XrResult<FeatureMap> {
        let expected = self.shape.len();
        if raw.len() != expected {
            return Err(XRayError::ShapeMismatch {
                what: "activation tensor length",
                expected,
                actual: raw.len(),
            });
        }

        let (dim1, dim2, dim3) = self.source_dims();
        let stride1 = dim2 * dim3;
        let stride2 = dim3;

        let s = self.shape;
        let mut data = vec![0.0f32; expected];
        for d1 in 0..dim1 {
            for d2 in 0..dim2 {
                for d3 in 0..dim3 {
                    let src = d1 * stride1 + d2 * stride2 + d3;
                    let (row, col, channel) = self.canonical_index(d1, d2, d3);
                    data[(row * s.cols + col) * s.channels + channel] = raw[src];
                }
            }
        }

        Ok(FeatureMap { shape: s, data })
    }

    /// One CAM per weight row: a per-pixel dot product across channels.
    pub fn build_cams(&self, raw: &[f32]) -> XrResult<Vec<ActivationGrid>> {
        let features = self.feature_map(raw)?;

        let cams = (0..self.weights.len())
            .into_par_iter()
            .map(|idx| cam_for(&features, self.weights.row(idx)))
            .collect::<XrResult<Vec<_>>>()?;

        debug!(
            "Built {} CAMs ({}x{} from {} channels)",
            cams.len(),
            self.shape.rows,
            self.shape.cols,
            self.shape.channels
        );
        Ok(cams)
    }
}

fn cam_for(features: &FeatureMap, weights: &[f32]) -> XrResult<ActivationGrid> {
    let s = features.shape();
    if weights.len() != s.channels {
        return Err(XRayError::ShapeMismatch {
            what: "condition weight vector",
            expected: s.channels,
            actual: weights.len(),
        });
    }

    let mut cells = Vec::with_capacity(s.rows * s.cols);
    for row in 0..s.rows {
        for col in 0..s.cols {
            let value = features
                .pixel(row, col)
                .iter()
                .zip(weights)
                .fold(0.0f32, |acc, (a, w)| acc + a * w);
            cells.push(value);
        }
    }
    ActivationGrid::new(s.rows, s.cols, cells)
}
