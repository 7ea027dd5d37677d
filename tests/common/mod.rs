#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use xray_cam::pipeline::{CancelToken, ImageModel};
use xray_cam::{TensorShape, WeightTable, XrResult};

pub fn weight_table(rows: Vec<Vec<f32>>) -> Arc<WeightTable> {
    Arc::new(WeightTable::new(rows).unwrap())
}

/// CSV body with one line per row, comma separated, no header.
pub fn weights_csv(rows: &[Vec<f32>]) -> String {
    rows.iter()
        .map(|r| {
            r.iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reorders a `[row][col][channel]` tensor into `[channel][row][col]`.
pub fn to_channels_first(shape: TensorShape, canonical: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(canonical.len());
    for ch in 0..shape.channels {
        for r in 0..shape.rows {
            for c in 0..shape.cols {
                out.push(canonical[(r * shape.cols + c) * shape.channels + ch]);
            }
        }
    }
    out
}

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Scripted model that counts calls and can cancel a token mid-inference.
pub struct MockModel {
    pub name: String,
    pub outputs: Vec<Vec<f32>>,
    pub calls: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub cancel_during_predict: Option<CancelToken>,
    /// Set while `predict` runs; entering when already set counts an overlap.
    pub busy: Arc<AtomicBool>,
    pub overlaps: Arc<AtomicUsize>,
    pub delay: Option<Duration>,
}

impl MockModel {
    pub fn new(name: &str, outputs: Vec<Vec<f32>>) -> Self {
        Self {
            name: name.to_string(),
            outputs,
            calls: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            cancel_during_predict: None,
            busy: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Holds each `predict` open for `delay` so concurrent callers collide.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cancelling(mut self, token: &CancelToken) -> Self {
        self.cancel_during_predict = Some(token.clone());
        self
    }

    /// Handles to the counters, readable after the model is boxed.
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.calls.clone(), self.closes.clone())
    }
}

impl ImageModel for MockModel {
    fn predict(&mut self, _image: &RgbaImage) -> XrResult<Vec<Vec<f32>>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_during_predict {
            token.cancel();
        }
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.busy.store(false, Ordering::SeqCst);
        Ok(self.outputs.clone())
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
