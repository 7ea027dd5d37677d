use super::cancel::CancelToken;
use super::model::ImageModel;
use crate::cam::{ActivationGrid, CamProcessor};
use crate::error::{XRayError, XrResult};
use crate::score::{decode_scores, ScoreOutput};
use image::RgbaImage;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Output of one analysis, index-aligned with the condition order.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub scores: Vec<ScoreOutput>,
    pub cams: Vec<ActivationGrid>,
}

/// Exclusive handle on one model adapter. Calls are serialized because
/// inference engines are not assumed to be reentrant.
struct ModelSlot {
    name: String,
    model: Mutex<Box<dyn ImageModel>>,
}

impl ModelSlot {
    fn new(model: Box<dyn ImageModel>) -> Self {
        Self {
            name: model.name().to_string(),
            model: Mutex::new(model),
        }
    }

    fn predict(&self, image: &RgbaImage) -> XrResult<Vec<Vec<f32>>> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| XRayError::Model(format!("'{}' lock poisoned", self.name)))?;
        guard.predict(image)
    }

    fn predict_one(&self, image: &RgbaImage) -> XrResult<Vec<f32>> {
        self.predict(image)?
            .into_iter()
            .next()
            .ok_or_else(|| XRayError::Model(format!("'{}' returned no outputs", self.name)))
    }

    fn close(&self) {
        // A poisoned lock still holds the engine; release it anyway.
        let mut guard = match self.model.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.close();
        info!("Released model '{}'", self.name);
    }
}

/// How inference is split across engines.
enum ModelBackend {
    /// One engine emits scores (output 0) and activations (output 1).
    Single(ModelSlot),
    /// Separate score and CAM engines, run concurrently.
    Dual { scores: ModelSlot, cams: ModelSlot },
}

/// Runs inference and decodes raw outputs into scores and CAMs.
///
/// Owns its model adapters for its whole lifetime. Call `shutdown` when the
/// host tears down; dropping without it still releases the adapters.
pub struct AnalysisPipeline {
    backend: ModelBackend,
    cam_processor: CamProcessor,
    input_size: u32,
    closed: bool,
}

impl AnalysisPipeline {
    /// Pipeline over one engine producing both tensors per call.
    pub fn single(model: Box<dyn ImageModel>, cam_processor: CamProcessor, input_size: u32) -> Self {
        info!("🧠 Analysis pipeline ready (single model '{}')", model.name());
        Self {
            backend: ModelBackend::Single(ModelSlot::new(model)),
            cam_processor,
            input_size,
            closed: false,
        }
    }

    /// Pipeline over separate score and CAM engines.
    pub fn dual(
        score_model: Box<dyn ImageModel>,
        cam_model: Box<dyn ImageModel>,
        cam_processor: CamProcessor,
        input_size: u32,
    ) -> Self {
        info!(
            "🧠 Analysis pipeline ready (score model '{}', CAM model '{}')",
            score_model.name(),
            cam_model.name()
        );
        Self {
            backend: ModelBackend::Dual {
                scores: ModelSlot::new(score_model),
                cams: ModelSlot::new(cam_model),
            },
            cam_processor,
            input_size,
            closed: false,
        }
    }

    /// Side length of the square image `analyze` accepts.
    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn is_dual(&self) -> bool {
        matches!(self.backend, ModelBackend::Dual { .. })
    }

    pub fn cam_processor(&self) -> &CamProcessor {
        &self.cam_processor
    }

    pub fn validate_image_dimensions(&self, image: &RgbaImage) -> XrResult<()> {
        if image.dimensions() != (self.input_size, self.input_size) {
            return Err(XRayError::DimensionMismatch {
                what: "model input",
                expected_width: self.input_size,
                expected_height: self.input_size,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(())
    }

    /// Scores `image` and builds one CAM per condition.
    ///
    /// The image must already be `input_size` square. `cancel` is checked
    /// before and after every inference and decode step.
    pub fn analyze(&self, image: &RgbaImage, cancel: &CancelToken) -> XrResult<Analysis> {
        self.validate_image_dimensions(image)?;

        let result = match &self.backend {
            ModelBackend::Single(model) => self.analyze_single(model, image, cancel),
            ModelBackend::Dual { scores, cams } => self.analyze_dual(scores, cams, image, cancel),
        };

        if let Err(XRayError::Cancelled) = &result {
            debug!("Analysis cancelled");
        }
        result
    }

    fn analyze_single(
        &self,
        model: &ModelSlot,
        image: &RgbaImage,
        cancel: &CancelToken,
    ) -> XrResult<Analysis> {
        cancel.check()?;
        let outputs = model.predict(image)?;
        debug!("Inference finished ({} outputs)", outputs.len());

        if outputs.len() < 2 {
            return Err(XRayError::ShapeMismatch {
                what: "model outputs",
                expected: 2,
                actual: outputs.len(),
            });
        }

        cancel.check()?;
        let scores = self.generate_scores(&outputs[0])?;

        cancel.check()?;
        let cams = self.cam_processor.build_cams(&outputs[1])?;

        cancel.check()?;
        Ok(Analysis { scores, cams })
    }

    fn analyze_dual(
        &self,
        score_model: &ModelSlot,
        cam_model: &ModelSlot,
        image: &RgbaImage,
        cancel: &CancelToken,
    ) -> XrResult<Analysis> {
        let (scores, cams) = rayon::join(
            || -> XrResult<Vec<ScoreOutput>> {
                cancel.check()?;
                let raw = score_model.predict_one(image)?;
                cancel.check()?;
                let scores = self.generate_scores(&raw)?;
                cancel.check()?;
                Ok(scores)
            },
            || -> XrResult<Vec<ActivationGrid>> {
                cancel.check()?;
                let raw = cam_model.predict_one(image)?;
                cancel.check()?;
                let cams = self.cam_processor.build_cams(&raw)?;
                cancel.check()?;
                Ok(cams)
            },
        );

        Ok(Analysis {
            scores: scores?,
            cams: cams?,
        })
    }

    /// Copies the score tensor 1:1. Out-of-range likelihoods pass through.
    fn generate_scores(&self, raw: &[f32]) -> XrResult<Vec<ScoreOutput>> {
        let expected = self.cam_processor.num_conditions();
        if raw.len() != expected {
            return Err(XRayError::ShapeMismatch {
                what: "score tensor length",
                expected,
                actual: raw.len(),
            });
        }
        Ok(decode_scores(raw))
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        match &self.backend {
            ModelBackend::Single(model) => model.close(),
            ModelBackend::Dual { scores, cams } => {
                scores.close();
                cams.close();
            }
        }
        self.closed = true;
    }

    /// Releases every model adapter exactly once.
    pub fn shutdown(mut self) {
        self.release();
    }
}

impl Drop for AnalysisPipeline {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Analysis pipeline dropped without shutdown; releasing models");
            self.release();
        }
    }
}
