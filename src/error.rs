use thiserror::Error;

#[derive(Error, Debug)]
pub enum XRayError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Shape Mismatch ({what}): expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("The image has the incorrect ratio: {width}x{height} (target {target_width}x{target_height})")]
    AspectRatioMismatch {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error("Dimension Mismatch ({what}): expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        what: &'static str,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Length Mismatch: {conditions} conditions, {scores} scores, {cams} cams")]
    LengthMismatch {
        conditions: usize,
        scores: usize,
        cams: usize,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Resource Load Failure: {0}")]
    ResourceLoad(String),

    #[error("Invalid Grid: {0}")]
    InvalidGrid(String),

    #[error("Model Error: {0}")]
    Model(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

impl XRayError {
    /// Cancellation is expected control flow; callers usually swallow it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, XRayError::Cancelled)
    }
}

pub type XrResult<T> = Result<T, XRayError>;
