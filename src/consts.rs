/// Side length of the square image the reference model consumes.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Spatial size of the reference model's final activation layer.
pub const DEFAULT_CAM_ROWS: usize = 7;
pub const DEFAULT_CAM_COLS: usize = 7;

/// Channel depth of the reference model's final activation layer.
pub const DEFAULT_CAM_CHANNELS: usize = 1024;

/// Base of the exponential curve applied to a CAM before colouring.
/// Compresses low activations, keeps separation among high ones.
pub const DEFAULT_EXP_MAPPING_BASE: f32 = 1.1;

/// Results are never truncated above this many entries.
pub const DEFAULT_MIN_CONDITIONS: usize = 3;

/// Likelihood below which results past `DEFAULT_MIN_CONDITIONS` are dropped.
pub const DEFAULT_MIN_LIKELIHOOD: f32 = 0.0;

/// Tolerance used when comparing aspect ratios.
pub const ASPECT_RATIO_EPSILON: f64 = 1e-9;

// Likelihood label thresholds
pub const THRESHOLD_VERY_UNLIKELY: f32 = 0.1;
pub const THRESHOLD_UNLIKELY: f32 = 0.33;
pub const THRESHOLD_UNCERTAIN: f32 = 0.66;
pub const THRESHOLD_LIKELY: f32 = 0.9;

/// Default highlight palette (RGBA hex), strongest finding first.
pub const DEFAULT_PALETTE: &str = "e8175dff,f7a400ff,3a9efdff";
