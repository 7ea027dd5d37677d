use crate::cam::{FlattenOrder, TensorShape};
use crate::consts::*;
use crate::error::{XRayError, XrResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    #[serde(default)]
    pub model: ModelParams,
    #[command(flatten)]
    #[serde(default)]
    pub visual: VisualParams,
    #[command(flatten)]
    #[serde(default)]
    pub results: ResultsParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    pub input_width: u32,
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    pub input_height: u32,

    // Final activation layer
    #[arg(long, default_value_t = DEFAULT_CAM_ROWS)]
    pub cam_rows: usize,
    #[arg(long, default_value_t = DEFAULT_CAM_COLS)]
    pub cam_cols: usize,
    #[arg(long, default_value_t = DEFAULT_CAM_CHANNELS)]
    pub cam_channels: usize,

    #[arg(long, value_enum, default_value_t = FlattenOrder::RowsColsChannels)]
    pub flatten_order: FlattenOrder,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_SIZE,
            input_height: DEFAULT_INPUT_SIZE,
            cam_rows: DEFAULT_CAM_ROWS,
            cam_cols: DEFAULT_CAM_COLS,
            cam_channels: DEFAULT_CAM_CHANNELS,
            flatten_order: FlattenOrder::RowsColsChannels,
        }
    }
}

impl ModelParams {
    pub fn tensor_shape(&self) -> TensorShape {
        TensorShape::new(self.cam_rows, self.cam_cols, self.cam_channels)
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    #[arg(long, default_value_t = DEFAULT_EXP_MAPPING_BASE)]
    pub exp_base: f32,

    /// Comma-separated hex colours (RRGGBB or RRGGBBAA), strongest finding first.
    #[arg(long, default_value = DEFAULT_PALETTE)]
    pub palette: String,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            exp_base: DEFAULT_EXP_MAPPING_BASE,
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

impl VisualParams {
    pub fn get_palette(&self) -> XrResult<Vec<Rgba<u8>>> {
        self.palette
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_hex_color)
            .collect()
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsParams {
    #[arg(long, default_value_t = DEFAULT_MIN_CONDITIONS)]
    pub min_conditions: usize,
    #[arg(long, default_value_t = DEFAULT_MIN_LIKELIHOOD)]
    pub min_likelihood: f32,
}

impl Default for ResultsParams {
    fn default() -> Self {
        Self {
            min_conditions: DEFAULT_MIN_CONDITIONS,
            min_likelihood: DEFAULT_MIN_LIKELIHOOD,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> XrResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Copies every flag the user actually typed from `cli` onto `self`.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(model.input_width);
        update_if_present!(model.input_height);
        update_if_present!(model.cam_rows);
        update_if_present!(model.cam_cols);
        update_if_present!(model.cam_channels);
        update_if_present!(model.flatten_order);

        update_if_present!(visual.exp_base);
        update_if_present!(visual.palette);

        update_if_present!(results.min_conditions);
        update_if_present!(results.min_likelihood);
    }

    pub fn validate(&self) -> XrResult<()> {
        let m = &self.model;
        if m.input_width == 0 || m.input_height == 0 {
            return Err(XRayError::Validation(
                "input size must be non-zero".to_string(),
            ));
        }
        if m.input_width != m.input_height {
            return Err(XRayError::Validation(format!(
                "model input must be square, got {}x{}",
                m.input_width, m.input_height
            )));
        }
        if m.tensor_shape().is_empty() {
            return Err(XRayError::Validation(
                "CAM rows, cols and channels must be non-zero".to_string(),
            ));
        }
        let base = self.visual.exp_base;
        if !(base.is_finite() && base > 0.0 && base != 1.0) {
            return Err(XRayError::Validation(format!(
                "exp_base must be positive and not 1.0, got {}",
                base
            )));
        }
        if self.visual.get_palette()?.is_empty() {
            return Err(XRayError::Validation("palette is empty".to_string()));
        }
        Ok(())
    }
}

/// Parses `RRGGBB` or `RRGGBBAA` (optional leading `#`).
pub fn parse_hex_color(s: &str) -> XrResult<Rgba<u8>> {
    let hex = s.trim_start_matches('#');
    let bad = || XRayError::Validation(format!("invalid colour '{}'", s));

    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(bad());
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());

    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, alpha]))
}
