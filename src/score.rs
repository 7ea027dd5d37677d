use crate::consts::{
    THRESHOLD_LIKELY, THRESHOLD_UNCERTAIN, THRESHOLD_UNLIKELY, THRESHOLD_VERY_UNLIKELY,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Model likelihood for a single condition.
///
/// Values are passed through exactly as the model emitted them. Nothing here
/// clamps to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ScoreOutput {
    pub likelihood: f32,
}

impl ScoreOutput {
    pub fn new(likelihood: f32) -> Self {
        Self { likelihood }
    }

    pub fn label(&self) -> LikelihoodLabel {
        LikelihoodLabel::from_likelihood(self.likelihood)
    }

    /// Total order on likelihood, usable for sorting.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.likelihood.total_cmp(&other.likelihood)
    }
}

impl fmt::Display for ScoreOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.likelihood)
    }
}

/// Wraps a raw score tensor, index-aligned with the condition order.
pub fn decode_scores(raw: &[f32]) -> Vec<ScoreOutput> {
    raw.iter().copied().map(ScoreOutput::new).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum LikelihoodLabel {
    #[strum(to_string = "Very Unlikely")]
    VeryUnlikely,
    #[strum(to_string = "Unlikely")]
    Unlikely,
    #[strum(to_string = "Uncertain")]
    Uncertain,
    #[strum(to_string = "Likely")]
    Likely,
    #[strum(to_string = "Very Likely")]
    VeryLikely,
}

impl LikelihoodLabel {
    /// Upper bounds are inclusive except for the first bucket.
    pub fn from_likelihood(likelihood: f32) -> Self {
        if likelihood < THRESHOLD_VERY_UNLIKELY {
            LikelihoodLabel::VeryUnlikely
        } else if likelihood <= THRESHOLD_UNLIKELY {
            LikelihoodLabel::Unlikely
        } else if likelihood <= THRESHOLD_UNCERTAIN {
            LikelihoodLabel::Uncertain
        } else if likelihood <= THRESHOLD_LIKELY {
            LikelihoodLabel::Likely
        } else {
            LikelihoodLabel::VeryLikely
        }
    }
}
