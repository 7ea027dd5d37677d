use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{AsRefStr, Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

/// Findings the chest X-ray model scores.
///
/// Declaration order is the model's output channel order and the row order
/// of the final-layer weight file. Do not reorder.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    EnumCountMacro,
)]
pub enum Condition {
    Atelectasis,
    Cardiomegaly,
    Effusion,
    Infiltration,
    Mass,
    Nodule,
    Pneumonia,
    Pneumothorax,
    Consolidation,
    Edema,
    Emphysema,
    Fibrosis,
    #[strum(to_string = "Pleural Thickening", serialize = "PleuralThickening")]
    PleuralThickening,
    Hernia,
}

impl Condition {
    /// All conditions, in model output order.
    pub fn all() -> Vec<Condition> {
        Condition::iter().collect()
    }

    pub fn count() -> usize {
        Condition::COUNT
    }

    pub fn from_index(idx: usize) -> Option<Condition> {
        Condition::iter().nth(idx)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}
