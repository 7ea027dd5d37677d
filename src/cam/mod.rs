pub mod grid;
pub mod processor;
pub mod weights;

pub use self::grid::ActivationGrid;
pub use self::processor::{CamProcessor, FeatureMap, FlattenOrder, TensorShape};
pub use self::weights::WeightTable;
