pub mod cam;
pub mod condition;
pub mod config;
pub mod consts;
pub mod error;
pub mod imaging;
pub mod pipeline;
pub mod results;
pub mod score;
// cmd and reports are binary modules (declared in main.rs).

pub use self::cam::{ActivationGrid, CamProcessor, FlattenOrder, TensorShape, WeightTable};
pub use self::condition::Condition;
pub use self::error::{XRayError, XrResult};
pub use self::results::{build_results, ConditionResult, ResultsPolicy};
pub use self::score::{LikelihoodLabel, ScoreOutput};
