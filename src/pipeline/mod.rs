pub mod cancel;
pub mod client;
pub mod model;
pub mod overlay;
pub mod runner;

pub use self::cancel::CancelToken;
pub use self::client::{Analysis, AnalysisPipeline};
pub use self::model::{extract_pixel_data, ImageModel, Recording, ReplayModel};
pub use self::overlay::{OverlaySurface, Ticket};
