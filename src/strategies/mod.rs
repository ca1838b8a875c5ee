pub mod detector;
pub mod estimator;
pub mod quality;

pub use detector::DealDetector;
pub use estimator::{EstimatorError, PriceModel};
pub use quality::QualityFilter;
