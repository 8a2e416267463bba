//! Foundation layer: pose types and angle math.

pub mod math;
pub mod types;

pub use types::{Point2D, Pose2D};
