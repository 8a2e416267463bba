//! Core data types for localization.

mod pose;

pub use pose::{Point2D, Pose2D};
