//! Sensor descriptions.

mod rangefinder;

pub use rangefinder::RangefinderProperties;
