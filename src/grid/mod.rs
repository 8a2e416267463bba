//! Occupancy grid and grid-geometry helpers.
//!
//! - [`OccupancyGrid`]: boolean grid with metric ↔ cell conversion
//! - [`GridCircleFringeGenerator`]: rings of cells at a fixed distance
//! - [`raycast`]: simulated range readings against the grid

mod coord;
mod fringe;
mod occupancy;
pub mod raycast;

pub use coord::GridCoord;
pub use fringe::GridCircleFringeGenerator;
pub use occupancy::OccupancyGrid;
