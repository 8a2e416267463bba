//! Sthiti - Monte Carlo localization on occupancy grids
//!
//! Estimates a robot's 2D pose on a known map by fusing wheel odometry with
//! planar rangefinder scans in a particle filter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 localization/                       │  ← Particle filter
//! │   (models, resampling, histogram, McLrfLocalizer)   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │             grid/          sensors/                 │  ← Map & sensor
//! │   (occupancy, fringe, raycast)  (rangefinder)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! `config/` (YAML settings) and `error` are shared by all layers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sthiti::{LocalizerConfig, McLrfLocalizer, OccupancyGrid, Pose2D, RangefinderProperties};
//!
//! let map = Arc::new(OccupancyGrid::new(200, 200, 0.05)?);
//! let lidar = RangefinderProperties::new(1f32.to_radians(), 360f32.to_radians(), 8.0, Pose2D::identity())?;
//!
//! let mut localizer = McLrfLocalizer::new(map, lidar, LocalizerConfig::load_default()?)?;
//! localizer.init_pose_unknown()?;
//! localizer.update(&odom_delta, &scan)?;
//! println!("{:?}", localizer.pose_mean()?);
//! ```

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Shared: configuration and errors
// ============================================================================
pub mod config;
pub mod error;

// ============================================================================
// Layer 2: Map and sensor geometry (depends on core)
// ============================================================================
pub mod grid;
pub mod sensors;

// ============================================================================
// Layer 3: Localization (depends on all layers)
// ============================================================================
pub mod localization;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::{Point2D, Pose2D};

// Errors and configuration
pub use config::{ConfigLoadError, LocalizerConfig};
pub use error::{LocalizationError, Result};

// Map and sensors
pub use grid::{GridCircleFringeGenerator, GridCoord, OccupancyGrid};
pub use sensors::RangefinderProperties;

// Localization
pub use localization::{
    LikelihoodFieldModel, LocalizerState, McLrfLocalizer, OdometryMotionModel, ParticleFilter,
    ParticleFilterState, PoseHistogram, ResamplingWheel,
};
