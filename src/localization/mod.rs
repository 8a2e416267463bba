//! Localization module.
//!
//! Monte Carlo Localization (MCL) of a robot pose within a known map.
//!
//! # Components
//!
//! - [`ParticleFilter`]: generic predict / weigh / resample loop
//! - [`OdometryMotionModel`]: odometry motion model with configurable noise
//! - [`LikelihoodFieldModel`]: likelihood field sensor model for range scans
//! - [`ResamplingWheel`]: weight-proportional resampling
//! - [`PoseHistogram`]: binning of particles into pose hypotheses
//! - [`McLrfLocalizer`]: the above wired together for a rangefinder robot
//!
//! # Example
//!
//! ```ignore
//! use sthiti::localization::McLrfLocalizer;
//!
//! let mut localizer = McLrfLocalizer::new(map, rangefinder, config)?;
//!
//! // Unknown start: spread particles over free space
//! localizer.init_pose_unknown()?;
//!
//! // Fuse odometry and a scan
//! localizer.update(&odom_delta, &scan)?;
//!
//! // Get best estimate
//! let pose = localizer.pose_mean()?;
//! ```

mod estimate;
mod histogram;
mod localizer;
mod motion_model;
mod particle_filter;
mod resampling;
mod sampling;
mod sensor_model;
mod traits;

pub use estimate::{pose_mean, pose_std_dev};
pub use histogram::{BinKey, PoseBin, PoseHistogram};
pub use localizer::{LocalizerState, McLrfLocalizer};
pub use motion_model::{
    OdometryMotionModel, RotTransRot, odometry_to_rot_trans_rot, rot_trans_rot_to_odometry,
};
pub use particle_filter::{ParticleFilter, ParticleFilterState};
pub use resampling::{ResamplingWheel, WheelResampler};
pub use sampling::{gaussian_free_poses, uniform_free_pose, uniform_free_poses};
pub use sensor_model::LikelihoodFieldModel;
pub use traits::{MeasurementModel, PredictionModel, WeightResampler, Weighted, WeightedParticle};
