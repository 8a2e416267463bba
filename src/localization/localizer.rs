//! Monte Carlo localizer for a robot with a planar rangefinder.
//!
//! Wires an [`OdometryMotionModel`] and a [`LikelihoodFieldModel`] into a
//! [`ParticleFilter`] over [`Pose2D`] and exposes pose estimates.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sthiti::{LocalizerConfig, McLrfLocalizer};
//!
//! let mut localizer = McLrfLocalizer::new(Arc::new(map), rangefinder, LocalizerConfig::default())?;
//! localizer.init_pose_unknown()?;
//!
//! loop {
//!     localizer.update(&odometry_delta, &scan)?;
//!     let pose = localizer.pose_mean()?;
//! }
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::LocalizerConfig;
use crate::core::Pose2D;
use crate::error::{LocalizationError, Result};
use crate::grid::OccupancyGrid;
use crate::sensors::RangefinderProperties;

use super::estimate::{pose_mean, pose_std_dev};
use super::histogram::PoseHistogram;
use super::motion_model::OdometryMotionModel;
use super::particle_filter::{ParticleFilter, ParticleFilterState};
use super::sampling::{gaussian_free_poses, uniform_free_poses};
use super::sensor_model::LikelihoodFieldModel;

/// Lifecycle of a [`McLrfLocalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizerState {
    /// No particles yet; call an `init_pose*` method.
    Uninitialized,
    /// Particles exist and updates are accepted.
    Initialized,
}

/// Particle-filter localizer on an occupancy grid.
#[derive(Debug)]
pub struct McLrfLocalizer {
    config: LocalizerConfig,
    map: Arc<OccupancyGrid>,
    rangefinder: RangefinderProperties,
    sparse_rangefinder: RangefinderProperties,
    filter: ParticleFilter<Pose2D, [f32]>,
    state: LocalizerState,
}

impl McLrfLocalizer {
    /// Create a localizer. Randomness is seeded from `config.seed`, or from
    /// the OS when no seed is set.
    pub fn new(
        map: Arc<OccupancyGrid>,
        rangefinder: RangefinderProperties,
        config: LocalizerConfig,
    ) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(map, rangefinder, config, rng)
    }

    /// Create a localizer drawing all randomness from `rng`.
    pub fn with_rng(
        map: Arc<OccupancyGrid>,
        rangefinder: RangefinderProperties,
        config: LocalizerConfig,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;

        let sparse_rangefinder = rangefinder.sparsify(config.sensor.beam_skip)?;
        let motion = OdometryMotionModel::from_config(map.clone(), &config.motion)?
            .with_max_draw_attempts(config.max_draw_attempts_per_particle);
        let sensor =
            LikelihoodFieldModel::from_config(map.clone(), sparse_rangefinder, &config.sensor)?;

        log::info!(
            "Localizer: {} particles, {} of {} beams, map {}x{} @ {}m",
            config.particles_number,
            sparse_rangefinder.beams_number(),
            rangefinder.beams_number(),
            map.size_in_cells().0,
            map.size_in_cells().1,
            map.cell_size()
        );

        Ok(Self {
            filter: ParticleFilter::new(Box::new(motion), Box::new(sensor), rng),
            config,
            map,
            rangefinder,
            sparse_rangefinder,
            state: LocalizerState::Uninitialized,
        })
    }

    /// Global localization: spread particles uniformly over free space.
    pub fn init_pose_unknown(&mut self) -> Result<()> {
        let particles = uniform_free_poses(
            &self.map,
            self.config.particles_number,
            self.config.max_draw_attempts_per_particle,
            self.filter.rng_mut(),
        )?;
        self.filter.init(particles)?;
        self.state = LocalizerState::Initialized;

        log::info!(
            "Initialized {} particles uniformly over free space",
            self.config.particles_number
        );
        Ok(())
    }

    /// Pose tracking: draw particles around `mean` with per-axis `std_dev`,
    /// keeping only those in free space.
    pub fn init_pose(&mut self, mean: &Pose2D, std_dev: &Pose2D) -> Result<()> {
        let particles = gaussian_free_poses(
            &self.map,
            mean,
            std_dev,
            self.config.particles_number,
            self.config.max_draw_attempts_per_particle,
            self.filter.rng_mut(),
        )?;
        self.filter.init(particles)?;
        self.state = LocalizerState::Initialized;

        log::info!(
            "Initialized {} particles around ({:.2}, {:.2}, {:.1}°)",
            self.config.particles_number,
            mean.x,
            mean.y,
            mean.theta.to_degrees()
        );
        Ok(())
    }

    /// Fuse one robot-frame odometry delta and one full scan.
    ///
    /// `scan` must hold one reading per beam of the rangefinder given at
    /// construction. If every particle becomes implausible the localizer
    /// falls back to global localization.
    pub fn update(&mut self, odometry_delta: &Pose2D, scan: &[f32]) -> Result<()> {
        if self.state != LocalizerState::Initialized {
            return Err(LocalizationError::NotInitialized);
        }
        let expected = self.rangefinder.beams_number();
        if scan.len() != expected {
            return Err(LocalizationError::ScanLengthMismatch {
                expected,
                actual: scan.len(),
            });
        }

        let readings = RangefinderProperties::sparsify_readings(scan, self.config.sensor.beam_skip);
        match self.filter.update(odometry_delta, &readings) {
            Err(LocalizationError::WeightCollapse) => {
                log::warn!("All particle weights collapsed, restarting global localization");
                self.init_pose_unknown()
            }
            other => other,
        }
    }

    /// Mean pose of the particle set.
    pub fn pose_mean(&self) -> Result<Pose2D> {
        pose_mean(self.filter.particles()).ok_or(LocalizationError::NotInitialized)
    }

    /// Per-axis standard deviation of the particle set.
    pub fn pose_std_dev(&self) -> Result<Pose2D> {
        pose_std_dev(self.filter.particles()).ok_or(LocalizationError::NotInitialized)
    }

    /// Pose hypotheses, strongest first: the mean pose of each histogram
    /// bin, ordered by how many particles fell into it.
    pub fn pose_candidates(&self) -> Result<Vec<(Pose2D, usize)>> {
        if self.state != LocalizerState::Initialized {
            return Err(LocalizationError::NotInitialized);
        }
        let histogram = PoseHistogram::build(
            &self.map,
            self.config.histogram.theta_bin_size,
            self.filter.particles(),
        )?;
        Ok(histogram
            .ranked_bins()
            .into_iter()
            .map(|bin| (bin.pose_mean(), bin.len()))
            .collect())
    }

    /// Current particle set (empty before initialization).
    pub fn particles(&self) -> &[Pose2D] {
        self.filter.particles()
    }

    pub fn state(&self) -> LocalizerState {
        self.state
    }

    /// Diagnostics of the last filter update.
    pub fn filter_state(&self) -> &ParticleFilterState {
        self.filter.state()
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    pub fn map(&self) -> &Arc<OccupancyGrid> {
        &self.map
    }

    /// Rangefinder as given at construction (full beam set).
    pub fn rangefinder(&self) -> &RangefinderProperties {
        &self.rangefinder
    }

    /// Rangefinder after `beam_skip` sparsification, as used for weighting.
    pub fn sparse_rangefinder(&self) -> &RangefinderProperties {
        &self.sparse_rangefinder
    }
}
