//! Rangefinder beam geometry.
//!
//! A planar rangefinder sweeps `angular_range` radians in steps of
//! `angular_resolution`, symmetric about the sensor's forward axis, and
//! reports one range per beam:
//!
//! ```text
//!              beam 0 ........ beam n-1
//!  angle  -range/2   +res   ...   +range/2
//!  count  n = angular_range / angular_resolution + 1
//! ```
//!
//! A reading equal to `max_range` means the beam had no return.

use serde::{Deserialize, Serialize};

use crate::core::{Point2D, Pose2D};
use crate::error::{LocalizationError, Result};

/// Largest distance of `angular_range / angular_resolution` from a whole
/// number of steps, in steps.
const BEAM_STEP_TOLERANCE: f32 = 1e-3;

/// Geometry of a planar rangefinder mounted on the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangefinderProperties {
    angular_resolution: f32,
    angular_range: f32,
    max_range: f32,
    origin: Pose2D,
    first_beam_angle: f32,
}

impl RangefinderProperties {
    /// Create rangefinder properties.
    ///
    /// # Arguments
    /// * `angular_resolution` - Angle between consecutive beams (radians, > 0)
    /// * `angular_range` - Total swept angle (radians, ≥ 0, a whole number of resolution steps)
    /// * `max_range` - Maximum measurable range (meters, > 0)
    /// * `origin` - Sensor mount pose in the robot frame
    pub fn new(
        angular_resolution: f32,
        angular_range: f32,
        max_range: f32,
        origin: Pose2D,
    ) -> Result<Self> {
        if !(angular_resolution > 0.0 && angular_resolution.is_finite()) {
            return Err(LocalizationError::InvalidRangefinder(format!(
                "angular resolution must be positive, got {}",
                angular_resolution
            )));
        }
        if !(angular_range >= 0.0 && angular_range.is_finite()) {
            return Err(LocalizationError::InvalidRangefinder(format!(
                "angular range must be non-negative, got {}",
                angular_range
            )));
        }
        if !(max_range > 0.0 && max_range.is_finite()) {
            return Err(LocalizationError::InvalidRangefinder(format!(
                "max range must be positive, got {}",
                max_range
            )));
        }

        let steps = angular_range / angular_resolution;
        if (steps - steps.round()).abs() > BEAM_STEP_TOLERANCE {
            return Err(LocalizationError::InvalidRangefinder(format!(
                "angular range {} is not a multiple of the resolution {}",
                angular_range, angular_resolution
            )));
        }

        Ok(Self {
            angular_resolution,
            angular_range,
            max_range,
            origin,
            first_beam_angle: -angular_range / 2.0,
        })
    }

    /// Angle between consecutive beams (radians).
    #[inline]
    pub fn angular_resolution(&self) -> f32 {
        self.angular_resolution
    }

    /// Total swept angle (radians).
    #[inline]
    pub fn angular_range(&self) -> f32 {
        self.angular_range
    }

    /// Maximum measurable range (meters).
    #[inline]
    pub fn max_range(&self) -> f32 {
        self.max_range
    }

    /// Sensor mount pose in the robot frame.
    #[inline]
    pub fn origin(&self) -> Pose2D {
        self.origin
    }

    /// Number of beams (readings) per scan.
    ///
    /// The step count is rounded to absorb float error; construction
    /// guarantees it is within `1e-3` of a whole number.
    #[inline]
    pub fn beams_number(&self) -> usize {
        (self.angular_range / self.angular_resolution).round() as usize + 1
    }

    /// Beam direction in the sensor frame (radians).
    #[inline]
    pub fn beam_angle(&self, index: usize) -> f32 {
        self.first_beam_angle + index as f32 * self.angular_resolution
    }

    /// Is this reading a "no return"?
    #[inline]
    pub fn is_no_return(&self, range: f32) -> bool {
        range >= self.max_range
    }

    /// Endpoint of beam `index` at `range`, expressed in the robot frame.
    pub fn beam_vector(&self, index: usize, range: f32) -> Point2D {
        let (sin_a, cos_a) = self.beam_angle(index).sin_cos();
        self.origin
            .transform_point(&Point2D::new(range * cos_a, range * sin_a))
    }

    /// Keep every `factor`-th beam.
    ///
    /// The first beam is preserved, so beam `i` of the result is beam
    /// `i · factor` of `self`. Pair with [`Self::sparsify_readings`].
    pub fn sparsify(&self, factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(LocalizationError::InvalidParameter(
                "sparsification factor must be at least 1".to_string(),
            ));
        }
        if factor == 1 {
            return Ok(*self);
        }

        let beams = (self.beams_number() - 1) / factor + 1;
        let resolution = self.angular_resolution * factor as f32;

        Ok(Self {
            angular_resolution: resolution,
            angular_range: (beams - 1) as f32 * resolution,
            max_range: self.max_range,
            origin: self.origin,
            first_beam_angle: self.first_beam_angle,
        })
    }

    /// Select the readings matching [`Self::sparsify`] with the same factor.
    pub fn sparsify_readings(readings: &[f32], factor: usize) -> Vec<f32> {
        readings.iter().step_by(factor.max(1)).copied().collect()
    }
}
