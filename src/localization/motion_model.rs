//! Odometry-based motion model for the particle filter.
//!
//! Implements the odometry motion model from Probabilistic Robotics
//! (Thrun et al.). An odometry delta is decomposed into:
//! 1. Initial rotation to face the target
//! 2. Translation toward the target
//! 3. Final rotation to match the target heading
//!
//! Each component is perturbed with zero-mean Gaussian noise whose
//! standard deviation grows with the size of the motion:
//!
//! ```text
//! σ_rot1  = a1·|rot1| + a2·trans
//! σ_trans = b1·trans  + b2·(|rot1| + |rot2|)
//! σ_rot2  = a1·|rot2| + a2·trans
//! ```
//!
//! Odometry deltas are expressed in the robot frame; each particle rotates
//! the delta by its own bearing before applying it.

use std::sync::Arc;

use rand::RngCore;
use rand_distr::{Distribution, Normal};

use crate::config::MotionSection;
use crate::core::math::normalize_angle;
use crate::core::{Point2D, Pose2D};
use crate::error::{LocalizationError, Result};
use crate::grid::OccupancyGrid;

use super::sampling::uniform_free_pose;
use super::traits::PredictionModel;

/// Draws allowed when replacing a particle that moved into an obstacle.
const DEFAULT_MAX_DRAW_ATTEMPTS: usize = 1000;

/// Translation below which the initial rotation is undefined (meters).
const MIN_TRANSLATION: f32 = 1e-6;

/// A motion decomposed into rotation, translation, rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotTransRot {
    /// Rotation to face the direction of travel (radians, [-π, π]).
    pub rot1: f32,
    /// Distance travelled (meters).
    pub trans: f32,
    /// Rotation after travelling (radians, [-π, π]).
    pub rot2: f32,
}

/// Decompose a map-frame motion `(translation, rotation)` made from
/// `bearing` into rot1/trans/rot2.
pub fn odometry_to_rot_trans_rot(translation: Point2D, rotation: f32, bearing: f32) -> RotTransRot {
    let trans = translation.length();
    let rot1 = if trans < MIN_TRANSLATION {
        0.0
    } else {
        normalize_angle(translation.y.atan2(translation.x) - bearing)
    };
    let rot2 = normalize_angle(rotation - rot1);

    RotTransRot { rot1, trans, rot2 }
}

/// Recompose rot1/trans/rot2 made from `bearing` into a map-frame
/// `(translation, rotation)`.
pub fn rot_trans_rot_to_odometry(motion: &RotTransRot, bearing: f32) -> (Point2D, f32) {
    let (sin, cos) = (bearing + motion.rot1).sin_cos();
    (
        Point2D::new(motion.trans * cos, motion.trans * sin),
        motion.rot1 + motion.rot2,
    )
}

/// Odometry motion model.
#[derive(Debug, Clone)]
pub struct OdometryMotionModel {
    map: Arc<OccupancyGrid>,
    rot_noise_coeffs: [f32; 2],
    trans_noise_coeffs: [f32; 2],
    max_draw_attempts: usize,
}

impl OdometryMotionModel {
    /// Create a motion model.
    ///
    /// # Arguments
    /// * `map` - Map used to reject poses inside obstacles
    /// * `rot_noise_coeffs` - [rotation noise from rotation (rad/rad), from translation (rad/m)]
    /// * `trans_noise_coeffs` - [translation noise from translation (m/m), from rotation (m/rad)]
    pub fn new(
        map: Arc<OccupancyGrid>,
        rot_noise_coeffs: [f32; 2],
        trans_noise_coeffs: [f32; 2],
    ) -> Result<Self> {
        for &c in rot_noise_coeffs.iter().chain(&trans_noise_coeffs) {
            if !(c >= 0.0 && c.is_finite()) {
                return Err(LocalizationError::InvalidParameter(format!(
                    "noise coefficients must be non-negative, got {}",
                    c
                )));
            }
        }

        Ok(Self {
            map,
            rot_noise_coeffs,
            trans_noise_coeffs,
            max_draw_attempts: DEFAULT_MAX_DRAW_ATTEMPTS,
        })
    }

    /// Create a motion model from a configuration section.
    pub fn from_config(map: Arc<OccupancyGrid>, config: &MotionSection) -> Result<Self> {
        Self::new(map, config.rot_noise_coeffs, config.trans_noise_coeffs)
    }

    /// Cap the draws used to replace a particle that landed in an obstacle.
    pub fn with_max_draw_attempts(mut self, attempts: usize) -> Self {
        self.max_draw_attempts = attempts.max(1);
        self
    }

    pub fn rot_noise_coeffs(&self) -> [f32; 2] {
        self.rot_noise_coeffs
    }

    pub fn trans_noise_coeffs(&self) -> [f32; 2] {
        self.trans_noise_coeffs
    }

    /// Noise standard deviations for a decomposed motion.
    pub fn noise_std_devs(&self, motion: &RotTransRot) -> RotTransRot {
        let [a1, a2] = self.rot_noise_coeffs;
        let [b1, b2] = self.trans_noise_coeffs;
        let rot1 = motion.rot1.abs();
        let rot2 = motion.rot2.abs();

        RotTransRot {
            rot1: a1 * rot1 + a2 * motion.trans,
            trans: b1 * motion.trans + b2 * (rot1 + rot2),
            rot2: a1 * rot2 + a2 * motion.trans,
        }
    }
}

impl PredictionModel<Pose2D, Pose2D> for OdometryMotionModel {
    fn predict_particle_state(
        &self,
        particle: &Pose2D,
        control: &Pose2D,
        rng: &mut dyn RngCore,
    ) -> Pose2D {
        let translation = control.position().rotated(particle.theta);
        let rotation = normalize_angle(control.theta);
        if translation.length() < MIN_TRANSLATION && rotation.abs() < MIN_TRANSLATION {
            return *particle;
        }

        let motion = odometry_to_rot_trans_rot(translation, rotation, particle.theta);
        let sigma = self.noise_std_devs(&motion);
        let noisy = RotTransRot {
            rot1: motion.rot1 + sample_gaussian(rng, sigma.rot1),
            trans: motion.trans + sample_gaussian(rng, sigma.trans),
            rot2: motion.rot2 + sample_gaussian(rng, sigma.rot2),
        };

        let (delta, turn) = rot_trans_rot_to_odometry(&noisy, particle.theta);
        let predicted = Pose2D::new(
            particle.x + delta.x,
            particle.y + delta.y,
            particle.theta + turn,
        );

        if !self.map.is_occupied_at(predicted.position()) {
            return predicted;
        }

        match uniform_free_pose(&self.map, rng, self.max_draw_attempts) {
            Some(pose) => pose,
            None => {
                log::warn!(
                    "No free pose found in {} draws, particle keeps its previous pose",
                    self.max_draw_attempts
                );
                *particle
            }
        }
    }
}

/// Sample from a zero-mean Gaussian.
fn sample_gaussian(rng: &mut dyn RngCore, sigma: f32) -> f32 {
    if sigma < 1e-10 {
        return 0.0;
    }
    Normal::new(0.0, sigma).map_or(0.0, |n| n.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::angle_diff;
    use crate::grid::GridCoord;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn open_map() -> Arc<OccupancyGrid> {
        Arc::new(OccupancyGrid::new(40, 40, 0.25).unwrap())
    }

    fn noiseless(map: Arc<OccupancyGrid>) -> OdometryMotionModel {
        OdometryMotionModel::new(map, [0.0, 0.0], [0.0, 0.0]).unwrap()
    }

    #[test]
    fn test_rejects_negative_coeffs() {
        assert!(OdometryMotionModel::new(open_map(), [-0.1, 0.0], [0.0, 0.0]).is_err());
        assert!(OdometryMotionModel::new(open_map(), [0.1, 0.0], [0.0, f32::NAN]).is_err());
    }

    #[test]
    fn test_decomposition_roundtrip() {
        let cases = [
            (Point2D::new(1.0, 0.5), 0.3, 0.0),
            (Point2D::new(-0.4, 0.2), -2.5, 4.0),
            (Point2D::new(0.0, -1.0), PI, 1.0),
        ];
        for (translation, rotation, bearing) in cases {
            let rtr = odometry_to_rot_trans_rot(translation, rotation, bearing);
            assert!(rtr.rot1.abs() <= PI && rtr.rot2.abs() <= PI);

            let (t, r) = rot_trans_rot_to_odometry(&rtr, bearing);
            assert_relative_eq!(t.x, translation.x, epsilon = 1e-5);
            assert_relative_eq!(t.y, translation.y, epsilon = 1e-5);
            assert!(angle_diff(r, rotation).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let rtr = odometry_to_rot_trans_rot(Point2D::zero(), 0.5, 2.0);
        assert_eq!(rtr.rot1, 0.0);
        assert_eq!(rtr.trans, 0.0);
        assert_relative_eq!(rtr.rot2, 0.5);
    }

    #[test]
    fn test_noise_std_devs() {
        let model = OdometryMotionModel::new(open_map(), [0.1, 0.05], [0.2, 0.01]).unwrap();
        let motion = RotTransRot {
            rot1: 0.5,
            trans: 2.0,
            rot2: -0.25,
        };
        let sigma = model.noise_std_devs(&motion);
        assert_relative_eq!(sigma.rot1, 0.1 * 0.5 + 0.05 * 2.0);
        assert_relative_eq!(sigma.trans, 0.2 * 2.0 + 0.01 * 0.75);
        assert_relative_eq!(sigma.rot2, 0.1 * 0.25 + 0.05 * 2.0);
    }

    #[test]
    fn test_control_is_robot_frame() {
        let model = noiseless(open_map());
        let mut rng = StdRng::seed_from_u64(0);

        // Facing +y, driving forward 1m moves along +y
        let particle = Pose2D::new(5.0, 5.0, FRAC_PI_2);
        let next = model.predict_particle_state(&particle, &Pose2D::new(1.0, 0.0, 0.0), &mut rng);
        assert_relative_eq!(next.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(next.y, 6.0, epsilon = 1e-5);
        assert!(angle_diff(next.theta, FRAC_PI_2).abs() < 1e-5);

        // Turning right wraps the bearing into [0, 2π)
        let turned = model.predict_particle_state(&Pose2D::new(5.0, 5.0, 0.1), &Pose2D::new(0.0, 0.0, -0.3), &mut rng);
        assert!((0.0..std::f32::consts::TAU).contains(&turned.theta));
        assert!(angle_diff(turned.theta, -0.2).abs() < 1e-5);
    }

    #[test]
    fn test_zero_motion_keeps_particle() {
        let model = OdometryMotionModel::new(open_map(), [0.5, 0.5], [0.5, 0.5]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let particle = Pose2D::new(2.0, 3.0, 1.0);
        assert_eq!(
            model.predict_particle_state(&particle, &Pose2D::identity(), &mut rng),
            particle
        );
    }

    #[test]
    fn test_noise_spreads_particles() {
        let model = OdometryMotionModel::new(open_map(), [0.1, 0.05], [0.1, 0.05]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let particle = Pose2D::new(2.0, 5.0, 0.0);
        let control = Pose2D::new(1.0, 0.0, 0.0);

        let xs: Vec<f32> = (0..2000)
            .map(|_| model.predict_particle_state(&particle, &control, &mut rng).x)
            .collect();
        let mean = xs.iter().sum::<f32>() / xs.len() as f32;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / xs.len() as f32;

        assert!((mean - 3.0).abs() < 0.02, "mean {}", mean);
        // σ_trans = 0.1 · 1.0
        assert!((var.sqrt() - 0.1).abs() < 0.02, "std {}", var.sqrt());
    }

    #[test]
    fn test_collision_replaced_by_free_pose() {
        let mut map = OccupancyGrid::new(4, 1, 1.0).unwrap();
        map.set_occupied(GridCoord::new(2, 0), true);
        let map = Arc::new(map);
        let model = noiseless(map.clone());
        let mut rng = StdRng::seed_from_u64(3);

        // Drives straight into the occupied cell
        let particle = Pose2D::new(1.5, 0.5, 0.0);
        for _ in 0..20 {
            let next = model.predict_particle_state(&particle, &Pose2D::new(1.0, 0.0, 0.0), &mut rng);
            assert!(map.is_free_at(next.position()));
        }
    }

    #[test]
    fn test_collision_without_free_space_keeps_pose() {
        let mut map = OccupancyGrid::new(2, 1, 1.0).unwrap();
        map.set_occupied(GridCoord::new(0, 0), true);
        map.set_occupied(GridCoord::new(1, 0), true);
        let model = noiseless(Arc::new(map)).with_max_draw_attempts(5);
        let mut rng = StdRng::seed_from_u64(3);

        let particle = Pose2D::new(-0.5, 0.5, 0.0);
        let next = model.predict_particle_state(&particle, &Pose2D::new(1.0, 0.0, 0.0), &mut rng);
        assert_eq!(next, particle);
    }

    #[test]
    fn test_off_map_prediction_allowed() {
        let model = noiseless(open_map());
        let mut rng = StdRng::seed_from_u64(3);
        let next = model.predict_particle_state(&Pose2D::new(9.5, 5.0, 0.0), &Pose2D::new(2.0, 0.0, 0.0), &mut rng);
        assert_relative_eq!(next.x, 11.5, epsilon = 1e-5);
    }
}
