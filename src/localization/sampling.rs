//! Rejection sampling of poses in free space.
//!
//! Candidates are drawn from a proposal (uniform over the map, or Gaussian
//! around a pose) and kept only if they land in a free cell. Every sampler
//! is bounded by an attempt ceiling so a map with little or no free space
//! cannot stall the caller.

use std::f32::consts::TAU;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use crate::core::Pose2D;
use crate::error::{LocalizationError, Result};
use crate::grid::OccupancyGrid;

/// Draw one pose uniformly over the map area with a uniform bearing,
/// retrying until it lands in a free cell.
///
/// Returns `None` after `max_attempts` rejected draws.
pub fn uniform_free_pose(
    map: &OccupancyGrid,
    rng: &mut dyn RngCore,
    max_attempts: usize,
) -> Option<Pose2D> {
    let (min, max) = map.bounds();
    (0..max_attempts).find_map(|_| {
        let pose = Pose2D::new(
            rng.random_range(min.x..max.x),
            rng.random_range(min.y..max.y),
            rng.random_range(0.0..TAU),
        );
        map.is_free_at(pose.position()).then_some(pose)
    })
}

/// Draw `count` uniform free-space poses.
///
/// The total number of draws is capped at `count · max_attempts_per_pose`.
pub fn uniform_free_poses(
    map: &OccupancyGrid,
    count: usize,
    max_attempts_per_pose: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Pose2D>> {
    let (min, max) = map.bounds();
    collect_free(map, count, max_attempts_per_pose, || {
        Pose2D::new(
            rng.random_range(min.x..max.x),
            rng.random_range(min.y..max.y),
            rng.random_range(0.0..TAU),
        )
    })
}

/// Draw `count` free-space poses from a Gaussian around `mean`.
///
/// Each axis is sampled independently with the matching component of
/// `std_dev`; bearings are wrapped to [0, 2π).
pub fn gaussian_free_poses(
    map: &OccupancyGrid,
    mean: &Pose2D,
    std_dev: &Pose2D,
    count: usize,
    max_attempts_per_pose: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Pose2D>> {
    let normal = |mean: f32, sd: f32| {
        Normal::new(mean, sd).map_err(|e| {
            LocalizationError::InvalidParameter(format!("pose std-dev {}: {}", sd, e))
        })
    };
    let x = normal(mean.x, std_dev.x)?;
    let y = normal(mean.y, std_dev.y)?;
    let theta = normal(mean.theta, std_dev.theta)?;

    collect_free(map, count, max_attempts_per_pose, || {
        Pose2D::new(
            x.sample(&mut *rng),
            y.sample(&mut *rng),
            theta.sample(&mut *rng),
        )
    })
}

fn collect_free(
    map: &OccupancyGrid,
    count: usize,
    max_attempts_per_pose: usize,
    mut draw: impl FnMut() -> Pose2D,
) -> Result<Vec<Pose2D>> {
    let budget = count.saturating_mul(max_attempts_per_pose);
    let mut poses = Vec::with_capacity(count);
    let mut attempts = 0;

    while poses.len() < count {
        if attempts >= budget {
            return Err(LocalizationError::SamplingExhausted {
                requested: count,
                accepted: poses.len(),
                attempts,
            });
        }
        attempts += 1;

        let pose = draw();
        if map.is_free_at(pose.position()) {
            poses.push(pose);
        }
    }

    log::debug!(
        "Sampled {} free poses in {} draws (acceptance {:.2})",
        count,
        attempts,
        count as f32 / attempts.max(1) as f32
    );
    Ok(poses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridCoord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn half_blocked_map() -> OccupancyGrid {
        // 4x4, left half occupied
        let mut map = OccupancyGrid::new(4, 4, 0.5).unwrap();
        for x in 0..2 {
            for y in 0..4 {
                map.set_occupied(GridCoord::new(x, y), true);
            }
        }
        map
    }

    #[test]
    fn test_uniform_poses_are_free() {
        let map = half_blocked_map();
        let mut rng = StdRng::seed_from_u64(11);
        let poses = uniform_free_poses(&map, 200, 100, &mut rng).unwrap();

        assert_eq!(poses.len(), 200);
        for pose in &poses {
            assert!(map.is_free_at(pose.position()));
            assert!(pose.x >= 1.0);
            assert!((0.0..TAU).contains(&pose.theta));
        }
    }

    #[test]
    fn test_uniform_exhausted_on_full_map() {
        let mut map = OccupancyGrid::new(2, 2, 1.0).unwrap();
        for cell in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            map.set_occupied(GridCoord::new(cell.0, cell.1), true);
        }
        let mut rng = StdRng::seed_from_u64(1);

        assert!(uniform_free_pose(&map, &mut rng, 50).is_none());
        match uniform_free_poses(&map, 3, 10, &mut rng) {
            Err(LocalizationError::SamplingExhausted {
                requested,
                accepted,
                attempts,
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(accepted, 0);
                assert_eq!(attempts, 30);
            }
            other => panic!("expected SamplingExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_gaussian_poses_near_mean() {
        let map = OccupancyGrid::new(20, 20, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mean = Pose2D::new(5.0, 5.0, 0.1);
        let sd = Pose2D::new(0.2, 0.2, 0.05);
        let poses = gaussian_free_poses(&map, &mean, &sd, 500, 10, &mut rng).unwrap();

        let mx = poses.iter().map(|p| p.x).sum::<f32>() / poses.len() as f32;
        let my = poses.iter().map(|p| p.y).sum::<f32>() / poses.len() as f32;
        assert!((mx - 5.0).abs() < 0.05);
        assert!((my - 5.0).abs() < 0.05);
        for p in &poses {
            assert!((0.0..TAU).contains(&p.theta));
        }
    }

    #[test]
    fn test_gaussian_poses_beside_obstacle() {
        // Mean on the boundary between the occupied and free halves
        let map = half_blocked_map();
        let mut rng = StdRng::seed_from_u64(21);
        let mean = Pose2D::new(1.0, 1.0, 0.0);
        let sd = Pose2D::new(0.3, 0.3, 0.1);
        let poses = gaussian_free_poses(&map, &mean, &sd, 300, 100, &mut rng).unwrap();

        assert_eq!(poses.len(), 300);
        assert!(poses.iter().all(|p| map.is_free_at(p.position()) && p.x >= 1.0));
    }

    #[test]
    fn test_gaussian_rejects_negative_std_dev() {
        let map = OccupancyGrid::new(4, 4, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let sd = Pose2D {
            x: -1.0,
            y: 0.1,
            theta: 0.1,
        };
        let result = gaussian_free_poses(&map, &Pose2D::new(2.0, 2.0, 0.0), &sd, 10, 10, &mut rng);
        assert!(matches!(result, Err(LocalizationError::InvalidParameter(_))));
    }
}
