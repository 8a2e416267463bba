//! Summary statistics over a set of poses.

use crate::core::Pose2D;
use crate::core::math::{angle_diff, circular_mean};

/// Mean pose: arithmetic mean of positions, circular mean of bearings.
///
/// Returns `None` for an empty set. If the bearings cancel out (no defined
/// circular mean) the bearing is reported as 0.
pub fn pose_mean(poses: &[Pose2D]) -> Option<Pose2D> {
    if poses.is_empty() {
        return None;
    }

    let n = poses.len() as f64;
    let (sx, sy) = poses
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let theta = circular_mean(poses.iter().map(|p| p.theta)).unwrap_or(0.0);

    Some(Pose2D::new((sx / n) as f32, (sy / n) as f32, theta))
}

/// Per-axis population standard deviation of a pose set.
///
/// The bearing spread is measured as the shortest angular distance to the
/// circular mean. The result's `theta` is a spread, not a bearing, so it is
/// built without wrapping.
pub fn pose_std_dev(poses: &[Pose2D]) -> Option<Pose2D> {
    let mean = pose_mean(poses)?;
    let n = poses.len() as f64;

    let (vx, vy, vt) = poses.iter().fold((0.0f64, 0.0f64, 0.0f64), |(vx, vy, vt), p| {
        let dx = (p.x - mean.x) as f64;
        let dy = (p.y - mean.y) as f64;
        let dt = angle_diff(mean.theta, p.theta) as f64;
        (vx + dx * dx, vy + dy * dy, vt + dt * dt)
    });

    Some(Pose2D {
        x: (vx / n).sqrt() as f32,
        y: (vy / n).sqrt() as f32,
        theta: (vt / n).sqrt() as f32,
    })
}
