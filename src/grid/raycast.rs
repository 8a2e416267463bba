//! Ray casting against the occupancy grid.
//!
//! Produces the range a beam would measure from a given origin. Used to
//! simulate scans for demos, benchmarks and integration tests.

use crate::core::{Point2D, Pose2D};
use crate::sensors::RangefinderProperties;

use super::{GridCoord, OccupancyGrid};

/// Cast a ray and return the distance to the first occupied cell.
///
/// Walks the cells crossed by the ray (Amanatides–Woo traversal). Leaving
/// the map or travelling `max_range` without a hit yields `max_range`.
///
/// # Arguments
/// * `map` - Occupancy grid
/// * `origin` - Ray origin in world frame
/// * `angle` - Ray direction in world frame (radians)
/// * `max_range` - Maximum ray distance
pub fn raycast(map: &OccupancyGrid, origin: Point2D, angle: f32, max_range: f32) -> f32 {
    let Some(mut cell) = map.pos_to_cell(origin) else {
        return max_range;
    };
    if map.is_occupied(cell) {
        return 0.0;
    }

    let (dir_y, dir_x) = angle.sin_cos();
    let s = map.cell_size();
    let local = origin - map.origin();

    let step_x = if dir_x >= 0.0 { 1 } else { -1 };
    let step_y = if dir_y >= 0.0 { 1 } else { -1 };

    // Ray parameter at the first vertical/horizontal cell boundary
    let next_boundary = |c: i32, step: i32| (c + if step > 0 { 1 } else { 0 }) as f32 * s;
    let mut t_max_x = if dir_x.abs() < 1e-9 {
        f32::INFINITY
    } else {
        (next_boundary(cell.x, step_x) - local.x) / dir_x
    };
    let mut t_max_y = if dir_y.abs() < 1e-9 {
        f32::INFINITY
    } else {
        (next_boundary(cell.y, step_y) - local.y) / dir_y
    };
    let t_delta_x = if dir_x.abs() < 1e-9 { f32::INFINITY } else { s / dir_x.abs() };
    let t_delta_y = if dir_y.abs() < 1e-9 { f32::INFINITY } else { s / dir_y.abs() };

    loop {
        let t = if t_max_x < t_max_y {
            cell = GridCoord::new(cell.x + step_x, cell.y);
            let t = t_max_x;
            t_max_x += t_delta_x;
            t
        } else {
            cell = GridCoord::new(cell.x, cell.y + step_y);
            let t = t_max_y;
            t_max_y += t_delta_y;
            t
        };

        if t >= max_range || !map.covers_cell(cell) {
            return max_range;
        }
        if map.is_occupied(cell) {
            return t.max(0.0);
        }
    }
}

/// Simulate a full scan from `pose` with the given rangefinder.
///
/// Beams with no hit report `max_range`.
pub fn simulate_scan(map: &OccupancyGrid, pose: &Pose2D, rangefinder: &RangefinderProperties) -> Vec<f32> {
    let sensor = pose.compose(&rangefinder.origin());
    (0..rangefinder.beams_number())
        .map(|i| {
            let angle = sensor.theta + rangefinder.beam_angle(i);
            raycast(map, sensor.position(), angle, rangefinder.max_range())
        })
        .collect()
}
