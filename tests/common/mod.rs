//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use sthiti::{GridCoord, LocalizerConfig, OccupancyGrid, Pose2D, RangefinderProperties};

/// Rectangular room with a one-cell wall on every side.
pub fn walled_room(width: usize, height: usize, cell_size: f32) -> OccupancyGrid {
    let mut map = OccupancyGrid::new(width, height, cell_size).unwrap();
    let (w, h) = (width as i32, height as i32);
    for x in 0..w {
        map.set_occupied(GridCoord::new(x, 0), true);
        map.set_occupied(GridCoord::new(x, h - 1), true);
    }
    for y in 0..h {
        map.set_occupied(GridCoord::new(0, y), true);
        map.set_occupied(GridCoord::new(w - 1, y), true);
    }
    map
}

/// Fill the cell rectangle `[x0, x1) × [y0, y1)`.
pub fn add_box(map: &mut OccupancyGrid, x0: i32, y0: i32, x1: i32, y1: i32) {
    for x in x0..x1 {
        for y in y0..y1 {
            map.set_occupied(GridCoord::new(x, y), true);
        }
    }
}

/// 6m × 4m walled room inside an 8m × 6m map, with a pillar breaking its
/// symmetry. The free margin outside the walls keeps beam endpoints of
/// slightly misplaced particles on the map.
pub fn asymmetric_room() -> Arc<OccupancyGrid> {
    let mut map = OccupancyGrid::new(80, 60, 0.1).unwrap();
    add_box(&mut map, 10, 10, 70, 11);
    add_box(&mut map, 10, 49, 70, 50);
    add_box(&mut map, 10, 10, 11, 50);
    add_box(&mut map, 69, 10, 70, 50);
    add_box(&mut map, 50, 34, 58, 42);
    Arc::new(map)
}

/// 270° lidar with 5° resolution, 8m range.
pub fn lidar_270() -> RangefinderProperties {
    RangefinderProperties::new(5f32.to_radians(), 270f32.to_radians(), 8.0, Pose2D::identity())
        .unwrap()
}

/// Default configuration with a fixed seed.
pub fn seeded_config(particles_number: usize, seed: u64) -> LocalizerConfig {
    LocalizerConfig {
        particles_number,
        seed: Some(seed),
        ..Default::default()
    }
}
