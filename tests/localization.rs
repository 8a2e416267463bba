//! End-to-end localization tests.
//!
//! Drive a simulated robot through small maps, feed the localizer the
//! odometry and ray-cast scans it would see, and check the estimates.

mod common;

use std::io::Write;
use std::sync::Arc;

use common::{asymmetric_room, lidar_270, seeded_config, walled_room};
use sthiti::grid::raycast::simulate_scan;
use sthiti::localization::PoseHistogram;
use sthiti::math::angle_diff;
use sthiti::{
    LocalizationError, LocalizerConfig, LocalizerState, McLrfLocalizer, OccupancyGrid, Pose2D,
    RangefinderProperties,
};

#[test]
fn test_open_map_follows_odometry() {
    // 3 × 2 all-free map, robot at the origin corner
    let map = Arc::new(OccupancyGrid::new(3, 2, 1.0).unwrap());
    let rangefinder =
        RangefinderProperties::new(90f32.to_radians(), 180f32.to_radians(), 5.0, Pose2D::identity())
            .unwrap();
    let mut localizer =
        McLrfLocalizer::new(map.clone(), rangefinder, seeded_config(200, 1)).unwrap();

    localizer
        .init_pose(&Pose2D::new(0.0, 0.0, 0.0), &Pose2D::new(0.05, 0.05, 0.02))
        .unwrap();
    assert!(localizer.particles().iter().all(|p| map.is_free_at(p.position())));

    // Nothing in range: every beam reports max range
    let scan = vec![5.0; rangefinder.beams_number()];
    localizer.update(&Pose2D::new(1.0, 0.0, 0.0), &scan).unwrap();

    let mean = localizer.pose_mean().unwrap();
    assert!((mean.x - 1.0).abs() < 0.3, "mean x {}", mean.x);
    assert!(mean.y.abs() < 0.3, "mean y {}", mean.y);
    assert!(angle_diff(mean.theta, 0.0).abs() < 0.2, "mean theta {}", mean.theta);

    let std_dev = localizer.pose_std_dev().unwrap();
    assert!(std_dev.x > 0.0);
    assert!(std_dev.y > 0.0);
    assert!(std_dev.theta > 0.0);
}

#[test]
fn test_tracking_in_room() {
    let map = asymmetric_room();
    let rangefinder = lidar_270();
    let mut config = seeded_config(300, 42);
    config.sensor.beam_skip = 2;
    config.sensor.max_obstacle_distance = Some(1.0);

    let mut localizer = McLrfLocalizer::new(map.clone(), rangefinder, config).unwrap();

    let mut truth = Pose2D::new(2.5, 2.5, 0.0);
    localizer
        .init_pose(&truth, &Pose2D::new(0.1, 0.1, 0.05))
        .unwrap();

    let control = Pose2D::new(0.15, 0.0, 0.02);
    for step in 0..15 {
        truth = truth.compose(&control);
        let scan = simulate_scan(&map, &truth, &rangefinder);
        localizer.update(&control, &scan).unwrap();

        assert_eq!(localizer.particles().len(), 300, "step {}", step);
    }

    let estimate = localizer.pose_mean().unwrap();
    let error = ((estimate.x - truth.x).powi(2) + (estimate.y - truth.y).powi(2)).sqrt();
    assert!(error < 0.3, "position error {} (estimate {:?}, truth {:?})", error, estimate, truth);
    assert!(
        angle_diff(estimate.theta, truth.theta).abs() < 0.15,
        "heading error (estimate {:?}, truth {:?})",
        estimate,
        truth
    );

    let candidates = localizer.pose_candidates().unwrap();
    let (best, _) = candidates[0];
    assert!((best.x - truth.x).abs() < 0.5 && (best.y - truth.y).abs() < 0.5);
}

#[test]
fn test_particle_count_preserved() {
    let map = Arc::new(walled_room(20, 20, 0.25));
    let rangefinder = lidar_270();

    for n in [2, 5, 64] {
        let mut localizer =
            McLrfLocalizer::new(map.clone(), rangefinder, seeded_config(n, n as u64)).unwrap();
        localizer.init_pose_unknown().unwrap();

        let truth = Pose2D::new(2.5, 2.5, 1.0);
        let scan = simulate_scan(&map, &truth, &rangefinder);
        for _ in 0..3 {
            localizer.update(&Pose2D::new(0.05, 0.0, 0.1), &scan).unwrap();
            assert_eq!(localizer.particles().len(), n);
            for p in localizer.particles() {
                assert!((0.0..std::f32::consts::TAU).contains(&p.theta));
            }
        }
    }
}

#[test]
fn test_global_init_in_free_space() {
    let map = asymmetric_room();
    let mut localizer =
        McLrfLocalizer::new(map.clone(), lidar_270(), seeded_config(1000, 3)).unwrap();
    localizer.init_pose_unknown().unwrap();

    assert_eq!(localizer.state(), LocalizerState::Initialized);
    assert_eq!(localizer.particles().len(), 1000);
    assert!(localizer.particles().iter().all(|p| map.is_free_at(p.position())));
}

#[test]
fn test_init_pose_stays_in_free_space() {
    let map = asymmetric_room();
    let mut localizer =
        McLrfLocalizer::new(map.clone(), lidar_270(), seeded_config(400, 11)).unwrap();

    // Against the pillar's left face, then on two opposite map corners
    let means = [
        Pose2D::new(4.95, 3.8, 0.0),
        Pose2D::new(0.0, 0.0, 1.0),
        Pose2D::new(8.0, 6.0, 4.0),
    ];
    for mean in means {
        localizer
            .init_pose(&mean, &Pose2D::new(0.2, 0.2, 0.3))
            .unwrap();

        let particles = localizer.particles();
        assert_eq!(particles.len(), 400);
        for p in particles {
            assert!(map.is_free_at(p.position()), "{:?} not free around {:?}", p, mean);
            assert!((0.0..std::f32::consts::TAU).contains(&p.theta));
        }
    }
}

#[test]
fn test_histogram_counts_bounded() {
    let map = asymmetric_room();
    let rangefinder = lidar_270();
    let mut localizer =
        McLrfLocalizer::new(map.clone(), rangefinder, seeded_config(500, 8)).unwrap();
    localizer.init_pose_unknown().unwrap();

    let truth = Pose2D::new(3.0, 2.0, 0.5);
    localizer
        .update(&Pose2D::new(0.3, 0.0, 0.0), &simulate_scan(&map, &truth, &rangefinder))
        .unwrap();

    let histogram =
        PoseHistogram::build(&map, 30f32.to_radians(), localizer.particles()).unwrap();
    assert!(histogram.total_samples() <= localizer.particles().len());
    assert_eq!(histogram.theta_bins(), 12);

    let ranked = histogram.ranked_bins();
    assert!(ranked.windows(2).all(|w| w[0].len() >= w[1].len()));
}

#[test]
fn test_scan_length_mismatch() {
    let map = asymmetric_room();
    let mut localizer = McLrfLocalizer::new(map, lidar_270(), seeded_config(10, 0)).unwrap();
    localizer.init_pose_unknown().unwrap();

    let result = localizer.update(&Pose2D::identity(), &[1.0, 2.0, 3.0]);
    assert!(matches!(
        result,
        Err(LocalizationError::ScanLengthMismatch { expected: 55, actual: 3 })
    ));
}

#[test]
fn test_localizer_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "particles_number: 32\nseed: 5\nsensor:\n  beam_skip: 5\n  sigma_hit: 0.15"
    )
    .unwrap();

    let config = LocalizerConfig::load(file.path()).unwrap();
    let mut localizer = McLrfLocalizer::new(asymmetric_room(), lidar_270(), config).unwrap();
    assert_eq!(localizer.sparse_rangefinder().beams_number(), 11);

    localizer.init_pose_unknown().unwrap();
    assert_eq!(localizer.particles().len(), 32);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let map = asymmetric_room();
    let rangefinder = lidar_270();
    let truth = Pose2D::new(4.0, 2.0, 2.0);
    let scan = simulate_scan(&map, &truth, &rangefinder);

    let run = || {
        let mut localizer =
            McLrfLocalizer::new(map.clone(), rangefinder, seeded_config(100, 77)).unwrap();
        localizer.init_pose_unknown().unwrap();
        localizer.update(&Pose2D::new(0.1, 0.0, 0.0), &scan).unwrap();
        localizer.particles().to_vec()
    };

    assert_eq!(run(), run());
}
