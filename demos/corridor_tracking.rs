//! Corridor tracking demo.
//!
//! Simulates a robot driving down an L-shaped corridor with noisy wheel
//! odometry and a noisy 270° lidar, and localizes it with `McLrfLocalizer`.
//!
//! Usage:
//!   cargo run --example corridor_tracking
//!   cargo run --example corridor_tracking -- --global --particles 3000
//!   RUST_LOG=debug cargo run --example corridor_tracking -- --config configs/localizer.yaml

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use sthiti::grid::raycast::simulate_scan;
use sthiti::math::angle_diff;
use sthiti::{
    GridCoord, LocalizerConfig, McLrfLocalizer, OccupancyGrid, Pose2D, RangefinderProperties,
};

/// Corridor tracking demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of particles
    #[arg(short, long)]
    particles: Option<usize>,

    /// Number of simulated motion steps
    #[arg(short, long, default_value_t = 60)]
    steps: usize,

    /// Seed for both the simulation and the localizer
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Start without a pose estimate (global localization)
    #[arg(short, long)]
    global: bool,
}

const CELL_SIZE: f32 = 0.05;

/// L-shaped corridor, 1.2m wide, with door recesses along the walls.
fn corridor_map() -> Result<OccupancyGrid, sthiti::LocalizationError> {
    // 10m × 8m
    let mut map = OccupancyGrid::new(200, 160, CELL_SIZE)?;
    let mut fill = |x0: i32, y0: i32, x1: i32, y1: i32, occupied: bool| {
        for x in x0..x1 {
            for y in y0..y1 {
                map.set_occupied(GridCoord::new(x, y), occupied);
            }
        }
    };

    // Solid block, then carve the corridor
    fill(10, 10, 190, 150, true);
    fill(12, 12, 180, 36, false); // horizontal leg: y 0.6..1.8
    fill(156, 12, 180, 148, false); // vertical leg: x 7.8..9.0

    // Door recesses
    fill(40, 36, 52, 44, false);
    fill(100, 36, 112, 44, false);
    fill(140, 4, 146, 12, false);
    fill(148, 80, 156, 92, false);
    fill(180, 120, 188, 132, false);

    Ok(map)
}

/// Waypoint controls: straight along the horizontal leg, turn left, then up.
fn control_for_step(step: usize) -> Pose2D {
    match step {
        0..=35 => Pose2D::new(0.18, 0.0, 0.0),
        36..=43 => Pose2D::new(0.05, 0.0, std::f32::consts::FRAC_PI_2 / 8.0),
        _ => Pose2D::new(0.18, 0.0, 0.0),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LocalizerConfig::load(path)?,
        None => LocalizerConfig::load_default()?,
    };
    config.seed = Some(args.seed);
    if let Some(particles) = args.particles {
        config.particles_number = particles;
    } else if args.global {
        config.particles_number = LocalizerConfig::global_localization().particles_number;
    }

    let map = Arc::new(corridor_map()?);
    let lidar = RangefinderProperties::new(
        2f32.to_radians(),
        270f32.to_radians(),
        6.0,
        Pose2D::new(-0.1, 0.0, 0.0),
    )?;
    let mut localizer = McLrfLocalizer::new(map.clone(), lidar, config)?;

    let mut truth = Pose2D::new(1.2, 1.2, 0.0);
    if args.global {
        localizer.init_pose_unknown()?;
    } else {
        localizer.init_pose(&truth, &Pose2D::new(0.15, 0.15, 0.1))?;
    }

    // Simulation noise, independent of the localizer's random source
    let mut sim_rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
    let odom_noise = Normal::new(0.0f32, 0.01)?;
    let range_noise = Normal::new(0.0f32, 0.02)?;

    println!("step |   truth (x, y, θ°)    |  estimate (x, y, θ°)  | error m | σxy m");
    for step in 0..args.steps {
        let control = control_for_step(step);
        let next = truth.compose(&control);
        if !map.is_free_at(next.position()) {
            println!("Robot reached the end of the corridor");
            break;
        }
        truth = next;

        let measured_odom = Pose2D::new(
            control.x + odom_noise.sample(&mut sim_rng),
            control.y + odom_noise.sample(&mut sim_rng),
            control.theta + odom_noise.sample(&mut sim_rng),
        );
        let scan: Vec<f32> = simulate_scan(&map, &truth, &lidar)
            .into_iter()
            .map(|r| {
                if lidar.is_no_return(r) {
                    r
                } else {
                    (r + range_noise.sample(&mut sim_rng)).max(0.0)
                }
            })
            .collect();

        localizer.update(&measured_odom, &scan)?;

        let estimate = localizer.pose_mean()?;
        let spread = localizer.pose_std_dev()?;
        let error = truth.position().distance(&estimate.position());
        println!(
            "{:4} | ({:5.2}, {:5.2}, {:6.1}) | ({:5.2}, {:5.2}, {:6.1}) | {:7.3} | {:5.3}",
            step,
            truth.x,
            truth.y,
            truth.theta.to_degrees(),
            estimate.x,
            estimate.y,
            estimate.theta.to_degrees(),
            error,
            spread.x.hypot(spread.y)
        );
    }

    let estimate = localizer.pose_mean()?;
    println!(
        "\nFinal error: {:.3} m, {:.1}°",
        truth.position().distance(&estimate.position()),
        angle_diff(estimate.theta, truth.theta).abs().to_degrees()
    );

    println!("Top pose candidates:");
    for (pose, count) in localizer.pose_candidates()?.into_iter().take(3) {
        println!(
            "  ({:5.2}, {:5.2}, {:6.1}°) ← {} particles",
            pose.x,
            pose.y,
            pose.theta.to_degrees(),
            count
        );
    }

    Ok(())
}
