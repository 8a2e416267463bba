//! Likelihood field sensor model for the particle filter update step.
//!
//! Each beam endpoint is projected into the map and scored by its distance
//! to the nearest occupied cell, using a mixture of a Gaussian "hit" term
//! and a uniform "random" term:
//!
//! ```text
//! p(beam) = w_hit · N(0, σ_hit)(d) + w_random / max_range
//! ```
//!
//! Beams without a return are skipped. The scan likelihood is the product
//! of the beam likelihoods; [`MeasurementModel::log_likelihood`] returns the
//! equivalent sum of logs.
//!
//! Distances are found on demand by expanding rings of cells around the
//! endpoint with a [`GridCircleFringeGenerator`]. Beam scoring stops the
//! search at `HIT_CUTOFF_SIGMAS · σ_hit`, where the hit term is below
//! `e^-32` of its peak and the endpoint is scored by the random term alone.

use std::sync::Arc;

use crate::config::SensorSection;
use crate::core::math::gaussian_density;
use crate::core::{Point2D, Pose2D};
use crate::error::{LocalizationError, Result};
use crate::grid::{GridCircleFringeGenerator, GridCoord, OccupancyGrid};
use crate::sensors::RangefinderProperties;

use super::traits::MeasurementModel;

/// Shrinks the center-to-center distance so endpoints near a cell's edge
/// count as close to it.
const CELL_SIZE_FACTOR: f32 = 0.6;

/// Obstacle search radius used for beam scoring, in units of `sigma_hit`.
const HIT_CUTOFF_SIGMAS: f32 = 8.0;

/// Upper bound on the precomputed ring radius.
const MAX_CACHED_RADIUS: u32 = 1024;

/// Likelihood field model over a shared occupancy grid.
#[derive(Debug, Clone)]
pub struct LikelihoodFieldModel {
    map: Arc<OccupancyGrid>,
    rangefinder: RangefinderProperties,
    sigma_hit: f32,
    weight_hit: f32,
    weight_random: f32,
    max_obstacle_distance: Option<f32>,
    fringe: GridCircleFringeGenerator,
}

impl LikelihoodFieldModel {
    /// Create a likelihood field model.
    ///
    /// # Arguments
    /// * `map` - Occupancy grid the scans are matched against
    /// * `rangefinder` - Beam geometry of the scans this model will score
    /// * `sigma_hit` - Std-dev of the hit term (meters, > 0)
    /// * `weight_hit` - Weight of the hit term (≥ 0)
    /// * `weight_random` - Weight of the random term (≥ 0, sums to 1 with `weight_hit`)
    pub fn new(
        map: Arc<OccupancyGrid>,
        rangefinder: RangefinderProperties,
        sigma_hit: f32,
        weight_hit: f32,
        weight_random: f32,
    ) -> Result<Self> {
        if !(sigma_hit > 0.0 && sigma_hit.is_finite()) {
            return Err(LocalizationError::InvalidParameter(format!(
                "sigma_hit must be positive, got {}",
                sigma_hit
            )));
        }
        if weight_hit < 0.0 || weight_random < 0.0 {
            return Err(LocalizationError::InvalidParameter(format!(
                "weights must be non-negative, got hit={} random={}",
                weight_hit, weight_random
            )));
        }
        if (weight_hit + weight_random - 1.0).abs() >= 1e-5 {
            return Err(LocalizationError::InvalidParameter(format!(
                "weight_hit + weight_random must be 1, got {}",
                weight_hit + weight_random
            )));
        }

        // Every ring a beam search can reach is cached
        let search_radius = (HIT_CUTOFF_SIGMAS * sigma_hit / map.cell_size()).ceil() as u32 + 2;
        let cached_radius = GridCircleFringeGenerator::max_radius(GridCoord::new(0, 0), &map)
            .min(search_radius)
            .min(MAX_CACHED_RADIUS);

        Ok(Self {
            map,
            rangefinder,
            sigma_hit,
            weight_hit,
            weight_random,
            max_obstacle_distance: None,
            fringe: GridCircleFringeGenerator::with_cached_radius(cached_radius),
        })
    }

    /// Create a model from a configuration section.
    ///
    /// `beam_skip` is not applied here: pass an already sparsified rangefinder.
    pub fn from_config(
        map: Arc<OccupancyGrid>,
        rangefinder: RangefinderProperties,
        config: &SensorSection,
    ) -> Result<Self> {
        Ok(Self::new(
            map,
            rangefinder,
            config.sigma_hit,
            config.weight_hit,
            config.weight_random,
        )?
        .with_max_obstacle_distance(config.max_obstacle_distance))
    }

    /// Treat obstacles farther than `distance` as absent.
    pub fn with_max_obstacle_distance(mut self, distance: Option<f32>) -> Self {
        self.max_obstacle_distance = distance;
        self
    }

    pub fn rangefinder(&self) -> &RangefinderProperties {
        &self.rangefinder
    }

    pub fn map(&self) -> &OccupancyGrid {
        &self.map
    }

    /// Likelihood of a single beam ending at robot-frame point `beam`
    /// when the robot is at `pose`.
    ///
    /// Endpoints off the map score 0.
    pub fn beam_likelihood(&self, pose: &Pose2D, beam: Point2D) -> f64 {
        let endpoint = pose.transform_point(&beam);
        if !self.map.covers_point(endpoint) {
            return 0.0;
        }

        let cutoff = HIT_CUTOFF_SIGMAS * self.sigma_hit;
        let limit = self.max_obstacle_distance.map_or(cutoff, |l| l.min(cutoff));
        let d = self.nearest_obstacle_within(endpoint, Some(limit));
        let hit = gaussian_density(d as f64, self.sigma_hit as f64);
        self.weight_hit as f64 * hit + self.weight_random as f64 / self.rangefinder.max_range() as f64
    }

    /// Distance from `pos` to the nearest occupied cell.
    ///
    /// Rings of cells are searched outward from the cell containing `pos`;
    /// within the first ring holding an occupied cell the closest cell
    /// center wins. The center distance is reduced by `0.6 · cell_size` and
    /// clamped at 0. Returns 0 inside an occupied cell and `+∞` when no
    /// occupied cell is found (within `max_obstacle_distance`, if set) or
    /// when `pos` is not finite.
    ///
    /// Positions off the map are measured against every occupied cell.
    pub fn distance_to_nearest_obstacle(&self, pos: Point2D) -> f32 {
        self.nearest_obstacle_within(pos, self.max_obstacle_distance)
    }

    fn nearest_obstacle_within(&self, pos: Point2D, limit: Option<f32>) -> f32 {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return f32::INFINITY;
        }
        let Some(center) = self.map.pos_to_cell(pos) else {
            let nearest = self
                .map
                .occupied_cells()
                .map(|cell| pos.distance(&self.map.cell_to_pos(cell)))
                .reduce(f32::min);
            return self.obstacle_distance(nearest, limit);
        };
        if self.map.is_occupied(center) {
            return 0.0;
        }

        let cell_size = self.map.cell_size();
        let max_radius = GridCircleFringeGenerator::max_radius(center, &self.map);

        for radius in 1..=max_radius {
            if let Some(limit) = limit
                && (radius as f32 - 1.5) * cell_size > limit
            {
                break;
            }

            let nearest = self
                .fringe
                .fringe_in_map(center, radius, &self.map)
                .filter(|&cell| self.map.is_occupied(cell))
                .map(|cell| pos.distance(&self.map.cell_to_pos(cell)))
                .reduce(f32::min);

            if nearest.is_some() {
                return self.obstacle_distance(nearest, limit);
            }
        }

        f32::INFINITY
    }

    /// Shrink a center distance by the cell footprint and apply `limit`.
    fn obstacle_distance(&self, center_distance: Option<f32>, limit: Option<f32>) -> f32 {
        let Some(center_distance) = center_distance else {
            return f32::INFINITY;
        };
        let distance = (center_distance - CELL_SIZE_FACTOR * self.map.cell_size()).max(0.0);
        match limit {
            Some(limit) if distance > limit => f32::INFINITY,
            _ => distance,
        }
    }

    /// Robot-frame endpoints of the beams in `scan` that have a return.
    fn returns<'a>(&'a self, scan: &'a [f32]) -> impl Iterator<Item = Point2D> + 'a {
        debug_assert_eq!(
            scan.len(),
            self.rangefinder.beams_number(),
            "scan readings do not match the rangefinder beams"
        );
        let max_range = self.rangefinder.max_range();
        scan.iter()
            .take(self.rangefinder.beams_number())
            .enumerate()
            .filter(move |&(_, &range)| range.is_finite() && range > 0.0 && range < max_range)
            .map(move |(i, &range)| self.rangefinder.beam_vector(i, range))
    }
}

impl MeasurementModel<Pose2D, [f32]> for LikelihoodFieldModel {
    fn compute_measurement_likelihood(&self, particle: &Pose2D, scan: &[f32]) -> f64 {
        self.returns(scan)
            .map(|beam| self.beam_likelihood(particle, beam))
            .product()
    }

    fn log_likelihood(&self, particle: &Pose2D, scan: &[f32]) -> f64 {
        self.returns(scan)
            .map(|beam| self.beam_likelihood(particle, beam).ln())
            .sum()
    }
}
