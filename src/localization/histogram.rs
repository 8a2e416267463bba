//! Spatial/angular histogram of particle poses.
//!
//! Each pose falls into a bin keyed by the map cell containing it and a
//! bearing sector of width `theta_bin_size`. The most populated bins are the
//! filter's strongest pose hypotheses.
//!
//! Storage is sparse: only bins that received a pose exist, so memory scales
//! with the particle count rather than with `width × height × sectors`.

use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::core::Pose2D;
use crate::error::{LocalizationError, Result};
use crate::grid::{GridCoord, OccupancyGrid};

use super::estimate::pose_mean;

/// Identifies a histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinKey {
    /// Map cell.
    pub cell: GridCoord,
    /// Bearing sector index.
    pub theta_bin: usize,
}

/// Poses that fell into one bin.
#[derive(Debug, Clone)]
pub struct PoseBin {
    key: BinKey,
    poses: Vec<Pose2D>,
}

impl PoseBin {
    /// Bin identity.
    pub fn key(&self) -> BinKey {
        self.key
    }

    /// Number of poses in the bin.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Bins are only created with at least one pose.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Contributing poses.
    pub fn poses(&self) -> &[Pose2D] {
        &self.poses
    }

    /// Mean of the contributing poses (circular mean for the bearing).
    pub fn pose_mean(&self) -> Pose2D {
        pose_mean(&self.poses).unwrap_or_default()
    }
}

/// Histogram over (cell, bearing sector).
#[derive(Debug, Clone)]
pub struct PoseHistogram {
    theta_bin_size: f32,
    theta_bins: usize,
    bins: HashMap<BinKey, PoseBin>,
}

impl PoseHistogram {
    /// Bucket `poses` on `map`. Poses off the map are ignored.
    ///
    /// `theta_bin_size` must lie in (0, 2π]; there are ⌈2π / size⌉ sectors.
    pub fn build(map: &OccupancyGrid, theta_bin_size: f32, poses: &[Pose2D]) -> Result<Self> {
        if !(theta_bin_size > 0.0 && theta_bin_size <= TAU) {
            return Err(LocalizationError::InvalidParameter(format!(
                "theta bin size must be in (0, 2π], got {}",
                theta_bin_size
            )));
        }

        let theta_bins = (TAU / theta_bin_size).ceil() as usize;
        let mut bins: HashMap<BinKey, PoseBin> = HashMap::new();

        for pose in poses {
            let Some(cell) = map.pos_to_cell(pose.position()) else {
                continue;
            };
            // theta < 2π, but the quotient may round up to theta_bins
            let theta_bin = ((pose.theta / theta_bin_size) as usize).min(theta_bins - 1);
            let key = BinKey { cell, theta_bin };

            bins.entry(key)
                .or_insert_with(|| PoseBin {
                    key,
                    poses: Vec::new(),
                })
                .poses
                .push(*pose);
        }

        Ok(Self {
            theta_bin_size,
            theta_bins,
            bins,
        })
    }

    /// Width of a bearing sector (radians).
    pub fn theta_bin_size(&self) -> f32 {
        self.theta_bin_size
    }

    /// Number of bearing sectors.
    pub fn theta_bins(&self) -> usize {
        self.theta_bins
    }

    /// Number of non-empty bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin at `key`, if any pose fell into it.
    pub fn bin(&self, key: &BinKey) -> Option<&PoseBin> {
        self.bins.get(key)
    }

    /// Total number of poses counted (off-map poses excluded).
    pub fn total_samples(&self) -> usize {
        self.bins.values().map(PoseBin::len).sum()
    }

    /// Non-empty bins, most populated first. Ties are ordered by key.
    pub fn ranked_bins(&self) -> Vec<&PoseBin> {
        let mut ranked: Vec<&PoseBin> = self.bins.values().collect();
        ranked.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.key.cmp(&b.key)));
        ranked
    }
}
