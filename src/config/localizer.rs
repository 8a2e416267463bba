//! Localizer configuration and its sections.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::defaults;
use super::error::ConfigLoadError;

/// Full localizer configuration loaded from YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizerConfig {
    /// Number of particles kept by the filter
    #[serde(default = "defaults::particles_number")]
    pub particles_number: usize,

    /// Random seed (None = seed from the OS)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Rejection-sampling draws allowed per requested particle
    #[serde(default = "defaults::max_draw_attempts_per_particle")]
    pub max_draw_attempts_per_particle: usize,

    /// Odometry motion model
    #[serde(default)]
    pub motion: MotionSection,

    /// Likelihood field sensor model
    #[serde(default)]
    pub sensor: SensorSection,

    /// Pose histogram used for candidate extraction
    #[serde(default)]
    pub histogram: HistogramSection,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            particles_number: defaults::particles_number(),
            seed: None,
            max_draw_attempts_per_particle: defaults::max_draw_attempts_per_particle(),
            motion: MotionSection::default(),
            sensor: SensorSection::default(),
            histogram: HistogramSection::default(),
        }
    }
}

impl LocalizerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/localizer.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/localizer.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        serde_yaml::to_string(self).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Configuration for global localization (many particles).
    pub fn global_localization() -> Self {
        Self {
            particles_number: 2000,
            ..Default::default()
        }
    }

    /// Configuration for pose tracking from a known start (few particles, low noise).
    pub fn tracking() -> Self {
        Self {
            particles_number: 200,
            motion: MotionSection::low_noise(),
            ..Default::default()
        }
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.particles_number < 2 {
            return Err(ConfigLoadError::Invalid(format!(
                "particles_number must be at least 2, got {}",
                self.particles_number
            )));
        }
        if self.max_draw_attempts_per_particle == 0 {
            return Err(ConfigLoadError::Invalid(
                "max_draw_attempts_per_particle must be at least 1".to_string(),
            ));
        }
        self.motion.validate()?;
        self.sensor.validate()?;
        self.histogram.validate()
    }
}

/// Odometry motion model noise
///
/// Standard deviations of the sampled rot1/trans/rot2 components are
/// `rot[0]·|rot| + rot[1]·trans` and `trans[0]·trans + trans[1]·(|rot1| + |rot2|)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSection {
    /// Rotation noise: [from rotation, from translation]
    #[serde(default = "defaults::rot_noise_coeffs")]
    pub rot_noise_coeffs: [f32; 2],

    /// Translation noise: [from translation, from rotation]
    #[serde(default = "defaults::trans_noise_coeffs")]
    pub trans_noise_coeffs: [f32; 2],
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            rot_noise_coeffs: defaults::rot_noise_coeffs(),
            trans_noise_coeffs: defaults::trans_noise_coeffs(),
        }
    }
}

impl MotionSection {
    /// Low noise, for accurate wheel odometry.
    pub fn low_noise() -> Self {
        Self {
            rot_noise_coeffs: [0.05, 0.01],
            trans_noise_coeffs: [0.05, 0.01],
        }
    }

    /// High noise, for slippery floors or poor encoders.
    pub fn high_noise() -> Self {
        Self {
            rot_noise_coeffs: [0.2, 0.1],
            trans_noise_coeffs: [0.2, 0.1],
        }
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        let all = self.rot_noise_coeffs.iter().chain(&self.trans_noise_coeffs);
        for &c in all {
            if !(c >= 0.0 && c.is_finite()) {
                return Err(ConfigLoadError::Invalid(format!(
                    "motion noise coefficients must be non-negative, got {}",
                    c
                )));
            }
        }
        Ok(())
    }
}

/// Likelihood field sensor model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorSection {
    /// Std-dev of the hit distribution (meters)
    #[serde(default = "defaults::sigma_hit")]
    pub sigma_hit: f32,

    /// Weight of the hit component
    #[serde(default = "defaults::weight_hit")]
    pub weight_hit: f32,

    /// Weight of the uniform random component (weight_hit + weight_random = 1)
    #[serde(default = "defaults::weight_random")]
    pub weight_random: f32,

    /// Use every N-th beam of the scan
    #[serde(default = "defaults::beam_skip")]
    pub beam_skip: usize,

    /// Stop the nearest-obstacle search beyond this distance (meters)
    #[serde(default)]
    pub max_obstacle_distance: Option<f32>,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            sigma_hit: defaults::sigma_hit(),
            weight_hit: defaults::weight_hit(),
            weight_random: defaults::weight_random(),
            beam_skip: defaults::beam_skip(),
            max_obstacle_distance: None,
        }
    }
}

impl SensorSection {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(self.sigma_hit > 0.0 && self.sigma_hit.is_finite()) {
            return Err(ConfigLoadError::Invalid(format!(
                "sigma_hit must be positive, got {}",
                self.sigma_hit
            )));
        }
        if self.weight_hit < 0.0 || self.weight_random < 0.0 {
            return Err(ConfigLoadError::Invalid(
                "sensor weights must be non-negative".to_string(),
            ));
        }
        if (self.weight_hit + self.weight_random - 1.0).abs() >= 1e-5 {
            return Err(ConfigLoadError::Invalid(format!(
                "weight_hit + weight_random must be 1, got {}",
                self.weight_hit + self.weight_random
            )));
        }
        if self.beam_skip == 0 {
            return Err(ConfigLoadError::Invalid(
                "beam_skip must be at least 1".to_string(),
            ));
        }
        if let Some(d) = self.max_obstacle_distance
            && !(d > 0.0)
        {
            return Err(ConfigLoadError::Invalid(format!(
                "max_obstacle_distance must be positive, got {}",
                d
            )));
        }
        Ok(())
    }
}

/// Pose histogram binning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramSection {
    /// Bearing bin width (radians, in (0, 2π])
    #[serde(default = "defaults::theta_bin_size")]
    pub theta_bin_size: f32,
}

impl Default for HistogramSection {
    fn default() -> Self {
        Self {
            theta_bin_size: defaults::theta_bin_size(),
        }
    }
}

impl HistogramSection {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(self.theta_bin_size > 0.0 && self.theta_bin_size <= std::f32::consts::TAU) {
            return Err(ConfigLoadError::Invalid(format!(
                "theta_bin_size must be in (0, 2π], got {}",
                self.theta_bin_size
            )));
        }
        Ok(())
    }
}
