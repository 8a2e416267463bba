//! Localizer configuration.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sthiti::config::LocalizerConfig;
//!
//! // Load from default path (configs/localizer.yaml)
//! let config = LocalizerConfig::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = LocalizerConfig::default();
//! ```
//!
//! ## Example YAML
//!
//! ```yaml
//! particles_number: 500
//! seed: 42                   # omit for OS entropy
//! motion:
//!   rot_noise_coeffs: [0.1, 0.05]
//!   trans_noise_coeffs: [0.1, 0.05]
//! sensor:
//!   sigma_hit: 0.2
//!   weight_hit: 0.9
//!   weight_random: 0.1
//!   beam_skip: 2             # use every 2nd beam
//! histogram:
//!   theta_bin_size: 0.5235988
//! ```

mod defaults;
mod error;
mod localizer;

pub use error::ConfigLoadError;
pub use localizer::{HistogramSection, LocalizerConfig, MotionSection, SensorSection};
