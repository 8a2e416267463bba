//! Error types for sthiti

use thiserror::Error;

use crate::config::ConfigLoadError;

/// Localization error type
#[derive(Error, Debug)]
pub enum LocalizationError {
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Invalid rangefinder: {0}")]
    InvalidRangefinder(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("At least 2 particles are required, got {0}")]
    TooFewParticles(usize),

    #[error("Scan has {actual} readings, rangefinder expects {expected}")]
    ScanLengthMismatch { expected: usize, actual: usize },

    #[error("Localizer has not been initialized")]
    NotInitialized,

    #[error("All particle weights collapsed to zero")]
    WeightCollapse,

    #[error("Pose sampling gave up: {accepted}/{requested} poses after {attempts} draws")]
    SamplingExhausted {
        requested: usize,
        accepted: usize,
        attempts: usize,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
