//! Capability traits binding models to the generic [`ParticleFilter`].
//!
//! [`ParticleFilter`]: super::ParticleFilter

use rand::RngCore;

use crate::error::Result;

/// Samples a particle's next state given a control input.
pub trait PredictionModel<P, C: ?Sized>: Send + Sync {
    /// Draw a predicted state for `particle` after applying `control`.
    fn predict_particle_state(&self, particle: &P, control: &C, rng: &mut dyn RngCore) -> P;
}

/// Scores how well a particle explains a measurement.
pub trait MeasurementModel<P, M: ?Sized>: Send + Sync {
    /// Likelihood p(measurement | particle), ≥ 0.
    fn compute_measurement_likelihood(&self, particle: &P, measurement: &M) -> f64;

    /// Natural log of the likelihood.
    ///
    /// Models that multiply many small factors should override this to sum
    /// logs instead, so the filter can normalize without underflow.
    fn log_likelihood(&self, particle: &P, measurement: &M) -> f64 {
        self.compute_measurement_likelihood(particle, measurement).ln()
    }
}

/// An item carrying a non-negative importance weight.
pub trait Weighted {
    /// Importance weight (≥ 0).
    fn weight(&self) -> f64;
}

/// Draws a new population proportional to weight.
pub trait WeightResampler<W: Weighted + Clone>: Send + Sync {
    /// Draw `count` items with replacement, with probability ∝ weight.
    fn resample(&self, items: Vec<W>, count: usize, rng: &mut dyn RngCore) -> Result<Vec<W>>;
}

/// A particle paired with its importance weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedParticle<P> {
    /// Hypothesized state.
    pub particle: P,
    /// Importance weight (unnormalized).
    pub weight: f64,
}

impl<P> WeightedParticle<P> {
    /// Create a weighted particle.
    pub fn new(particle: P, weight: f64) -> Self {
        Self { particle, weight }
    }
}

impl<P> Weighted for WeightedParticle<P> {
    fn weight(&self) -> f64 {
        self.weight
    }
}
