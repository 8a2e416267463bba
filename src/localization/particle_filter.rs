//! Generic particle filter.
//!
//! One update runs the classic sequential importance resampling cycle:
//!
//! 1. **Predict**: every particle is moved by the prediction model
//! 2. **Weigh**: every particle is scored by the measurement model
//! 3. **Resample**: a new population of the same size is drawn ∝ weight
//!
//! Weights are computed from log-likelihoods, shifted by their maximum
//! before exponentiating, so scans with many beams do not underflow.

use std::fmt;

use rand::rngs::StdRng;

use crate::error::{LocalizationError, Result};

use super::resampling::WheelResampler;
use super::traits::{MeasurementModel, PredictionModel, WeightResampler, WeightedParticle};

/// State of the particle filter for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleFilterState {
    /// Effective number of particles of the last weighting.
    pub neff: f64,
    /// Largest normalized weight of the last weighting.
    pub max_weight: f64,
    /// Number of completed updates.
    pub iterations: u64,
}

/// Particle filter over states `P`, measurements `M` and controls `C`.
pub struct ParticleFilter<P, M: ?Sized, C: ?Sized = P> {
    particles: Vec<P>,
    prediction_model: Box<dyn PredictionModel<P, C>>,
    measurement_model: Box<dyn MeasurementModel<P, M>>,
    resampler: Box<dyn WeightResampler<WeightedParticle<P>>>,
    rng: StdRng,
    state: ParticleFilterState,
}

impl<P, M, C> ParticleFilter<P, M, C>
where
    P: Clone + Send + Sync + 'static,
    M: ?Sized,
    C: ?Sized,
{
    /// Create an uninitialized filter using the resampling wheel.
    pub fn new(
        prediction_model: Box<dyn PredictionModel<P, C>>,
        measurement_model: Box<dyn MeasurementModel<P, M>>,
        rng: StdRng,
    ) -> Self {
        Self {
            particles: Vec::new(),
            prediction_model,
            measurement_model,
            resampler: Box::new(WheelResampler),
            rng,
            state: ParticleFilterState::default(),
        }
    }

    /// Replace the resampling strategy.
    pub fn with_resampler(mut self, resampler: Box<dyn WeightResampler<WeightedParticle<P>>>) -> Self {
        self.resampler = resampler;
        self
    }

    /// Replace the particle set. At least two particles are required.
    pub fn init(&mut self, particles: Vec<P>) -> Result<()> {
        if particles.len() < 2 {
            return Err(LocalizationError::TooFewParticles(particles.len()));
        }
        self.particles = particles;
        self.state = ParticleFilterState::default();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Current particle set (empty before [`Self::init`]).
    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Diagnostics of the last update.
    pub fn state(&self) -> &ParticleFilterState {
        &self.state
    }

    /// Random source shared by the models and by callers that seed particles.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Run one predict / weigh / resample cycle.
    ///
    /// The particle count is preserved. If every particle scores zero the
    /// predicted particles are kept unweighted and
    /// [`LocalizationError::WeightCollapse`] is returned.
    pub fn update(&mut self, control: &C, measurement: &M) -> Result<()> {
        if self.particles.is_empty() {
            return Err(LocalizationError::NotInitialized);
        }
        let n = self.particles.len();

        let predicted: Vec<P> = self
            .particles
            .iter()
            .map(|p| {
                self.prediction_model
                    .predict_particle_state(p, control, &mut self.rng)
            })
            .collect();

        let log_weights: Vec<f64> = predicted
            .iter()
            .map(|p| self.measurement_model.log_likelihood(p, measurement))
            .collect();

        let max_log_weight = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if !max_log_weight.is_finite() {
            self.particles = predicted;
            return Err(LocalizationError::WeightCollapse);
        }

        // Subtract max for numerical stability and exponentiate
        let weights: Vec<f64> = log_weights
            .iter()
            .map(|&lw| {
                let w = (lw - max_log_weight).exp();
                if w.is_finite() { w } else { 0.0 }
            })
            .collect();
        let sum: f64 = weights.iter().sum();

        let sum_sq: f64 = weights.iter().map(|w| (w / sum) * (w / sum)).sum();
        self.state.neff = if sum_sq > 1e-10 { 1.0 / sum_sq } else { 0.0 };
        self.state.max_weight = weights.iter().map(|w| w / sum).fold(0.0, f64::max);

        let weighted: Vec<WeightedParticle<P>> = predicted
            .into_iter()
            .zip(weights)
            .map(|(particle, weight)| WeightedParticle::new(particle, weight))
            .collect();

        self.particles = self
            .resampler
            .resample(weighted, n, &mut self.rng)?
            .into_iter()
            .map(|wp| wp.particle)
            .collect();
        self.state.iterations += 1;

        log::debug!(
            "Particle filter update {}: neff={:.1}/{}, max_weight={:.4}",
            self.state.iterations,
            self.state.neff,
            n,
            self.state.max_weight
        );

        Ok(())
    }
}

impl<P, M: ?Sized, C: ?Sized> fmt::Debug for ParticleFilter<P, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleFilter")
            .field("particles", &self.particles.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, RngCore, SeedableRng};

    /// Moves a 1D state by the control plus uniform jitter.
    struct Shift;

    impl PredictionModel<f32, f32> for Shift {
        fn predict_particle_state(&self, particle: &f32, control: &f32, rng: &mut dyn RngCore) -> f32 {
            particle + control + rng.random_range(-0.05..0.05)
        }
    }

    /// Gaussian likelihood around a measured position.
    struct Position {
        sigma: f64,
    }

    impl MeasurementModel<f32, f32> for Position {
        fn compute_measurement_likelihood(&self, particle: &f32, measurement: &f32) -> f64 {
            let d = (particle - measurement) as f64;
            (-0.5 * d * d / (self.sigma * self.sigma)).exp()
        }
    }

    /// Scores every particle zero.
    struct Blind;

    impl MeasurementModel<f32, f32> for Blind {
        fn compute_measurement_likelihood(&self, _: &f32, _: &f32) -> f64 {
            0.0
        }
    }

    fn filter(sigma: f64) -> ParticleFilter<f32, f32> {
        ParticleFilter::new(
            Box::new(Shift),
            Box::new(Position { sigma }),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_init_requires_two_particles() {
        let mut pf = filter(1.0);
        assert!(matches!(pf.init(vec![]), Err(LocalizationError::TooFewParticles(0))));
        assert!(matches!(pf.init(vec![1.0]), Err(LocalizationError::TooFewParticles(1))));
        assert!(!pf.is_initialized());
        assert!(pf.init(vec![1.0, 2.0]).is_ok());
        assert!(pf.is_initialized());
    }

    #[test]
    fn test_update_before_init() {
        let mut pf = filter(1.0);
        assert!(matches!(pf.update(&0.0, &0.0), Err(LocalizationError::NotInitialized)));
    }

    #[test]
    fn test_update_preserves_count() {
        for n in [2usize, 3, 17, 256] {
            let mut pf = filter(1.0);
            let mut rng = StdRng::seed_from_u64(n as u64);
            pf.init((0..n).map(|_| rng.random_range(0.0..10.0)).collect()).unwrap();
            for _ in 0..5 {
                pf.update(&0.5, &5.0).unwrap();
                assert_eq!(pf.num_particles(), n);
            }
        }
    }

    #[test]
    fn test_converges_to_measurement() {
        let mut pf = filter(0.2);
        pf.init((0..500).map(|i| i as f32 * 0.02).collect()).unwrap();

        let mut truth = 2.0;
        for _ in 0..10 {
            truth += 0.3;
            pf.update(&0.3, &truth).unwrap();
        }

        let mean = pf.particles().iter().sum::<f32>() / pf.num_particles() as f32;
        assert_relative_eq!(mean, truth, epsilon = 0.15);
        assert_eq!(pf.state().iterations, 10);
        assert!(pf.state().neff > 1.0 && pf.state().neff <= 500.0);
        assert!(pf.state().max_weight > 0.0 && pf.state().max_weight <= 1.0);
    }

    #[test]
    fn test_weight_collapse_keeps_predicted_particles() {
        let mut pf: ParticleFilter<f32, f32> =
            ParticleFilter::new(Box::new(Shift), Box::new(Blind), StdRng::seed_from_u64(1));
        pf.init(vec![0.0, 10.0, 20.0]).unwrap();

        assert!(matches!(pf.update(&1.0, &0.0), Err(LocalizationError::WeightCollapse)));
        assert_eq!(pf.num_particles(), 3);
        assert!((pf.particles()[1] - 11.0).abs() <= 0.05);
        assert_eq!(pf.state().iterations, 0);
    }

    #[test]
    fn test_underflowing_likelihoods_still_weigh() {
        // exp(-0.5 · (d/σ)²) underflows to 0 for every particle, but the
        // log-likelihoods still rank them.
        struct Sharp;
        impl MeasurementModel<f32, f32> for Sharp {
            fn compute_measurement_likelihood(&self, p: &f32, m: &f32) -> f64 {
                self.log_likelihood(p, m).exp()
            }
            fn log_likelihood(&self, p: &f32, m: &f32) -> f64 {
                -1e4 * ((p - m) as f64).abs() - 1e4
            }
        }

        let mut pf: ParticleFilter<f32, f32> =
            ParticleFilter::new(Box::new(Shift), Box::new(Sharp), StdRng::seed_from_u64(9));
        pf.init(vec![0.0, 5.0, 10.0]).unwrap();
        pf.update(&0.0, &5.0).unwrap();
        assert!(pf.particles().iter().all(|p| (p - 5.0).abs() <= 0.05));
    }
}
