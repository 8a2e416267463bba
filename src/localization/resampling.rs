//! Resampling wheel.
//!
//! Classic "resampling wheel" selection: place the items around a wheel
//! with arc lengths proportional to their weights, start at a random item,
//! and repeatedly advance a pointer by a random amount in `[0, 2·w_max)`,
//! emitting the item the pointer lands on.
//!
//! ```text
//! beta += U(0, 2·w_max)
//! while w[index] < beta:
//!     beta -= w[index]
//!     index = (index + 1) mod n
//! emit items[index]
//! ```
//!
//! Each full lap around the wheel subtracts the total weight (≥ `w_max`)
//! from `beta`, so a draw terminates even when a single item carries all
//! the weight.

use rand::{Rng, RngCore};

use crate::error::{LocalizationError, Result};

use super::traits::{WeightResampler, Weighted};

/// Unbounded lazy sequence of items drawn with probability ∝ weight.
///
/// Borrows the random source; take as many items as needed.
pub struct ResamplingWheel<'a, W> {
    items: Vec<W>,
    weights: Vec<f64>,
    max_weight: f64,
    index: usize,
    beta: f64,
    rng: &'a mut dyn RngCore,
}

impl<'a, W: Weighted + Clone> ResamplingWheel<'a, W> {
    /// Build a wheel over `items`.
    ///
    /// Requires at least two items and at least one positive finite weight.
    /// Negative and non-finite weights are treated as zero.
    pub fn new(items: Vec<W>, rng: &'a mut dyn RngCore) -> Result<Self> {
        if items.len() < 2 {
            return Err(LocalizationError::TooFewParticles(items.len()));
        }

        let weights: Vec<f64> = items
            .iter()
            .map(|item| {
                let w = item.weight();
                if w.is_finite() && w > 0.0 { w } else { 0.0 }
            })
            .collect();
        let max_weight = weights.iter().copied().fold(0.0, f64::max);
        if max_weight <= 0.0 {
            return Err(LocalizationError::WeightCollapse);
        }

        let index = rng.random_range(0..items.len());

        Ok(Self {
            items,
            weights,
            max_weight,
            index,
            beta: 0.0,
            rng,
        })
    }
}

impl<W: Clone> Iterator for ResamplingWheel<'_, W> {
    type Item = W;

    fn next(&mut self) -> Option<W> {
        self.beta += self.rng.random::<f64>() * 2.0 * self.max_weight;
        while self.weights[self.index] < self.beta {
            self.beta -= self.weights[self.index];
            self.index = (self.index + 1) % self.weights.len();
        }
        Some(self.items[self.index].clone())
    }
}

/// [`WeightResampler`] backed by a [`ResamplingWheel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelResampler;

impl<W: Weighted + Clone + Send + Sync> WeightResampler<W> for WheelResampler {
    fn resample(&self, items: Vec<W>, count: usize, rng: &mut dyn RngCore) -> Result<Vec<W>> {
        Ok(ResamplingWheel::new(items, rng)?.take(count).collect())
    }
}
