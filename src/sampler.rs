//! Standard normal sampler
//!
//! Converts uniform draws into N(0, 1) draws with the Box–Muller transform:
//! Z = sqrt(-2 ln U1) * sin(2π U2)
//!
//! Only the sine branch is returned. The cosine partner is dropped, so every
//! call consumes exactly two fresh uniforms and keeps no state between calls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Box–Muller standard normal generator over an owned uniform source
///
/// A sampler belongs to one path (or one sequential run). Paths simulated
/// concurrently each get their own sampler.
#[derive(Debug, Clone)]
pub struct GaussianSampler<R: Rng> {
    rng: R,
}

impl<R: Rng> GaussianSampler<R> {
    /// Wraps an existing uniform source
    ///
    /// # Example
    /// ```
    /// use derivrisk::GaussianSampler;
    ///
    /// let mut sampler = GaussianSampler::new(rand::thread_rng());
    /// let z = sampler.sample();
    /// assert!(z.is_finite());
    /// ```
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws one standard normal value
    pub fn sample(&mut self) -> f64 {
        // gen() is in [0, 1); flipping it keeps ln() away from zero
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin()
    }

    /// Returns the underlying uniform source
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl GaussianSampler<StdRng> {
    /// Deterministic sampler for reproducible runs
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}
