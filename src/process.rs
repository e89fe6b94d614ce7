//! Discrete-time process steppers
//!
//! Two scalar models are supported:
//!
//! - Geometric Brownian Motion, dS_t = μ S_t dt + σ S_t dW_t, stepped with its
//!   exact lognormal transition S_{t+dt} = S_t exp((μ - σ²/2)dt + σ√dt Z)
//! - Ornstein–Uhlenbeck, dX_t = κ(θ - X_t)dt + σ dW_t, stepped with
//!   Euler–Maruyama X_{t+dt} = X_t + κ(θ - X_t)dt + σ√dt Z
//!
//! A [`ProcessModel`] is turned into a concrete stepper once per run; the path
//! loop is generic over [`ProcessStepper`] so the variant is never re-tested
//! inside the hot loop.

use crate::error::{validate_finite, Result};

/// One-step transition of a scalar process on a fixed time step
pub trait ProcessStepper {
    /// Advances `current` by one time step using the normal draw `z`
    fn step(&self, current: f64, z: f64) -> f64;
}

/// GBM model parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmParams {
    /// Drift μ
    pub drift: f64,
    /// Volatility σ
    pub volatility: f64,
}

impl GbmParams {
    /// Creates GBM parameters
    ///
    /// # Arguments
    /// * `drift` - Expected return μ
    /// * `volatility` - Volatility σ
    pub fn new(drift: f64, volatility: f64) -> Self {
        Self { drift, volatility }
    }

    /// Expected value E[S_t] = S_0 * exp(μt)
    pub fn expected_value(&self, s0: f64, t: f64) -> f64 {
        s0 * (self.drift * t).exp()
    }

    /// Precomputes the per-step coefficients for time step `dt`
    ///
    /// # Returns
    /// An exact lognormal stepper: S_{t+dt} = S_t exp((μ - σ²/2)dt + σ√dt Z)
    pub fn stepper(&self, dt: f64) -> GbmStep {
        GbmStep {
            drift_per_step: (self.drift - 0.5 * self.volatility * self.volatility) * dt,
            vol_sqrt_dt: self.volatility * dt.sqrt(),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_finite("drift", self.drift)?;
        validate_finite("volatility", self.volatility)?;
        Ok(())
    }
}

/// OU model parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuParams {
    /// Mean reversion speed κ
    pub mean_reversion_speed: f64,
    /// Long-term mean θ
    pub long_term_mean: f64,
    /// Volatility σ
    pub volatility: f64,
}

impl OuParams {
    /// Creates OU parameters
    ///
    /// # Arguments
    /// * `mean_reversion_speed` - Speed κ at which the state is pulled toward θ
    /// * `long_term_mean` - Long-term mean θ
    /// * `volatility` - Volatility σ
    pub fn new(mean_reversion_speed: f64, long_term_mean: f64, volatility: f64) -> Self {
        Self {
            mean_reversion_speed,
            long_term_mean,
            volatility,
        }
    }

    /// Expected value E[X_t] = θ + (X_0 - θ) exp(-κt) of the continuous process
    pub fn expected_value(&self, x0: f64, t: f64) -> f64 {
        self.long_term_mean + (x0 - self.long_term_mean) * (-self.mean_reversion_speed * t).exp()
    }

    /// Precomputes the per-step coefficients for time step `dt`
    ///
    /// # Returns
    /// An Euler–Maruyama stepper: X_{t+dt} = X_t + κ(θ - X_t)dt + σ√dt Z
    pub fn stepper(&self, dt: f64) -> OuStep {
        OuStep {
            kappa_dt: self.mean_reversion_speed * dt,
            long_term_mean: self.long_term_mean,
            vol_sqrt_dt: self.volatility * dt.sqrt(),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_finite("mean_reversion_speed", self.mean_reversion_speed)?;
        validate_finite("long_term_mean", self.long_term_mean)?;
        validate_finite("volatility", self.volatility)?;
        Ok(())
    }
}

/// Process variant selected for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessModel {
    Gbm(GbmParams),
    Ou(OuParams),
}

impl ProcessModel {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            ProcessModel::Gbm(params) => params.validate(),
            ProcessModel::Ou(params) => params.validate(),
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ProcessModel::Gbm(_) => "gbm",
            ProcessModel::Ou(_) => "ou",
        }
    }
}

/// Exact GBM step with precomputed coefficients
#[derive(Debug, Clone, Copy)]
pub struct GbmStep {
    drift_per_step: f64,
    vol_sqrt_dt: f64,
}

impl ProcessStepper for GbmStep {
    #[inline]
    fn step(&self, current: f64, z: f64) -> f64 {
        current * (self.drift_per_step + self.vol_sqrt_dt * z).exp()
    }
}

/// Euler–Maruyama OU step with precomputed coefficients
#[derive(Debug, Clone, Copy)]
pub struct OuStep {
    kappa_dt: f64,
    long_term_mean: f64,
    vol_sqrt_dt: f64,
}

impl ProcessStepper for OuStep {
    #[inline]
    fn step(&self, current: f64, z: f64) -> f64 {
        current + self.kappa_dt * (self.long_term_mean - current) + self.vol_sqrt_dt * z
    }
}
